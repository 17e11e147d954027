pub mod fixtures;
pub mod integration;

use sqlx::PgPool;

/// Shared setup for tests that need a live database.
///
/// Configure with TEST_DATABASE_URL; tests return early when it is not set so
/// the pure unit suite runs anywhere.
pub struct TestContext {
    pub db_pool: PgPool,
}

impl TestContext {
    pub async fn new() -> Option<Self> {
        let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("TEST_DATABASE_URL not set; skipping database-backed test");
            return None;
        };

        let pool = PgPool::connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        // Tests assert exact row counts, so each one starts from a clean slate.
        sqlx::query("TRUNCATE customers, maintenance_contracts, service_jobs CASCADE")
            .execute(&pool)
            .await
            .expect("Failed to reset test tables");

        Some(Self { db_pool: pool })
    }
}
