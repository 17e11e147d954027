use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use fieldserve_shared::ServiceJob;

pub async fn create_customer(pool: &PgPool, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO customers (id, name, email) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(name)
        .bind(format!("{}@example.com", id.simple()))
        .execute(pool)
        .await
        .expect("failed to insert customer fixture");
    id
}

pub async fn create_contract(
    pool: &PgPool,
    customer_id: Uuid,
    next_due_date: NaiveDate,
    frequency_months: i32,
    price_per_visit: Decimal,
    active: bool,
) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO maintenance_contracts
         (id, customer_id, title, job_template, active, next_due_date,
          frequency_months, price_per_visit)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(id)
    .bind(customer_id)
    .bind("Maintenance agreement")
    .bind("Quarterly alarm system check")
    .bind(active)
    .bind(next_due_date)
    .bind(frequency_months)
    .bind(price_per_visit)
    .execute(pool)
    .await
    .expect("failed to insert contract fixture");
    id
}

pub async fn jobs_for_contract(pool: &PgPool, contract_id: Uuid) -> Vec<ServiceJob> {
    sqlx::query_as::<_, ServiceJob>(
        "SELECT id, customer_id, contract_id, category, description, status,
                priority, scheduled_date, price, created_at, updated_at
         FROM service_jobs
         WHERE contract_id = $1
         ORDER BY created_at ASC",
    )
    .bind(contract_id)
    .fetch_all(pool)
    .await
    .expect("failed to query jobs for contract")
}

pub async fn contract_next_due(pool: &PgPool, contract_id: Uuid) -> NaiveDate {
    sqlx::query_scalar::<_, NaiveDate>(
        "SELECT next_due_date FROM maintenance_contracts WHERE id = $1",
    )
    .bind(contract_id)
    .fetch_one(pool)
    .await
    .expect("failed to query contract due date")
}
