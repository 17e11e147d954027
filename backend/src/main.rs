use axum::{http::Method, routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod database;
mod error;
mod handlers;
mod jobs;

pub use error::{ApiError, ApiResult, AppError};

#[cfg(test)]
mod tests;

pub struct AppState {
    pub db_pool: sqlx::PgPool,
    pub scheduler: Arc<jobs::JobScheduler>,
}

pub fn build_router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/", get(|| async { "fieldserve API v0.1.0" }))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1/customers", handlers::customer_routes())
        .nest("/api/v1/contracts", handlers::contract_routes())
        .nest("/api/v1/jobs", handlers::service_job_routes())
        .nest("/api/v1/system", handlers::system_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from_env()?;
    let db_pool = database::create_pool(&config.database_url).await?;

    database::migrate(&db_pool).await?;

    let scheduler = Arc::new(jobs::JobScheduler::new());
    if config.jobs.sla_scheduler_enabled {
        let sla_job = Arc::new(jobs::MaintenanceSlaJob::new(
            db_pool.clone(),
            Arc::new(jobs::SystemClock),
        ));
        scheduler
            .spawn(sla_job, config.jobs.sla_pass_interval())
            .await;
    } else {
        tracing::info!("SLA scheduler disabled by configuration");
    }

    let app_state = Arc::new(AppState {
        db_pool,
        scheduler: scheduler.clone(),
    });

    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.server_addr).await?;
    tracing::info!("Server running on {}", config.server_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    // Let an in-flight pass finish its transaction before the process exits.
    scheduler.shutdown().await;

    Ok(())
}
