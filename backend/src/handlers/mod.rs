use axum::{extract::State, response::Json};
use serde_json::json;
use std::sync::Arc;

use crate::{database, AppState};

pub mod contracts;
pub mod customers;
pub mod service_jobs;
pub mod system;

pub use contracts::contract_routes;
pub use customers::customer_routes;
pub use service_jobs::service_job_routes;
pub use system::system_routes;

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let database_up = database::health_check(&state.db_pool).await;
    let pool = database::get_pool_stats(&state.db_pool);

    Json(json!({
        "status": if database_up { "ok" } else { "degraded" },
        "database": database_up,
        "pool": pool,
    }))
}
