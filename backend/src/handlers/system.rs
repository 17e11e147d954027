use axum::{extract::State, response::Json, routing::get, Router};
use std::sync::Arc;

use crate::jobs::JobExecutionLog;
use crate::AppState;

/// Read-only observability surface for the background scheduler. Jobs are not
/// remotely triggerable; this only reports what the loops have done.
pub fn system_routes() -> Router<Arc<AppState>> {
    Router::new().route("/jobs", get(list_job_executions))
}

async fn list_job_executions(State(state): State<Arc<AppState>>) -> Json<Vec<JobExecutionLog>> {
    Json(state.scheduler.get_execution_logs().await)
}
