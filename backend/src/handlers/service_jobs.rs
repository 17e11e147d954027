use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, put},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ApiResult, AppError};
use crate::AppState;
use fieldserve_shared::{job_category, job_priority, job_status, ServiceJob};

#[derive(Deserialize)]
pub struct JobCreate {
    pub customer_id: Uuid,
    pub category: String,
    pub description: String,
    pub priority: Option<String>,
    pub scheduled_date: NaiveDate,
    pub price: Decimal,
}

#[derive(Deserialize)]
pub struct JobStatusUpdate {
    pub status: String,
}

#[derive(Serialize, Deserialize)]
pub struct JobQuery {
    pub status: Option<String>,
    pub customer_id: Option<Uuid>,
    pub contract_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub fn service_job_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_jobs).post(create_job))
        .route("/:id", get(get_job))
        .route("/:id/status", put(update_job_status))
}

const JOB_COLUMNS: &str = "id, customer_id, contract_id, category, description, status, \
     priority, scheduled_date, price, created_at, updated_at";

async fn list_jobs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<JobQuery>,
) -> ApiResult<Json<Vec<ServiceJob>>> {
    if let Some(status) = &params.status {
        if !job_status::ALL.contains(&status.as_str()) {
            return Err(AppError::BadRequest(format!("unknown status '{}'", status)));
        }
    }

    let limit = params.limit.unwrap_or(50);
    let offset = params.offset.unwrap_or(0);

    let jobs = sqlx::query_as::<_, ServiceJob>(&format!(
        "SELECT {JOB_COLUMNS}
         FROM service_jobs
         WHERE ($1::text IS NULL OR status = $1)
           AND ($2::uuid IS NULL OR customer_id = $2)
           AND ($3::uuid IS NULL OR contract_id = $3)
         ORDER BY scheduled_date DESC
         LIMIT $4 OFFSET $5"
    ))
    .bind(params.status)
    .bind(params.customer_id)
    .bind(params.contract_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db_pool)
    .await?;

    Ok(Json(jobs))
}

/// User-originated jobs (installations, repairs, one-off inspections).
/// Maintenance jobs from contracts are created by the SLA scheduler, not here.
async fn create_job(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<JobCreate>,
) -> ApiResult<(StatusCode, Json<ServiceJob>)> {
    if !job_category::ALL.contains(&payload.category.as_str()) {
        return Err(AppError::validation_single(
            "category",
            format!("category must be one of {:?}", job_category::ALL),
        ));
    }
    let priority = payload.priority.unwrap_or_else(|| job_priority::NORMAL.to_string());
    if !job_priority::ALL.contains(&priority.as_str()) {
        return Err(AppError::validation_single(
            "priority",
            format!("priority must be one of {:?}", job_priority::ALL),
        ));
    }
    if payload.description.trim().is_empty() {
        return Err(AppError::validation_single(
            "description",
            "description must not be empty",
        ));
    }
    if payload.price < Decimal::ZERO {
        return Err(AppError::validation_single(
            "price",
            "price must not be negative",
        ));
    }

    let job = sqlx::query_as::<_, ServiceJob>(&format!(
        "INSERT INTO service_jobs
         (id, customer_id, contract_id, category, description, status,
          priority, scheduled_date, price)
         VALUES ($1, $2, NULL, $3, $4, $5, $6, $7, $8)
         RETURNING {JOB_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(payload.customer_id)
    .bind(payload.category)
    .bind(payload.description)
    .bind(job_status::PENDING)
    .bind(priority)
    .bind(payload.scheduled_date)
    .bind(payload.price)
    .fetch_one(&state.db_pool)
    .await?;

    Ok((StatusCode::CREATED, Json(job)))
}

async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ServiceJob>> {
    let job = sqlx::query_as::<_, ServiceJob>(&format!(
        "SELECT {JOB_COLUMNS} FROM service_jobs WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Service job".to_string()))?;

    Ok(Json(job))
}

async fn update_job_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<JobStatusUpdate>,
) -> ApiResult<Json<ServiceJob>> {
    if !job_status::ALL.contains(&payload.status.as_str()) {
        return Err(AppError::BadRequest(format!(
            "unknown status '{}'",
            payload.status
        )));
    }

    let mut tx = state.db_pool.begin().await?;

    let current = sqlx::query_scalar::<_, String>(
        "SELECT status FROM service_jobs WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Service job".to_string()))?;

    if !job_status::can_transition(&current, &payload.status) {
        return Err(AppError::Conflict(format!(
            "cannot move job from '{}' to '{}'",
            current, payload.status
        )));
    }

    let job = sqlx::query_as::<_, ServiceJob>(&format!(
        "UPDATE service_jobs
         SET status = $2, updated_at = NOW()
         WHERE id = $1
         RETURNING {JOB_COLUMNS}"
    ))
    .bind(id)
    .bind(&payload.status)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Json(job))
}
