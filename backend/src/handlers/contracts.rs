use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiResult, AppError};
use crate::AppState;
use fieldserve_shared::MaintenanceContract;

#[derive(Deserialize, Validate)]
pub struct ContractCreate {
    pub customer_id: Uuid,
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "job_template must not be empty"))]
    pub job_template: String,
    pub next_due_date: NaiveDate,
    #[validate(range(min = 1, message = "frequency_months must be at least 1"))]
    pub frequency_months: i32,
    pub price_per_visit: Decimal,
}

#[derive(Deserialize)]
pub struct ContractUpdate {
    pub title: Option<String>,
    pub job_template: Option<String>,
    pub next_due_date: Option<NaiveDate>,
    pub frequency_months: Option<i32>,
    pub price_per_visit: Option<Decimal>,
}

#[derive(Serialize, Deserialize)]
pub struct ContractQuery {
    pub customer_id: Option<Uuid>,
    pub active: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub fn contract_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_contracts).post(create_contract))
        .route(
            "/:id",
            get(get_contract).put(update_contract).delete(delete_contract),
        )
        .route("/:id/deactivate", post(deactivate_contract))
}

const CONTRACT_COLUMNS: &str = "id, customer_id, title, job_template, active, next_due_date, \
     frequency_months, price_per_visit, created_at, updated_at";

async fn list_contracts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ContractQuery>,
) -> ApiResult<Json<Vec<MaintenanceContract>>> {
    let limit = params.limit.unwrap_or(50);
    let offset = params.offset.unwrap_or(0);

    let contracts = sqlx::query_as::<_, MaintenanceContract>(&format!(
        "SELECT {CONTRACT_COLUMNS}
         FROM maintenance_contracts
         WHERE ($1::uuid IS NULL OR customer_id = $1)
           AND ($2::boolean IS NULL OR active = $2)
         ORDER BY next_due_date ASC
         LIMIT $3 OFFSET $4"
    ))
    .bind(params.customer_id)
    .bind(params.active)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db_pool)
    .await?;

    Ok(Json(contracts))
}

async fn create_contract(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ContractCreate>,
) -> ApiResult<(StatusCode, Json<MaintenanceContract>)> {
    payload.validate()?;
    if payload.price_per_visit < Decimal::ZERO {
        return Err(AppError::validation_single(
            "price_per_visit",
            "price_per_visit must not be negative",
        ));
    }

    let customer_exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1)",
    )
    .bind(payload.customer_id)
    .fetch_one(&state.db_pool)
    .await?;

    if !customer_exists {
        return Err(AppError::NotFound("Customer".to_string()));
    }

    let contract = sqlx::query_as::<_, MaintenanceContract>(&format!(
        "INSERT INTO maintenance_contracts
         (id, customer_id, title, job_template, active, next_due_date,
          frequency_months, price_per_visit)
         VALUES ($1, $2, $3, $4, true, $5, $6, $7)
         RETURNING {CONTRACT_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(payload.customer_id)
    .bind(payload.title)
    .bind(payload.job_template)
    .bind(payload.next_due_date)
    .bind(payload.frequency_months)
    .bind(payload.price_per_visit)
    .fetch_one(&state.db_pool)
    .await?;

    Ok((StatusCode::CREATED, Json(contract)))
}

async fn get_contract(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MaintenanceContract>> {
    let contract = sqlx::query_as::<_, MaintenanceContract>(&format!(
        "SELECT {CONTRACT_COLUMNS} FROM maintenance_contracts WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Contract".to_string()))?;

    Ok(Json(contract))
}

async fn update_contract(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ContractUpdate>,
) -> ApiResult<Json<MaintenanceContract>> {
    if let Some(frequency) = payload.frequency_months {
        if frequency < 1 {
            return Err(AppError::validation_single(
                "frequency_months",
                "frequency_months must be at least 1",
            ));
        }
    }
    if let Some(price) = payload.price_per_visit {
        if price < Decimal::ZERO {
            return Err(AppError::validation_single(
                "price_per_visit",
                "price_per_visit must not be negative",
            ));
        }
    }

    let contract = sqlx::query_as::<_, MaintenanceContract>(&format!(
        "UPDATE maintenance_contracts SET
         title = COALESCE($2, title),
         job_template = COALESCE($3, job_template),
         next_due_date = COALESCE($4, next_due_date),
         frequency_months = COALESCE($5, frequency_months),
         price_per_visit = COALESCE($6, price_per_visit),
         updated_at = NOW()
         WHERE id = $1
         RETURNING {CONTRACT_COLUMNS}"
    ))
    .bind(id)
    .bind(payload.title)
    .bind(payload.job_template)
    .bind(payload.next_due_date)
    .bind(payload.frequency_months)
    .bind(payload.price_per_visit)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Contract".to_string()))?;

    Ok(Json(contract))
}

/// Deactivation never deletes: the contract drops out of the scheduler's
/// selection but keeps its history and due date.
async fn deactivate_contract(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MaintenanceContract>> {
    let contract = sqlx::query_as::<_, MaintenanceContract>(&format!(
        "UPDATE maintenance_contracts
         SET active = false, updated_at = NOW()
         WHERE id = $1
         RETURNING {CONTRACT_COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Contract".to_string()))?;

    Ok(Json(contract))
}

async fn delete_contract(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let result = sqlx::query("DELETE FROM maintenance_contracts WHERE id = $1")
        .bind(id)
        .execute(&state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Contract".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
