use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ApiResult, AppError};
use crate::AppState;
use fieldserve_shared::{Customer, MaintenanceContract, ServiceJob};

#[derive(Serialize, Deserialize)]
pub struct CustomerCreate {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub notes: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub notes: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct CustomerQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub search: Option<String>,
}

pub fn customer_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route(
            "/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .route("/:id/contracts", get(get_customer_contracts))
        .route("/:id/jobs", get(get_customer_jobs))
}

const CUSTOMER_COLUMNS: &str =
    "id, name, email, phone, address, city, state, zip, notes, created_at, updated_at, archived_at";

async fn list_customers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CustomerQuery>,
) -> ApiResult<Json<Vec<Customer>>> {
    let limit = params.limit.unwrap_or(50);
    let offset = params.offset.unwrap_or(0);

    let customers = sqlx::query_as::<_, Customer>(&format!(
        "SELECT {CUSTOMER_COLUMNS}
         FROM customers
         WHERE ($1::text IS NULL OR name ILIKE $1 OR email ILIKE $1)
         ORDER BY name
         LIMIT $2 OFFSET $3"
    ))
    .bind(params.search.map(|s| format!("%{}%", s)))
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db_pool)
    .await?;

    Ok(Json(customers))
}

async fn create_customer(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CustomerCreate>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    if payload.name.trim().is_empty() {
        return Err(AppError::validation_single("name", "name must not be empty"));
    }

    let customer = sqlx::query_as::<_, Customer>(&format!(
        "INSERT INTO customers (id, name, email, phone, address, city, state, zip, notes)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING {CUSTOMER_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(payload.name)
    .bind(payload.email)
    .bind(payload.phone)
    .bind(payload.address)
    .bind(payload.city)
    .bind(payload.state)
    .bind(payload.zip)
    .bind(payload.notes)
    .fetch_one(&state.db_pool)
    .await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

async fn get_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Customer>> {
    let customer = sqlx::query_as::<_, Customer>(&format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Customer".to_string()))?;

    Ok(Json(customer))
}

async fn update_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CustomerUpdate>,
) -> ApiResult<Json<Customer>> {
    let customer = sqlx::query_as::<_, Customer>(&format!(
        "UPDATE customers SET
         name = COALESCE($2, name),
         email = COALESCE($3, email),
         phone = COALESCE($4, phone),
         address = COALESCE($5, address),
         city = COALESCE($6, city),
         state = COALESCE($7, state),
         zip = COALESCE($8, zip),
         notes = COALESCE($9, notes),
         updated_at = NOW()
         WHERE id = $1
         RETURNING {CUSTOMER_COLUMNS}"
    ))
    .bind(id)
    .bind(payload.name)
    .bind(payload.email)
    .bind(payload.phone)
    .bind(payload.address)
    .bind(payload.city)
    .bind(payload.state)
    .bind(payload.zip)
    .bind(payload.notes)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Customer".to_string()))?;

    Ok(Json(customer))
}

async fn delete_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let result = sqlx::query("DELETE FROM customers WHERE id = $1")
        .bind(id)
        .execute(&state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Customer".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn get_customer_contracts(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<MaintenanceContract>>> {
    let contracts = sqlx::query_as::<_, MaintenanceContract>(
        "SELECT id, customer_id, title, job_template, active, next_due_date,
                frequency_months, price_per_visit, created_at, updated_at
         FROM maintenance_contracts
         WHERE customer_id = $1
         ORDER BY next_due_date ASC",
    )
    .bind(id)
    .fetch_all(&state.db_pool)
    .await?;

    Ok(Json(contracts))
}

async fn get_customer_jobs(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<ServiceJob>>> {
    let jobs = sqlx::query_as::<_, ServiceJob>(
        "SELECT id, customer_id, contract_id, category, description, status,
                priority, scheduled_date, price, created_at, updated_at
         FROM service_jobs
         WHERE customer_id = $1
         ORDER BY scheduled_date DESC",
    )
    .bind(id)
    .fetch_all(&state.db_pool)
    .await?;

    Ok(Json(jobs))
}
