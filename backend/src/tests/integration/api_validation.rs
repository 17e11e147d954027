// Router-level tests for request validation. These use a lazy pool handle:
// every request here is rejected (or answered) before any query would run, so
// no database is needed.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use crate::jobs::JobScheduler;
use crate::{build_router, AppState};

fn test_router() -> axum::Router {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgresql://localhost/fieldserve_test")
        .expect("lazy pool");

    build_router(Arc::new(AppState {
        db_pool: pool,
        scheduler: Arc::new(JobScheduler::new()),
    }))
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn root_responds() {
    let response = test_router()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_contract_rejects_zero_frequency() {
    let response = test_router()
        .oneshot(post_json(
            "/api/v1/contracts",
            json!({
                "customer_id": Uuid::new_v4(),
                "title": "Annual maintenance",
                "job_template": "Alarm panel inspection",
                "next_due_date": "2024-06-01",
                "frequency_months": 0,
                "price_per_visit": 250,
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn create_contract_rejects_negative_price() {
    let response = test_router()
        .oneshot(post_json(
            "/api/v1/contracts",
            json!({
                "customer_id": Uuid::new_v4(),
                "title": "Annual maintenance",
                "job_template": "Alarm panel inspection",
                "next_due_date": "2024-06-01",
                "frequency_months": 6,
                "price_per_visit": -1,
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn create_job_rejects_unknown_category() {
    let response = test_router()
        .oneshot(post_json(
            "/api/v1/jobs",
            json!({
                "customer_id": Uuid::new_v4(),
                "category": "plumbing",
                "description": "Fix the sink",
                "scheduled_date": "2024-06-01",
                "price": 100,
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn list_jobs_rejects_unknown_status() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/api/v1/jobs?status=bogus")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn scheduler_log_starts_empty() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/api/v1/system/jobs")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
