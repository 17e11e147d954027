// End-to-end passes of the maintenance SLA job against a real database.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serial_test::serial;
use std::sync::Arc;

use crate::jobs::clock::FixedClock;
use crate::jobs::MaintenanceSlaJob;
use crate::tests::fixtures::{
    contract_next_due, create_contract, create_customer, jobs_for_contract,
};
use crate::tests::TestContext;
use fieldserve_shared::{job_category, job_priority, job_status};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
#[serial]
async fn due_contract_generates_one_pending_job() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let customer_id = create_customer(&ctx.db_pool, "Acme Security").await;
    let contract_id = create_contract(
        &ctx.db_pool,
        customer_id,
        date(2024, 1, 1),
        3,
        Decimal::from(500),
        true,
    )
    .await;

    let job = MaintenanceSlaJob::new(
        ctx.db_pool.clone(),
        Arc::new(FixedClock::on(date(2024, 1, 15))),
    );
    let result = job.run_pass().await.expect("pass should succeed");

    assert_eq!(result.jobs_created, 1);
    assert!(result.errors.is_empty());

    let jobs = jobs_for_contract(&ctx.db_pool, contract_id).await;
    assert_eq!(jobs.len(), 1);

    let created = &jobs[0];
    assert_eq!(created.customer_id, customer_id);
    assert_eq!(created.status, job_status::PENDING);
    assert_eq!(created.priority, job_priority::NORMAL);
    assert_eq!(created.category, job_category::MAINTENANCE);
    assert_eq!(created.price, Decimal::from(500));
    assert_eq!(created.scheduled_date, date(2024, 1, 16));
    assert_eq!(
        created.description,
        "Quarterly alarm system check - January 2024"
    );

    assert_eq!(
        contract_next_due(&ctx.db_pool, contract_id).await,
        date(2024, 4, 1)
    );
}

#[tokio::test]
#[serial]
async fn back_to_back_passes_create_no_duplicate() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let customer_id = create_customer(&ctx.db_pool, "Harbor Alarms").await;
    let contract_id = create_contract(
        &ctx.db_pool,
        customer_id,
        date(2024, 1, 1),
        3,
        Decimal::from(500),
        true,
    )
    .await;

    let job = MaintenanceSlaJob::new(
        ctx.db_pool.clone(),
        Arc::new(FixedClock::on(date(2024, 1, 15))),
    );
    job.run_pass().await.expect("first pass");
    let second = job.run_pass().await.expect("second pass");

    assert_eq!(second.jobs_created, 0);
    assert_eq!(jobs_for_contract(&ctx.db_pool, contract_id).await.len(), 1);
}

#[tokio::test]
#[serial]
async fn non_due_and_inactive_contracts_are_untouched() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let customer_id = create_customer(&ctx.db_pool, "Northgate Systems").await;
    let future_contract = create_contract(
        &ctx.db_pool,
        customer_id,
        date(2024, 6, 1),
        3,
        Decimal::from(250),
        true,
    )
    .await;
    let inactive_contract = create_contract(
        &ctx.db_pool,
        customer_id,
        date(2023, 1, 1),
        3,
        Decimal::from(250),
        false,
    )
    .await;

    let job = MaintenanceSlaJob::new(
        ctx.db_pool.clone(),
        Arc::new(FixedClock::on(date(2024, 1, 15))),
    );
    job.run_pass().await.expect("pass should succeed");

    assert!(jobs_for_contract(&ctx.db_pool, future_contract).await.is_empty());
    assert!(jobs_for_contract(&ctx.db_pool, inactive_contract).await.is_empty());
    assert_eq!(
        contract_next_due(&ctx.db_pool, future_contract).await,
        date(2024, 6, 1)
    );
    assert_eq!(
        contract_next_due(&ctx.db_pool, inactive_contract).await,
        date(2023, 1, 1)
    );
}

#[tokio::test]
#[serial]
async fn far_overdue_contract_reanchors_on_today() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let customer_id = create_customer(&ctx.db_pool, "Lakeside Locks").await;
    let contract_id = create_contract(
        &ctx.db_pool,
        customer_id,
        date(2024, 1, 1),
        3,
        Decimal::from(500),
        true,
    )
    .await;

    let job = MaintenanceSlaJob::new(
        ctx.db_pool.clone(),
        Arc::new(FixedClock::on(date(2025, 1, 15))),
    );
    job.run_pass().await.expect("pass should succeed");

    // One job for the whole backlog, and the cadence re-anchors on today
    // instead of stepping through the missed cycles.
    assert_eq!(jobs_for_contract(&ctx.db_pool, contract_id).await.len(), 1);
    assert_eq!(
        contract_next_due(&ctx.db_pool, contract_id).await,
        date(2025, 4, 15)
    );
}

#[tokio::test]
#[serial]
async fn invalid_frequency_is_skipped_but_pass_continues() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let customer_id = create_customer(&ctx.db_pool, "Summit Surveillance").await;
    let broken_contract = create_contract(
        &ctx.db_pool,
        customer_id,
        date(2024, 1, 1),
        0,
        Decimal::from(100),
        true,
    )
    .await;
    let good_contract = create_contract(
        &ctx.db_pool,
        customer_id,
        date(2024, 1, 1),
        3,
        Decimal::from(500),
        true,
    )
    .await;

    let job = MaintenanceSlaJob::new(
        ctx.db_pool.clone(),
        Arc::new(FixedClock::on(date(2024, 1, 15))),
    );
    let result = job.run_pass().await.expect("pass should succeed");

    assert_eq!(result.contracts_skipped, 1);
    assert_eq!(result.jobs_created, 1);
    assert_eq!(result.errors.len(), 1);

    assert!(jobs_for_contract(&ctx.db_pool, broken_contract).await.is_empty());
    assert_eq!(
        contract_next_due(&ctx.db_pool, broken_contract).await,
        date(2024, 1, 1)
    );
    assert_eq!(jobs_for_contract(&ctx.db_pool, good_contract).await.len(), 1);
}
