// Maintenance SLA Job - generates service jobs for maintenance contracts that
// have come due, and advances each contract's next due date past today.

use async_trait::async_trait;
use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use fieldserve_shared::{job_category, job_priority, job_status};

use super::clock::Clock;
use super::scheduler::{BackgroundJob, JobResult, JobRunSummary};

pub struct MaintenanceSlaJob {
    db_pool: PgPool,
    clock: Arc<dyn Clock>,
}

#[derive(Debug, Default)]
pub struct SlaPassResult {
    pub contracts_due: i32,
    pub jobs_created: i32,
    pub contracts_skipped: i32,
    pub errors: Vec<String>,
}

#[derive(Debug, FromRow)]
struct DueContract {
    id: Uuid,
    customer_id: Uuid,
    job_template: String,
    next_due_date: NaiveDate,
    frequency_months: i32,
    price_per_visit: Decimal,
}

impl MaintenanceSlaJob {
    pub fn new(db_pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        Self { db_pool, clock }
    }

    /// One pass: select all active contracts with `next_due_date <= today`,
    /// create a pending service job for each and advance its due date, all
    /// inside a single transaction. An error rolls the whole pass back; due
    /// contracts stay due and the next interval retries.
    pub async fn run_pass(&self) -> JobResult<SlaPassResult> {
        let today = self.clock.today();
        let mut result = SlaPassResult::default();

        let mut tx = self.db_pool.begin().await?;

        let contracts = sqlx::query_as::<_, DueContract>(
            r#"
            SELECT id, customer_id, job_template, next_due_date,
                   frequency_months, price_per_visit
            FROM maintenance_contracts
            WHERE active = true AND next_due_date <= $1
            ORDER BY next_due_date ASC
            "#,
        )
        .bind(today)
        .fetch_all(&mut *tx)
        .await?;

        result.contracts_due = contracts.len() as i32;

        for contract in contracts {
            // Bad rows are skipped with a warning; they must not take the
            // rest of the pass down with them.
            if contract.frequency_months < 1 {
                warn!(
                    contract_id = %contract.id,
                    frequency_months = contract.frequency_months,
                    "skipping contract with non-positive frequency"
                );
                result.contracts_skipped += 1;
                result.errors.push(format!(
                    "contract {} has invalid frequency_months {}",
                    contract.id, contract.frequency_months
                ));
                continue;
            }

            self.create_service_job(&mut tx, &contract, today).await?;

            let next_due = advance_next_due(
                contract.next_due_date,
                contract.frequency_months as u32,
                today,
            );

            sqlx::query(
                "UPDATE maintenance_contracts
                 SET next_due_date = $2, updated_at = NOW()
                 WHERE id = $1",
            )
            .bind(contract.id)
            .bind(next_due)
            .execute(&mut *tx)
            .await?;

            result.jobs_created += 1;
            info!(
                contract_id = %contract.id,
                customer_id = %contract.customer_id,
                %next_due,
                "generated maintenance job"
            );
        }

        tx.commit().await?;

        Ok(result)
    }

    async fn create_service_job(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        contract: &DueContract,
        today: NaiveDate,
    ) -> JobResult<()> {
        sqlx::query(
            r#"
            INSERT INTO service_jobs
            (id, customer_id, contract_id, category, description, status,
             priority, scheduled_date, price, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(contract.customer_id)
        .bind(contract.id)
        .bind(job_category::MAINTENANCE)
        .bind(render_description(&contract.job_template, today))
        .bind(job_status::PENDING)
        .bind(job_priority::NORMAL)
        .bind(today + chrono::Duration::days(1))
        .bind(contract.price_per_visit)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl BackgroundJob for MaintenanceSlaJob {
    fn name(&self) -> &'static str {
        "maintenance_sla"
    }

    async fn run(&self) -> JobResult<JobRunSummary> {
        let result = self.run_pass().await?;
        Ok(JobRunSummary {
            items_processed: result.contracts_due,
            errors: result.errors,
        })
    }
}

/// Next occurrence after processing a due date.
///
/// Normally one frequency step from the stored date (calendar months,
/// day-of-month preserved, clamped at month end). A contract that has fallen
/// more than one cycle behind jumps to `today + frequency` instead of stepping
/// through the missed cycles, so the result is always strictly after today.
pub fn advance_next_due(current: NaiveDate, frequency_months: u32, today: NaiveDate) -> NaiveDate {
    let candidate = current + Months::new(frequency_months);
    if candidate > today {
        candidate
    } else {
        today + Months::new(frequency_months)
    }
}

/// Job description: the contract's template plus a label for the current
/// period, e.g. "Quarterly alarm system check - January 2024".
pub fn render_description(template: &str, today: NaiveDate) -> String {
    format!("{} - {}", template.trim(), today.format("%B %Y"))
}
