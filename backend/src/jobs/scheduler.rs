// Job Scheduler - owns the background loops for all recurring jobs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum JobError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Job execution error: {0}")]
    ExecutionError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type JobResult<T> = Result<T, JobError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Hours between maintenance SLA passes.
    pub sla_pass_interval_hours: u64,
    pub sla_scheduler_enabled: bool,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            // SLA passes every 6 hours; contracts stay due until advanced, so
            // a missed pass is caught up by the next one.
            sla_pass_interval_hours: 6,
            sla_scheduler_enabled: true,
        }
    }
}

impl JobConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(hours) = std::env::var("SLA_PASS_INTERVAL_HOURS") {
            if let Ok(n) = hours.parse() {
                config.sla_pass_interval_hours = n;
            }
        }

        if let Ok(enabled) = std::env::var("SLA_SCHEDULER_ENABLED") {
            if let Ok(b) = enabled.parse() {
                config.sla_scheduler_enabled = b;
            }
        }

        config
    }

    pub fn sla_pass_interval(&self) -> Duration {
        Duration::from_secs(self.sla_pass_interval_hours * 3600)
    }
}

/// Outcome of one pass, reported by the job back to the scheduler.
#[derive(Debug, Default)]
pub struct JobRunSummary {
    pub items_processed: i32,
    pub errors: Vec<String>,
}

/// A recurring background job. The scheduler owns the loop and the interval;
/// the job only knows how to execute one pass.
#[async_trait]
pub trait BackgroundJob: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self) -> JobResult<JobRunSummary>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobExecutionLog {
    pub id: Uuid,
    pub job_name: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: JobStatus,
    pub items_processed: i32,
    pub errors: Vec<String>,
    pub duration_ms: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
    PartialFailure,
}

const EXECUTION_LOG_CAPACITY: usize = 100;

/// Runs each registered job in its own loop task: once immediately at startup,
/// then again each time the interval elapses. The interval is re-armed only
/// after the pass completes, so passes are strictly sequential. A pass failure
/// is logged and absorbed here; it never takes the loop down.
pub struct JobScheduler {
    shutdown: CancellationToken,
    execution_logs: Arc<RwLock<Vec<JobExecutionLog>>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl JobScheduler {
    pub fn new() -> Self {
        Self {
            shutdown: CancellationToken::new(),
            execution_logs: Arc::new(RwLock::new(Vec::new())),
            handles: Mutex::new(Vec::new()),
        }
    }

    pub async fn spawn(&self, job: Arc<dyn BackgroundJob>, interval: Duration) {
        let token = self.shutdown.clone();
        let logs = self.execution_logs.clone();

        let handle = tokio::spawn(async move {
            info!(
                job = job.name(),
                interval_secs = interval.as_secs(),
                "background job loop started"
            );

            loop {
                Self::run_once(job.as_ref(), &logs).await;

                // Cancellation is observed here, between passes. A pass already
                // in flight finishes its unit of work before the loop exits.
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            }

            info!(job = job.name(), "background job loop stopped");
        });

        self.handles.lock().await.push(handle);
    }

    async fn run_once(job: &dyn BackgroundJob, logs: &RwLock<Vec<JobExecutionLog>>) {
        let started_at = Utc::now();
        info!(job = job.name(), "pass started");

        let (status, items_processed, errors) = match job.run().await {
            Ok(summary) => {
                let status = if summary.errors.is_empty() {
                    JobStatus::Completed
                } else {
                    JobStatus::PartialFailure
                };
                info!(
                    job = job.name(),
                    items = summary.items_processed,
                    errors = summary.errors.len(),
                    "pass completed"
                );
                (status, summary.items_processed, summary.errors)
            }
            Err(e) => {
                error!(job = job.name(), error = %e, "pass failed");
                (JobStatus::Failed, 0, vec![e.to_string()])
            }
        };

        let completed_at = Utc::now();
        let log = JobExecutionLog {
            id: Uuid::new_v4(),
            job_name: job.name().to_string(),
            started_at,
            completed_at: Some(completed_at),
            status,
            items_processed,
            errors,
            duration_ms: Some((completed_at - started_at).num_milliseconds()),
        };

        let mut logs = logs.write().await;
        logs.push(log);
        if logs.len() > EXECUTION_LOG_CAPACITY {
            logs.remove(0);
        }
    }

    pub async fn get_execution_logs(&self) -> Vec<JobExecutionLog> {
        self.execution_logs.read().await.clone()
    }

    /// Cancel all job loops and wait for them to drain.
    pub async fn shutdown(&self) {
        info!("Shutting down background job scheduler");
        self.shutdown.cancel();

        let mut handles = self.handles.lock().await;
        for handle in handles.drain(..) {
            if let Err(e) = handle.await {
                error!(error = %e, "job loop task panicked");
            }
        }
    }
}

impl Default for JobScheduler {
    fn default() -> Self {
        Self::new()
    }
}
