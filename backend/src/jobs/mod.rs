// Background Jobs
//
// Recurring background work for the fieldserve platform. Each job runs in a
// loop owned by the JobScheduler: once at startup, then on a fixed interval
// that is re-armed only after the previous pass completes.

pub mod clock;
pub mod maintenance_sla;
pub mod scheduler;

pub use clock::{Clock, SystemClock};
pub use maintenance_sla::MaintenanceSlaJob;
pub use scheduler::{
    BackgroundJob, JobConfig, JobError, JobExecutionLog, JobResult, JobScheduler,
};
