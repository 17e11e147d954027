use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
}

/// A recurring maintenance agreement for a customer site.
///
/// The SLA scheduler reads `active`, `next_due_date` and `frequency_months`,
/// and only ever writes `next_due_date` (forward, never backward).
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceContract {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub title: String,
    /// Rendered into each generated job's description, suffixed with the
    /// period label ("January 2024").
    pub job_template: String,
    pub active: bool,
    pub next_due_date: NaiveDate,
    pub frequency_months: i32,
    pub price_per_visit: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceJob {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub contract_id: Option<Uuid>,
    pub category: String, // maintenance, installation, repair, inspection
    pub description: String,
    pub status: String,   // pending, in_progress, completed, cancelled
    pub priority: String, // low, normal, high, urgent
    pub scheduled_date: NaiveDate,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

pub mod job_status {
    pub const PENDING: &str = "pending";
    pub const IN_PROGRESS: &str = "in_progress";
    pub const COMPLETED: &str = "completed";
    pub const CANCELLED: &str = "cancelled";

    pub const ALL: &[&str] = &[PENDING, IN_PROGRESS, COMPLETED, CANCELLED];

    /// Allowed lifecycle moves: pending -> in_progress -> completed, with
    /// cancellation possible from any non-terminal state.
    pub fn can_transition(from: &str, to: &str) -> bool {
        matches!(
            (from, to),
            (PENDING, IN_PROGRESS)
                | (PENDING, CANCELLED)
                | (IN_PROGRESS, COMPLETED)
                | (IN_PROGRESS, CANCELLED)
        )
    }
}

pub mod job_priority {
    pub const LOW: &str = "low";
    pub const NORMAL: &str = "normal";
    pub const HIGH: &str = "high";
    pub const URGENT: &str = "urgent";

    pub const ALL: &[&str] = &[LOW, NORMAL, HIGH, URGENT];
}

pub mod job_category {
    pub const MAINTENANCE: &str = "maintenance";
    pub const INSTALLATION: &str = "installation";
    pub const REPAIR: &str = "repair";
    pub const INSPECTION: &str = "inspection";

    pub const ALL: &[&str] = &[MAINTENANCE, INSTALLATION, REPAIR, INSPECTION];
}
