use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const STATUS_ACTIVE: &str = "Active";
pub const STATUS_ON_LEAVE: &str = "On Leave";
pub const STATUS_IDLE: &str = "Idle";
pub const STATUS_SLEEPING: &str = "Sleeping";

/// Scheduled working hours from the employee profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Schedule {
    #[schema(example = "08:00", value_type = String)]
    pub time_in: NaiveTime,
    #[schema(example = "17:00", value_type = String)]
    pub time_out: NaiveTime,
}

impl Schedule {
    /// Merges the schedule onto a calendar day, both ends in UTC on that day.
    pub fn on(&self, day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            day.and_time(self.time_in).and_utc(),
            day.and_time(self.time_out).and_utc(),
        )
    }
}

/// Live activity status of one employee, as shown on dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EmployeeStatus {
    #[schema(example = "EMP1")]
    pub employee_id: String,
    #[schema(example = "Active", nullable = true)]
    pub activity_status: Option<String>,
}
