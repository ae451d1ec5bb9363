//! Live productivity figures computed from activity-recognition logs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::activity_log::ActivityLog;
use crate::model::employee::{STATUS_IDLE, STATUS_SLEEPING};

pub const AWAKE: &str = "Awake";

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProductivitySnapshot {
    #[schema(example = "Active", nullable = true)]
    pub employee_status: Option<String>,
    #[schema(example = "Awake")]
    pub wakefulness_status: String,
    #[schema(example = 87)]
    pub productivity_percentage: u8,
    /// Milliseconds.
    pub idle_time: i64,
    /// Milliseconds.
    pub sleeping_time: i64,
    /// Milliseconds since today's time-in.
    pub total_time: i64,
}

/// Total milliseconds spent in `activity`; ongoing logs count up to `now`.
fn time_in_activity(logs: &[ActivityLog], activity: &str, now: DateTime<Utc>) -> i64 {
    logs.iter()
        .filter(|log| log.activity == activity)
        .map(|log| {
            let end = log.end.unwrap_or(now);
            (end - log.start).num_milliseconds().max(0)
        })
        .sum()
}

/// "Sleeping" or "Idle" when the most recent ongoing log says so, else "Awake".
fn wakefulness(logs: &[ActivityLog]) -> String {
    logs.iter()
        .filter(|log| log.end.is_none())
        .max_by_key(|log| log.start)
        .map(|log| log.activity.as_str())
        .filter(|activity| *activity == STATUS_SLEEPING || *activity == STATUS_IDLE)
        .unwrap_or(AWAKE)
        .to_string()
}

/// `logs` are today's logs for one employee.
pub fn snapshot(
    employee_status: Option<String>,
    time_in: DateTime<Utc>,
    logs: &[ActivityLog],
    now: DateTime<Utc>,
) -> ProductivitySnapshot {
    let idle_time = time_in_activity(logs, STATUS_IDLE, now);
    let sleeping_time = time_in_activity(logs, STATUS_SLEEPING, now);
    let total_time = (now - time_in).num_milliseconds();
    let non_productive = idle_time + sleeping_time;

    let percentage = if non_productive == 0 || total_time <= 0 {
        100.0
    } else {
        (total_time - non_productive) as f64 / total_time as f64 * 100.0
    };

    ProductivitySnapshot {
        employee_status,
        wakefulness_status: wakefulness(logs),
        productivity_percentage: percentage.round().clamp(0.0, 100.0) as u8,
        idle_time,
        sleeping_time,
        total_time,
    }
}
