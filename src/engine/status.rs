//! Daily refresh of live activity statuses.
//!
//! The rules run in order over one working copy of the statuses, so a later
//! rule sees what an earlier one wrote.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::activity_log::ActivityLog;
use crate::model::employee::{EmployeeStatus, STATUS_ACTIVE, STATUS_ON_LEAVE};
use crate::model::leave_request::LeaveRequest;

/// Employees touched by each rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct RefreshCounts {
    pub leave_started: u32,
    pub leave_ended: u32,
    pub from_activity: u32,
    pub defaulted_active: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusRefresh {
    /// `(employee_id, new status)` for every status that differs from before.
    pub changes: Vec<(String, String)>,
    pub counts: RefreshCounts,
}

pub fn refresh(
    statuses: &[EmployeeStatus],
    approved_leaves: &[LeaveRequest],
    ongoing: &[ActivityLog],
    today: NaiveDate,
) -> StatusRefresh {
    let mut working: BTreeMap<&str, Option<String>> = statuses
        .iter()
        .map(|s| (s.employee_id.as_str(), s.activity_status.clone()))
        .collect();
    let mut counts = RefreshCounts::default();
    let yesterday = today - Duration::days(1);

    let on_leave_today = |employee_id: &str| {
        approved_leaves
            .iter()
            .any(|l| l.employee_id == employee_id && l.start_date <= today && l.end_date >= today)
    };

    for leave in approved_leaves.iter().filter(|l| l.start_date == today) {
        if let Some(status) = working.get_mut(leave.employee_id.as_str()) {
            if status.as_deref() != Some(STATUS_ON_LEAVE) {
                *status = Some(STATUS_ON_LEAVE.to_string());
                counts.leave_started += 1;
            }
        }
    }

    // a leave ending yesterday does not undo one that covers today
    for leave in approved_leaves.iter().filter(|l| l.end_date == yesterday) {
        if on_leave_today(&leave.employee_id) {
            continue;
        }
        if let Some(status) = working.get_mut(leave.employee_id.as_str()) {
            if status.as_deref() == Some(STATUS_ON_LEAVE) {
                *status = Some(STATUS_ACTIVE.to_string());
                counts.leave_ended += 1;
            }
        }
    }

    for log in ongoing.iter().filter(|log| log.end.is_none()) {
        if let Some(status) = working.get_mut(log.employee_id.as_str()) {
            *status = Some(log.activity.clone());
            counts.from_activity += 1;
        }
    }

    for status in working.values_mut().filter(|s| s.is_none()) {
        *status = Some(STATUS_ACTIVE.to_string());
        counts.defaulted_active += 1;
    }

    let changes = statuses
        .iter()
        .filter_map(|before| {
            let after = working.get(before.employee_id.as_str())?.clone()?;
            (before.activity_status.as_deref() != Some(after.as_str()))
                .then(|| (before.employee_id.clone(), after))
        })
        .collect();

    StatusRefresh { changes, counts }
}
