//! Building, editing, and deciding requests. Pure functions only; the
//! service layer wraps them in a unit of work.

use std::ops::RangeInclusive;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::ServiceError;
use crate::model::dtrp::{DtrpRequest, DtrpType};
use crate::model::leave_request::LeaveRequest;
use crate::model::overtime::OvertimeRequest;
use crate::model::request::{Decision, Request, RequestKind, RequestStatus};

/// Shortest overtime that can be filed.
pub fn minimum_overtime() -> Duration {
    Duration::hours(1)
}

/// Most calendar days one leave request may cover, both ends included.
pub const MAX_LEAVE_DAYS: i64 = 366;

/// Years a `DATE`/`DATETIME` column can hold.
const STORABLE_YEARS: RangeInclusive<i32> = 1000..=9999;

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DtrpDraft {
    #[schema(example = "EMP1")]
    pub employee_id: Option<String>,
    #[serde(alias = "dateTime")]
    #[schema(example = "2025-04-01T08:00:00Z", format = "date-time", value_type = Option<String>)]
    pub date: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub dtrp_type: Option<DtrpType>,
    #[schema(example = "Forgot to clock in")]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LeaveDraft {
    #[schema(example = "EMP1")]
    pub employee_id: Option<String>,
    #[schema(example = "sick")]
    pub leave_type: Option<String>,
    #[schema(example = "2025-03-01", format = "date", value_type = Option<String>)]
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2025-03-03", format = "date", value_type = Option<String>)]
    pub end_date: Option<NaiveDate>,
    #[schema(example = "Flu")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct OvertimeDraft {
    #[schema(example = "EMP1")]
    pub employee_id: Option<String>,
    #[schema(example = "2025-04-01T17:00:00Z", format = "date-time", value_type = Option<String>)]
    pub start_date: Option<DateTime<Utc>>,
    #[schema(example = "2025-04-01T19:00:00Z", format = "date-time", value_type = Option<String>)]
    pub end_date: Option<DateTime<Utc>>,
    #[schema(example = "Release night")]
    pub reason: Option<String>,
}

/// A request as submitted: every field may be missing until validated.
/// Also used as a patch, where missing fields keep their stored value.
#[derive(Debug, Clone)]
pub enum RequestDraft {
    Dtrp(DtrpDraft),
    Leave(LeaveDraft),
    Overtime(OvertimeDraft),
}

impl RequestDraft {
    pub fn kind(&self) -> RequestKind {
        match self {
            RequestDraft::Dtrp(_) => RequestKind::Dtrp,
            RequestDraft::Leave(_) => RequestKind::Leave,
            RequestDraft::Overtime(_) => RequestKind::Overtime,
        }
    }

    pub fn employee_id(&self) -> Option<&str> {
        match self {
            RequestDraft::Dtrp(d) => d.employee_id.as_deref(),
            RequestDraft::Leave(d) => d.employee_id.as_deref(),
            RequestDraft::Overtime(d) => d.employee_id.as_deref(),
        }
    }

    pub fn set_employee_id(&mut self, employee_id: String) {
        match self {
            RequestDraft::Dtrp(d) => d.employee_id = Some(employee_id),
            RequestDraft::Leave(d) => d.employee_id = Some(employee_id),
            RequestDraft::Overtime(d) => d.employee_id = Some(employee_id),
        }
    }
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, ServiceError> {
    value.ok_or_else(|| ServiceError::Validation(format!("{field} is required")))
}

fn required_text(value: Option<String>, field: &str) -> Result<String, ServiceError> {
    let value = required(value, field)?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Refuses dates and timestamps outside what the ledger columns can hold.
pub fn storable<T: Datelike>(value: &T, field: &str) -> Result<(), ServiceError> {
    if STORABLE_YEARS.contains(&value.year()) {
        Ok(())
    } else {
        Err(ServiceError::Validation(format!(
            "{field} must fall between the years {} and {}",
            STORABLE_YEARS.start(),
            STORABLE_YEARS.end()
        )))
    }
}

fn validate(request: &Request) -> Result<(), ServiceError> {
    match request {
        Request::Dtrp(r) => storable(&r.date, "date")?,
        Request::Leave(r) => {
            storable(&r.start_date, "start_date")?;
            storable(&r.end_date, "end_date")?;
        }
        Request::Overtime(r) => {
            storable(&r.start_date, "start_date")?;
            storable(&r.end_date, "end_date")?;
        }
    }

    match request {
        Request::Dtrp(_) => Ok(()),
        Request::Leave(r) if r.start_date > r.end_date => Err(ServiceError::Validation(
            "start_date cannot be after end_date".into(),
        )),
        Request::Leave(r) if (r.end_date - r.start_date).num_days() >= MAX_LEAVE_DAYS => {
            Err(ServiceError::Validation(format!(
                "a leave request cannot cover more than {MAX_LEAVE_DAYS} days"
            )))
        }
        Request::Leave(_) => Ok(()),
        Request::Overtime(r) if r.end_date < r.start_date => Err(ServiceError::Validation(
            "end_date cannot be earlier than start_date".into(),
        )),
        Request::Overtime(r) if r.duration() < minimum_overtime() => Err(
            ServiceError::Validation("Minimum to file overtime is 1 hour".into()),
        ),
        Request::Overtime(_) => Ok(()),
    }
}

/// Turns a submission into a new `PENDING` request.
pub fn build(draft: RequestDraft, id: String, now: DateTime<Utc>) -> Result<Request, ServiceError> {
    let request = match draft {
        RequestDraft::Dtrp(d) => Request::Dtrp(DtrpRequest {
            id,
            employee_id: required_text(d.employee_id, "employee_id")?,
            dtrp_type: required(d.dtrp_type, "type")?,
            date: required(d.date, "date")?,
            remarks: required_text(d.remarks, "remarks")?,
            status: RequestStatus::Pending,
            created_at: now,
        }),
        RequestDraft::Leave(d) => Request::Leave(LeaveRequest {
            id,
            employee_id: required_text(d.employee_id, "employee_id")?,
            leave_type: required_text(d.leave_type, "leave_type")?,
            start_date: required(d.start_date, "start_date")?,
            end_date: required(d.end_date, "end_date")?,
            reason: required_text(d.reason, "reason")?,
            status: RequestStatus::Pending,
            created_at: now,
        }),
        RequestDraft::Overtime(d) => Request::Overtime(OvertimeRequest {
            id,
            employee_id: required_text(d.employee_id, "employee_id")?,
            start_date: required(d.start_date, "start_date")?,
            end_date: required(d.end_date, "end_date")?,
            reason: required_text(d.reason, "reason")?,
            status: RequestStatus::Pending,
            created_at: now,
        }),
    };
    validate(&request)?;
    Ok(request)
}

fn keep_or(text: Option<String>, current: &str) -> String {
    match text.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => current.to_string(),
    }
}

/// Merges a patch into a `PENDING` request. The owner and status never change.
pub fn apply_patch(existing: &Request, patch: RequestDraft) -> Result<Request, ServiceError> {
    if existing.status() != RequestStatus::Pending {
        return Err(ServiceError::InvalidState(format!(
            "only PENDING requests can be edited, this one is {}",
            existing.status()
        )));
    }

    let updated = match (existing, patch) {
        (Request::Dtrp(r), RequestDraft::Dtrp(p)) => Request::Dtrp(DtrpRequest {
            dtrp_type: p.dtrp_type.unwrap_or(r.dtrp_type),
            date: p.date.unwrap_or(r.date),
            remarks: keep_or(p.remarks, &r.remarks),
            ..r.clone()
        }),
        (Request::Leave(r), RequestDraft::Leave(p)) => Request::Leave(LeaveRequest {
            leave_type: keep_or(p.leave_type, &r.leave_type),
            start_date: p.start_date.unwrap_or(r.start_date),
            end_date: p.end_date.unwrap_or(r.end_date),
            reason: keep_or(p.reason, &r.reason),
            ..r.clone()
        }),
        (Request::Overtime(r), RequestDraft::Overtime(p)) => Request::Overtime(OvertimeRequest {
            start_date: p.start_date.unwrap_or(r.start_date),
            end_date: p.end_date.unwrap_or(r.end_date),
            reason: keep_or(p.reason, &r.reason),
            ..r.clone()
        }),
        (existing, patch) => {
            return Err(ServiceError::Validation(format!(
                "cannot apply a {} patch to a {} request",
                patch.kind(),
                existing.kind()
            )));
        }
    };
    validate(&updated)?;
    Ok(updated)
}

/// `PENDING -> RESOLVED/APPROVED | REJECTED`; every other move is refused.
pub fn transition(
    kind: RequestKind,
    current: RequestStatus,
    decision: Decision,
) -> Result<RequestStatus, ServiceError> {
    if current.is_terminal() {
        return Err(ServiceError::InvalidState(format!(
            "request was already decided ({current})"
        )));
    }
    Ok(match decision {
        Decision::Approve => kind.accepted_status(),
        Decision::Reject => RequestStatus::Rejected,
    })
}
