use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::model::dtrp::DtrpRequest;
use crate::model::leave_request::LeaveRequest;
use crate::model::overtime::OvertimeRequest;

/// The three request kinds an employee can file.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum RequestKind {
    #[serde(rename = "DTRP", alias = "dtrp")]
    #[strum(to_string = "DTRP")]
    Dtrp,
    #[serde(rename = "Leave", alias = "leave")]
    #[strum(to_string = "Leave")]
    Leave,
    #[serde(rename = "Overtime", alias = "overtime")]
    #[strum(to_string = "Overtime")]
    Overtime,
}

impl RequestKind {
    pub const ALL: [RequestKind; 3] = [RequestKind::Dtrp, RequestKind::Overtime, RequestKind::Leave];

    /// DTRP closes as `RESOLVED`, the other kinds as `APPROVED`.
    pub fn accepted_status(&self) -> RequestStatus {
        match self {
            RequestKind::Dtrp => RequestStatus::Resolved,
            RequestKind::Leave | RequestKind::Overtime => RequestStatus::Approved,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString,
    AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum RequestStatus {
    Pending,
    Approved,
    Resolved,
    Rejected,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    #[serde(alias = "APPROVED", alias = "approve", alias = "approved")]
    Approve,
    #[serde(alias = "REJECTED", alias = "reject", alias = "rejected")]
    Reject,
}

/// A request of any kind, as stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "file_type")]
pub enum Request {
    #[serde(rename = "DTRP")]
    Dtrp(DtrpRequest),
    Leave(LeaveRequest),
    Overtime(OvertimeRequest),
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        match self {
            Request::Dtrp(_) => RequestKind::Dtrp,
            Request::Leave(_) => RequestKind::Leave,
            Request::Overtime(_) => RequestKind::Overtime,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Request::Dtrp(r) => &r.id,
            Request::Leave(r) => &r.id,
            Request::Overtime(r) => &r.id,
        }
    }

    pub fn employee_id(&self) -> &str {
        match self {
            Request::Dtrp(r) => &r.employee_id,
            Request::Leave(r) => &r.employee_id,
            Request::Overtime(r) => &r.employee_id,
        }
    }

    pub fn status(&self) -> RequestStatus {
        match self {
            Request::Dtrp(r) => r.status,
            Request::Leave(r) => r.status,
            Request::Overtime(r) => r.status,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Request::Dtrp(r) => r.created_at,
            Request::Leave(r) => r.created_at,
            Request::Overtime(r) => r.created_at,
        }
    }

    pub fn set_status(&mut self, status: RequestStatus) {
        match self {
            Request::Dtrp(r) => r.status = status,
            Request::Leave(r) => r.status = status,
            Request::Overtime(r) => r.status = status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    #[case("dtrp", RequestKind::Dtrp)]
    #[case("DTRP", RequestKind::Dtrp)]
    #[case("leave", RequestKind::Leave)]
    #[case("Overtime", RequestKind::Overtime)]
    fn parses_kind_from_path_segment(#[case] raw: &str, #[case] expected: RequestKind) {
        assert_eq!(RequestKind::from_str(raw).unwrap(), expected);
    }

    #[rstest]
    fn dtrp_resolves_while_others_approve() {
        assert_eq!(RequestKind::Dtrp.accepted_status(), RequestStatus::Resolved);
        assert_eq!(RequestKind::Leave.accepted_status(), RequestStatus::Approved);
        assert_eq!(RequestKind::Overtime.accepted_status(), RequestStatus::Approved);
    }

    #[rstest]
    fn status_round_trips_through_storage_text() {
        assert_eq!(RequestStatus::Resolved.to_string(), "RESOLVED");
        assert_eq!(RequestStatus::from_str("pending").unwrap(), RequestStatus::Pending);
    }

    #[rstest]
    #[case(r#""APPROVED""#, Decision::Approve)]
    #[case(r#""APPROVE""#, Decision::Approve)]
    #[case(r#""REJECT""#, Decision::Reject)]
    fn accepts_decision_spellings(#[case] raw: &str, #[case] expected: Decision) {
        let decision: Decision = serde_json::from_str(raw).unwrap();
        assert_eq!(decision, expected);
    }
}
