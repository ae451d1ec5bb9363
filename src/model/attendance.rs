use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Remark written on days synthesized from an approved leave.
pub const ON_LEAVE_REMARK: &str = "On Leave";
/// Default remark for a manual clock-out.
pub const CLOCKED_OUT_REMARK: &str = "Clocked out";

/// One Daily Time Record: at most one per employee per calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = "3f2504e0-4f89-11d3-9a0c-0305e82c3301")]
    pub id: String,
    #[schema(example = "EMP1")]
    pub employee_id: String,
    #[schema(example = "2025-04-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "2025-04-01T08:00:00Z", format = "date-time", value_type = Option<String>)]
    pub time_in: Option<DateTime<Utc>>,
    #[schema(example = "2025-04-01T17:00:00Z", format = "date-time", value_type = Option<String>)]
    pub time_out: Option<DateTime<Utc>>,
    #[schema(example = "Clocked out", nullable = true)]
    pub remarks: Option<String>,
}
