use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::request::RequestStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = "6ba7b810-9dad-11d1-80b4-00c04fd430c8")]
    pub id: String,
    #[schema(example = "EMP1")]
    pub employee_id: String,
    #[schema(example = "sick")]
    pub leave_type: String,
    /// First day of leave, inclusive.
    #[schema(example = "2025-03-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    /// Last day of leave, inclusive.
    #[schema(example = "2025-03-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Flu")]
    pub reason: String,
    pub status: RequestStatus,
    #[schema(example = "2025-02-20T10:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// Every calendar day covered by the leave, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start_date
            .iter_days()
            .take_while(move |day| *day <= self.end_date)
    }
}
