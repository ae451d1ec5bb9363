use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::request::RequestStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OvertimeRequest {
    #[schema(example = "7c9e6679-7425-40de-944b-e07fc1f90ae7")]
    pub id: String,
    #[schema(example = "EMP1")]
    pub employee_id: String,
    #[schema(example = "2025-04-01T17:00:00Z", format = "date-time", value_type = String)]
    pub start_date: DateTime<Utc>,
    #[schema(example = "2025-04-01T19:00:00Z", format = "date-time", value_type = String)]
    pub end_date: DateTime<Utc>,
    #[schema(example = "Release night")]
    pub reason: String,
    pub status: RequestStatus,
    #[schema(example = "2025-04-02T09:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl OvertimeRequest {
    pub fn duration(&self) -> Duration {
        self.end_date - self.start_date
    }
}
