use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One entry produced by the activity-recognition feed. Read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ActivityLog {
    pub id: String,
    #[schema(example = "EMP1")]
    pub employee_id: String,
    #[schema(example = "Idle")]
    pub activity: String,
    #[schema(example = "2025-04-01T10:00:00Z", format = "date-time", value_type = String)]
    pub start: DateTime<Utc>,
    /// `None` while the activity is still ongoing.
    #[schema(example = "2025-04-01T10:05:00Z", format = "date-time", value_type = Option<String>)]
    pub end: Option<DateTime<Utc>>,
}
