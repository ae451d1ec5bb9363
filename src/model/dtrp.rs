use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::model::request::RequestStatus;

/// Which side of the day a DTRP corrects.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DtrpType {
    TimeIn,
    TimeOut,
}

/// Daily Time Record Problem: a correction for a missed or wrong clock-in/out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DtrpRequest {
    #[schema(example = "0f8fad5b-d9cb-469f-a165-70867728950e")]
    pub id: String,
    #[schema(example = "EMP1")]
    pub employee_id: String,
    #[serde(rename = "type")]
    pub dtrp_type: DtrpType,
    #[schema(example = "2025-04-01T08:00:00Z", format = "date-time", value_type = String)]
    pub date: DateTime<Utc>,
    #[schema(example = "Forgot to clock in")]
    pub remarks: String,
    pub status: RequestStatus,
    #[schema(example = "2025-04-01T09:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}
