use serde::Serialize;
use utoipa::ToSchema;

use crate::model::request::Request;

/// Dashboard summary: the newest request of each kind plus everything pending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct Notifications {
    #[schema(value_type = Vec<Object>)]
    pub latest: Vec<Request>,
    #[schema(value_type = Vec<Object>)]
    pub pending: Vec<Request>,
}

/// `latest` keeps the caller's kind order and drops kinds without requests;
/// `pending` is merged across kinds, newest first.
pub fn summarize(
    latest: impl IntoIterator<Item = Option<Request>>,
    pending: impl IntoIterator<Item = Vec<Request>>,
) -> Notifications {
    let latest = latest.into_iter().flatten().collect();
    let mut pending: Vec<Request> = pending.into_iter().flatten().collect();
    pending.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    Notifications { latest, pending }
}
