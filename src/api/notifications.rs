use actix_web::{HttpResponse, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::auth::AuthUser;
use crate::service::TimekeepingService;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct NotificationQuery {
    /// Managers may narrow the feed to one employee
    pub employee_id: Option<String>,
}

/// Latest request of each kind plus every PENDING request, newest first.
/// Employees see their own; managers see everyone unless `employee_id` is given.
#[utoipa::path(
    get,
    path = "/api/notifications",
    params(NotificationQuery),
    responses(
        (status = 200, description = "Notification feed", body = crate::engine::notifications::Notifications),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Notifications"
)]
pub async fn notifications(
    auth: AuthUser,
    service: web::Data<TimekeepingService>,
    query: web::Query<NotificationQuery>,
) -> actix_web::Result<HttpResponse> {
    let scope = match auth.owner_scope()? {
        Some(own) => Some(own.to_string()),
        None => query.into_inner().employee_id,
    };
    let feed = service.notifications(scope.as_deref()).await?;
    Ok(HttpResponse::Ok().json(feed))
}
