use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::auth::auth::AuthUser;
use crate::service::TimekeepingService;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ActivityQuery {
    /// Managers may narrow the logs to one employee
    pub employee_id: Option<String>,
}

/// Recomputes every employee's live status from approved leaves and the
/// ongoing activity feed (Admin/Employer).
#[utoipa::path(
    post,
    path = "/api/activity/refresh",
    responses(
        (status = 200, description = "Statuses refreshed", body = crate::engine::status::RefreshCounts),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Activity"
)]
pub async fn refresh_statuses(
    auth: AuthUser,
    service: web::Data<TimekeepingService>,
) -> actix_web::Result<HttpResponse> {
    auth.require_manager()?;
    let counts = service.refresh_statuses(Utc::now().date_naive()).await?;
    Ok(HttpResponse::Ok().json(counts))
}

#[utoipa::path(
    put,
    path = "/api/activity/{employee_id}/active",
    params(
        ("employee_id" = String, Path, description = "Employee to mark Active")
    ),
    responses(
        (status = 200, description = "Status set to Active", body = Object, example = json!({
            "employee_id": "EMP1",
            "activity_status": "Active"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Employees can only mark themselves"),
        (status = 404, description = "Employee has no profile")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Activity"
)]
pub async fn mark_active(
    auth: AuthUser,
    service: web::Data<TimekeepingService>,
    path: web::Path<String>,
) -> actix_web::Result<HttpResponse> {
    let employee_id = auth.acting_for(Some(path.as_str()))?;
    service.mark_active(&employee_id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "employee_id": employee_id,
        "activity_status": crate::model::employee::STATUS_ACTIVE,
    })))
}

/// Activity logs that started today, oldest first
#[utoipa::path(
    get,
    path = "/api/activity/today",
    params(ActivityQuery),
    responses(
        (status = 200, description = "Today's activity logs", body = [crate::model::activity_log::ActivityLog]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Activity"
)]
pub async fn today_logs(
    auth: AuthUser,
    service: web::Data<TimekeepingService>,
    query: web::Query<ActivityQuery>,
) -> actix_web::Result<HttpResponse> {
    let scope = match auth.owner_scope()? {
        Some(own) => Some(own.to_string()),
        None => query.into_inner().employee_id,
    };
    let logs = service
        .today_activity_logs(scope.as_deref(), Utc::now().date_naive())
        .await?;
    Ok(HttpResponse::Ok().json(logs))
}
