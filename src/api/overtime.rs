use actix_web::{HttpResponse, web};

use crate::api::{self, RequestListQuery};
use crate::auth::auth::AuthUser;
use crate::engine::lifecycle::{OvertimeDraft, RequestDraft};
use crate::model::request::RequestKind;
use crate::service::TimekeepingService;

/* =========================
File a Overtime request
========================= */
/// Files overtime of at least one hour
#[utoipa::path(
    post,
    path = "/api/overtime",
    request_body(
        content = OvertimeDraft,
        description = "Overtime request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Overtime request filed as PENDING", body = Object, example = json!({"file_type": "Overtime", "id": "7c9e6679-7425-40de-944b-e07fc1f90ae7", "employee_id": "EMP1", "start_date": "2025-04-01T17:00:00Z", "end_date": "2025-04-01T19:00:00Z", "reason": "Release night", "status": "PENDING", "created_at": "2025-04-02T09:00:00Z"})),
        (status = 400, description = "Missing or invalid field"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "A non-rejected request already exists in this window")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Overtime"
)]
pub async fn create_overtime(
    auth: AuthUser,
    service: web::Data<TimekeepingService>,
    payload: web::Json<OvertimeDraft>,
) -> actix_web::Result<HttpResponse> {
    let draft = RequestDraft::Overtime(payload.into_inner());
    Ok(api::create(&auth, service.get_ref(), draft).await?)
}

/// Paginated overtime requests, newest first
#[utoipa::path(
    get,
    path = "/api/overtime",
    params(RequestListQuery),
    responses(
        (status = 200, description = "Paginated overtime list", body = crate::service::RequestPage),
        (status = 400, description = "Invalid filter"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Overtime"
)]
pub async fn list_overtime(
    auth: AuthUser,
    service: web::Data<TimekeepingService>,
    query: web::Query<RequestListQuery>,
) -> actix_web::Result<HttpResponse> {
    Ok(api::list(&auth, service.get_ref(), RequestKind::Overtime, query.into_inner()).await?)
}

#[utoipa::path(
    get,
    path = "/api/overtime/{id}",
    params(
        ("id" = String, Path, description = "ID of the overtime request")
    ),
    responses(
        (status = 200, description = "Overtime request found", body = crate::model::overtime::OvertimeRequest),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Overtime request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Overtime"
)]
pub async fn get_overtime(
    auth: AuthUser,
    service: web::Data<TimekeepingService>,
    path: web::Path<String>,
) -> actix_web::Result<HttpResponse> {
    Ok(api::get(&auth, service.get_ref(), RequestKind::Overtime, &path).await?)
}

/// Edits a PENDING request; absent fields keep their value
#[utoipa::path(
    put,
    path = "/api/overtime/{id}",
    params(
        ("id" = String, Path, description = "ID of the overtime request to edit")
    ),
    request_body = OvertimeDraft,
    responses(
        (status = 200, description = "Overtime request updated", body = crate::model::overtime::OvertimeRequest),
        (status = 400, description = "Invalid field"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Overtime request not found"),
        (status = 409, description = "A non-rejected request already exists in this window"),
        (status = 422, description = "Request is no longer PENDING")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Overtime"
)]
pub async fn update_overtime(
    auth: AuthUser,
    service: web::Data<TimekeepingService>,
    path: web::Path<String>,
    payload: web::Json<OvertimeDraft>,
) -> actix_web::Result<HttpResponse> {
    let patch = RequestDraft::Overtime(payload.into_inner());
    Ok(api::update(&auth, service.get_ref(), RequestKind::Overtime, &path, patch).await?)
}

#[utoipa::path(
    delete,
    path = "/api/overtime/{id}",
    params(
        ("id" = String, Path, description = "ID of the overtime request to delete")
    ),
    responses(
        (status = 204, description = "Overtime request deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Overtime request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Overtime"
)]
pub async fn delete_overtime(
    auth: AuthUser,
    service: web::Data<TimekeepingService>,
    path: web::Path<String>,
) -> actix_web::Result<HttpResponse> {
    Ok(api::delete(&auth, service.get_ref(), RequestKind::Overtime, &path).await?)
}
