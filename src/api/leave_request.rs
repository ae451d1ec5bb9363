use actix_web::{HttpResponse, web};

use crate::api::{self, RequestListQuery};
use crate::auth::auth::AuthUser;
use crate::engine::lifecycle::{LeaveDraft, RequestDraft};
use crate::model::request::RequestKind;
use crate::service::TimekeepingService;

/* =========================
File a Leave request
========================= */
/// Files a leave over an inclusive range of calendar days
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = LeaveDraft,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request filed as PENDING", body = Object, example = json!({"file_type": "Leave", "id": "6ba7b810-9dad-11d1-80b4-00c04fd430c8", "employee_id": "EMP1", "leave_type": "sick", "start_date": "2025-03-01", "end_date": "2025-03-03", "reason": "Flu", "status": "PENDING", "created_at": "2025-02-20T10:00:00Z"})),
        (status = 400, description = "Missing or invalid field"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "A non-rejected request already exists in this window")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    service: web::Data<TimekeepingService>,
    payload: web::Json<LeaveDraft>,
) -> actix_web::Result<HttpResponse> {
    let draft = RequestDraft::Leave(payload.into_inner());
    Ok(api::create(&auth, service.get_ref(), draft).await?)
}

/// Paginated leave requests, newest first
#[utoipa::path(
    get,
    path = "/api/leave",
    params(RequestListQuery),
    responses(
        (status = 200, description = "Paginated leave list", body = crate::service::RequestPage),
        (status = 400, description = "Invalid filter"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn list_leave(
    auth: AuthUser,
    service: web::Data<TimekeepingService>,
    query: web::Query<RequestListQuery>,
) -> actix_web::Result<HttpResponse> {
    Ok(api::list(&auth, service.get_ref(), RequestKind::Leave, query.into_inner()).await?)
}

#[utoipa::path(
    get,
    path = "/api/leave/{id}",
    params(
        ("id" = String, Path, description = "ID of the leave request")
    ),
    responses(
        (status = 200, description = "Leave request found", body = crate::model::leave_request::LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    service: web::Data<TimekeepingService>,
    path: web::Path<String>,
) -> actix_web::Result<HttpResponse> {
    Ok(api::get(&auth, service.get_ref(), RequestKind::Leave, &path).await?)
}

/// Edits a PENDING request; absent fields keep their value
#[utoipa::path(
    put,
    path = "/api/leave/{id}",
    params(
        ("id" = String, Path, description = "ID of the leave request to edit")
    ),
    request_body = LeaveDraft,
    responses(
        (status = 200, description = "Leave request updated", body = crate::model::leave_request::LeaveRequest),
        (status = 400, description = "Invalid field"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "A non-rejected request already exists in this window"),
        (status = 422, description = "Request is no longer PENDING")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn update_leave(
    auth: AuthUser,
    service: web::Data<TimekeepingService>,
    path: web::Path<String>,
    payload: web::Json<LeaveDraft>,
) -> actix_web::Result<HttpResponse> {
    let patch = RequestDraft::Leave(payload.into_inner());
    Ok(api::update(&auth, service.get_ref(), RequestKind::Leave, &path, patch).await?)
}

#[utoipa::path(
    delete,
    path = "/api/leave/{id}",
    params(
        ("id" = String, Path, description = "ID of the leave request to delete")
    ),
    responses(
        (status = 204, description = "Leave request deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn delete_leave(
    auth: AuthUser,
    service: web::Data<TimekeepingService>,
    path: web::Path<String>,
) -> actix_web::Result<HttpResponse> {
    Ok(api::delete(&auth, service.get_ref(), RequestKind::Leave, &path).await?)
}
