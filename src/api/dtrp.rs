use actix_web::{HttpResponse, web};

use crate::api::{self, RequestListQuery};
use crate::auth::auth::AuthUser;
use crate::engine::lifecycle::{DtrpDraft, RequestDraft};
use crate::model::request::RequestKind;
use crate::service::TimekeepingService;

/* =========================
File a DTRP request
========================= */
/// Files a time-record correction for a missed or wrong clock-in/out
#[utoipa::path(
    post,
    path = "/api/dtrp",
    request_body(
        content = DtrpDraft,
        description = "DTRP request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "DTRP request filed as PENDING", body = Object, example = json!({"file_type": "DTRP", "id": "0f8fad5b-d9cb-469f-a165-70867728950e", "employee_id": "EMP1", "type": "time-in", "date": "2025-04-01T08:00:00Z", "remarks": "Forgot to clock in", "status": "PENDING", "created_at": "2025-04-01T09:00:00Z"})),
        (status = 400, description = "Missing or invalid field"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "A non-rejected request already exists in this window")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "DTRP"
)]
pub async fn create_dtrp(
    auth: AuthUser,
    service: web::Data<TimekeepingService>,
    payload: web::Json<DtrpDraft>,
) -> actix_web::Result<HttpResponse> {
    let draft = RequestDraft::Dtrp(payload.into_inner());
    Ok(api::create(&auth, service.get_ref(), draft).await?)
}

/// Paginated DTRP requests, newest first
#[utoipa::path(
    get,
    path = "/api/dtrp",
    params(RequestListQuery),
    responses(
        (status = 200, description = "Paginated DTRP list", body = crate::service::RequestPage),
        (status = 400, description = "Invalid filter"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "DTRP"
)]
pub async fn list_dtrp(
    auth: AuthUser,
    service: web::Data<TimekeepingService>,
    query: web::Query<RequestListQuery>,
) -> actix_web::Result<HttpResponse> {
    Ok(api::list(&auth, service.get_ref(), RequestKind::Dtrp, query.into_inner()).await?)
}

#[utoipa::path(
    get,
    path = "/api/dtrp/{id}",
    params(
        ("id" = String, Path, description = "ID of the DTRP request")
    ),
    responses(
        (status = 200, description = "DTRP request found", body = crate::model::dtrp::DtrpRequest),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "DTRP request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "DTRP"
)]
pub async fn get_dtrp(
    auth: AuthUser,
    service: web::Data<TimekeepingService>,
    path: web::Path<String>,
) -> actix_web::Result<HttpResponse> {
    Ok(api::get(&auth, service.get_ref(), RequestKind::Dtrp, &path).await?)
}

/// Edits a PENDING request; absent fields keep their value
#[utoipa::path(
    put,
    path = "/api/dtrp/{id}",
    params(
        ("id" = String, Path, description = "ID of the DTRP request to edit")
    ),
    request_body = DtrpDraft,
    responses(
        (status = 200, description = "DTRP request updated", body = crate::model::dtrp::DtrpRequest),
        (status = 400, description = "Invalid field"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "DTRP request not found"),
        (status = 409, description = "A non-rejected request already exists in this window"),
        (status = 422, description = "Request is no longer PENDING")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "DTRP"
)]
pub async fn update_dtrp(
    auth: AuthUser,
    service: web::Data<TimekeepingService>,
    path: web::Path<String>,
    payload: web::Json<DtrpDraft>,
) -> actix_web::Result<HttpResponse> {
    let patch = RequestDraft::Dtrp(payload.into_inner());
    Ok(api::update(&auth, service.get_ref(), RequestKind::Dtrp, &path, patch).await?)
}

#[utoipa::path(
    delete,
    path = "/api/dtrp/{id}",
    params(
        ("id" = String, Path, description = "ID of the DTRP request to delete")
    ),
    responses(
        (status = 204, description = "DTRP request deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "DTRP request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "DTRP"
)]
pub async fn delete_dtrp(
    auth: AuthUser,
    service: web::Data<TimekeepingService>,
    path: web::Path<String>,
) -> actix_web::Result<HttpResponse> {
    Ok(api::delete(&auth, service.get_ref(), RequestKind::Dtrp, &path).await?)
}
