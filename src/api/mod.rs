use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::engine::lifecycle::RequestDraft;
use crate::error::ServiceError;
use crate::model::request::{RequestKind, RequestStatus};
use crate::service::TimekeepingService;
use crate::store::{PageRequest, RequestFilter};

pub mod activity;
pub mod approval;
pub mod attendance;
pub mod dashboard;
pub mod dtrp;
pub mod leave_request;
pub mod notifications;
pub mod overtime;

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct RequestListQuery {
    /// Filter by employee ID (managers only; employees always see their own)
    #[schema(example = "EMP1")]
    pub employee_id: Option<String>,
    /// Filter by status
    pub status: Option<RequestStatus>,
    /// Filter by leave type (leave only)
    #[schema(example = "sick")]
    pub leave_type: Option<String>,
    /// Keep requests on or after this day
    #[schema(example = "2025-03-01", format = "date", value_type = Option<String>)]
    #[param(value_type = Option<String>, format = "date")]
    pub start_date: Option<NaiveDate>,
    /// Keep requests on or before this day
    #[schema(example = "2025-03-31", format = "date", value_type = Option<String>)]
    #[param(value_type = Option<String>, format = "date")]
    pub end_date: Option<NaiveDate>,
    /// Pagination page number (start with 1)
    #[schema(example = 1)]
    pub page: Option<u32>,
    /// Items per page (max 100)
    #[schema(example = 10)]
    pub page_size: Option<u32>,
}

/* =========================
Shared request handlers
========================= */

pub(crate) async fn create(
    auth: &AuthUser,
    service: &TimekeepingService,
    mut draft: RequestDraft,
) -> Result<HttpResponse, ServiceError> {
    let employee_id = auth.acting_for(draft.employee_id())?;
    draft.set_employee_id(employee_id);
    let request = service.create_request(draft, Utc::now()).await?;
    Ok(HttpResponse::Created().json(request))
}

pub(crate) async fn update(
    auth: &AuthUser,
    service: &TimekeepingService,
    kind: RequestKind,
    id: &str,
    patch: RequestDraft,
) -> Result<HttpResponse, ServiceError> {
    let request = service
        .update_request(kind, id, patch, auth.owner_scope()?)
        .await?;
    Ok(HttpResponse::Ok().json(request))
}

pub(crate) async fn delete(
    auth: &AuthUser,
    service: &TimekeepingService,
    kind: RequestKind,
    id: &str,
) -> Result<HttpResponse, ServiceError> {
    service.delete_request(kind, id, auth.owner_scope()?).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub(crate) async fn get(
    auth: &AuthUser,
    service: &TimekeepingService,
    kind: RequestKind,
    id: &str,
) -> Result<HttpResponse, ServiceError> {
    let request = service.get_request(kind, id, auth.owner_scope()?).await?;
    Ok(HttpResponse::Ok().json(request))
}

pub(crate) async fn list(
    auth: &AuthUser,
    service: &TimekeepingService,
    kind: RequestKind,
    query: RequestListQuery,
) -> Result<HttpResponse, ServiceError> {
    let employee_id = match auth.owner_scope()? {
        Some(own) => Some(own.to_string()),
        None => query.employee_id,
    };
    let filter = RequestFilter {
        employee_id,
        status: query.status,
        leave_type: query.leave_type.filter(|_| kind == RequestKind::Leave),
        from: query.start_date,
        to: query.end_date,
    };
    let page = service
        .list_requests(kind, &filter, PageRequest::new(query.page, query.page_size))
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Body and query parse failures rendered like every other validation error.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        ServiceError::Validation(format!("Invalid request body: {err}")).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        ServiceError::Validation(format!("Invalid query string: {err}")).into()
    })
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        ServiceError::Validation(format!("Invalid path: {err}")).into()
    })
}
