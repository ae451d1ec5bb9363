use std::str::FromStr;

use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::error::ServiceError;
use crate::model::request::{Decision, RequestKind};
use crate::service::TimekeepingService;

#[derive(Debug, Deserialize, ToSchema)]
pub struct DecisionBody {
    #[schema(example = "APPROVE")]
    pub decision: Decision,
}

/* =========================
Approve / reject a request
========================= */
/// Moves a PENDING request to its terminal status. Approving also writes
/// the attendance ledger in the same unit of work.
#[utoipa::path(
    put,
    path = "/api/approval/{kind}/{id}",
    params(
        ("kind" = String, Path, description = "dtrp, leave or overtime"),
        ("id" = String, Path, description = "ID of the request")
    ),
    request_body = DecisionBody,
    responses(
        (status = 200, description = "Request decided", body = crate::service::DecisionOutcome, example = json!({
            "request": {"file_type": "Leave", "id": "5b1c0c2e-6a4b-4c56-9f1f-0c3fb0a1f2a1", "employee_id": "EMP1", "leave_type": "sick", "start_date": "2025-04-07", "end_date": "2025-04-08", "reason": "Flu", "status": "APPROVED", "created_at": "2025-04-01T09:00:00Z"},
            "reconciliation": {"written_days": ["2025-04-07", "2025-04-08"], "skipped_days": []}
        })),
        (status = 400, description = "Unknown request kind or decision"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Request not found"),
        (status = 422, description = "Request already decided"),
        (status = 500, description = "Ledger write failed, nothing was changed")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Approval"
)]
#[instrument(
    name = "approval_decide",
    skip(auth, service, path, payload),
    fields(user_id = auth.user_id, username = %auth.username)
)]
pub async fn decide(
    auth: AuthUser,
    service: web::Data<TimekeepingService>,
    path: web::Path<(String, String)>,
    payload: web::Json<DecisionBody>,
) -> actix_web::Result<HttpResponse> {
    auth.require_manager()?;
    let (kind, id) = path.into_inner();
    let kind = RequestKind::from_str(&kind)
        .map_err(|_| ServiceError::Validation(format!("Unknown request kind: {kind}")))?;

    info!(kind = %kind, request_id = %id, decision = ?payload.decision, "Decision received");

    let outcome = service
        .decide_request(kind, &id, payload.decision, Utc::now().date_naive())
        .await?;
    Ok(HttpResponse::Ok().json(outcome))
}
