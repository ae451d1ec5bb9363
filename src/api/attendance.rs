use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::service::{DayPatch, TimekeepingService};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CheckOut {
    /// Defaults to "Clocked out"
    #[schema(example = "Auto clock-out due to logout")]
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DayQuery {
    /// Required for managers; employees always read their own ledger
    pub employee_id: Option<String>,
    #[param(value_type = String, format = "date", example = "2025-04-01")]
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RangeQuery {
    /// Required for managers; employees always read their own ledger
    pub employee_id: Option<String>,
    /// First day, inclusive
    #[param(value_type = String, format = "date", example = "2025-04-01")]
    pub start_date: NaiveDate,
    /// Last day, inclusive
    #[param(value_type = String, format = "date", example = "2025-04-30")]
    pub end_date: NaiveDate,
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance",
    responses(
        (status = 201, description = "Checked in successfully", body = crate::model::attendance::AttendanceRecord),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile"),
        (status = 409, description = "Already checked in today", body = Object, example = json!({
            "error": "conflict",
            "message": "already clocked in today"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    service: web::Data<TimekeepingService>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.own_employee_id()?;
    let record = service.clock_in(employee_id, Utc::now()).await?;
    Ok(HttpResponse::Created().json(record))
}

/// Check-out endpoint
#[utoipa::path(
    put,
    path = "/api/attendance",
    request_body(content = CheckOut, description = "Optional, remarks default to \"Clocked out\"", content_type = "application/json"),
    responses(
        (status = 200, description = "Checked out successfully", body = crate::model::attendance::AttendanceRecord),
        (status = 400, description = "No check-in found for today", body = Object, example = json!({
            "error": "validation_error",
            "message": "no time-in recorded today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    service: web::Data<TimekeepingService>,
    payload: Option<web::Json<CheckOut>>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.own_employee_id()?;
    let remarks = payload.and_then(|p| p.into_inner().remarks);
    let record = service.clock_out(employee_id, remarks, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(record))
}

/// One day of an employee's ledger
#[utoipa::path(
    get,
    path = "/api/attendance/day",
    params(DayQuery),
    responses(
        (status = 200, description = "Record found", body = crate::model::attendance::AttendanceRecord),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No record on that day")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn find_day(
    auth: AuthUser,
    service: web::Data<TimekeepingService>,
    query: web::Query<DayQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.acting_for(query.employee_id.as_deref())?;
    let record = service.find_day(&employee_id, query.date).await?;
    Ok(HttpResponse::Ok().json(record))
}

/// Records between two days, both inclusive, oldest first
#[utoipa::path(
    get,
    path = "/api/attendance/range",
    params(RangeQuery),
    responses(
        (status = 200, description = "Records in range", body = [crate::model::attendance::AttendanceRecord]),
        (status = 400, description = "start_date after end_date"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn find_range(
    auth: AuthUser,
    service: web::Data<TimekeepingService>,
    query: web::Query<RangeQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.acting_for(query.employee_id.as_deref())?;
    let records = service
        .find_range(&employee_id, query.start_date, query.end_date)
        .await?;
    Ok(HttpResponse::Ok().json(records))
}

/// Sets fields on one day of the ledger (Admin/Employer)
#[utoipa::path(
    put,
    path = "/api/attendance/{employee_id}/{date}",
    params(
        ("employee_id" = String, Path, description = "Employee whose ledger is corrected"),
        ("date" = String, Path, description = "Day to upsert (YYYY-MM-DD)")
    ),
    request_body = DayPatch,
    responses(
        (status = 200, description = "Day written", body = crate::model::attendance::AttendanceRecord),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(
    name = "attendance_upsert_day",
    skip(auth, service, path, payload),
    fields(user_id = auth.user_id, username = %auth.username)
)]
pub async fn upsert_day(
    auth: AuthUser,
    service: web::Data<TimekeepingService>,
    path: web::Path<(String, NaiveDate)>,
    payload: web::Json<DayPatch>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;
    let (employee_id, date) = path.into_inner();
    info!(employee_id = %employee_id, %date, "Ledger correction received");
    let record = service
        .upsert_day(&employee_id, date, payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(record))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{admin_token, app, employee_token, seeded_store};
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn check_in_twice_conflicts() {
        let store = seeded_store().await;
        let app = test::init_service(app(&store)).await;

        let req = test::TestRequest::post()
            .uri("/api/attendance")
            .insert_header(("Authorization", employee_token("EMP1")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/api/attendance")
            .insert_header(("Authorization", employee_token("EMP1")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "conflict");
    }

    #[actix_web::test]
    async fn check_out_keeps_custom_remarks() {
        let store = seeded_store().await;
        let app = test::init_service(app(&store)).await;

        let req = test::TestRequest::post()
            .uri("/api/attendance")
            .insert_header(("Authorization", employee_token("EMP1")))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::put()
            .uri("/api/attendance")
            .insert_header(("Authorization", employee_token("EMP1")))
            .set_json(json!({ "remarks": "Auto clock-out due to logout" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["remarks"], "Auto clock-out due to logout");
        assert!(body["time_out"].is_string());
    }

    #[actix_web::test]
    async fn managers_upsert_and_employees_cannot() {
        let store = seeded_store().await;
        let app = test::init_service(app(&store)).await;
        let patch = json!({ "time_in": "2025-04-01T08:00:00Z", "remarks": "Adjusted" });

        let req = test::TestRequest::put()
            .uri("/api/attendance/EMP1/2025-04-01")
            .insert_header(("Authorization", employee_token("EMP1")))
            .set_json(&patch)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::put()
            .uri("/api/attendance/EMP1/2025-04-01")
            .insert_header(("Authorization", admin_token()))
            .set_json(&patch)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/api/attendance/range?start_date=2025-04-01&end_date=2025-04-30")
            .insert_header(("Authorization", employee_token("EMP1")))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        assert_eq!(body[0]["date"], "2025-04-01");
    }

    #[actix_web::test]
    async fn missing_day_is_not_found() {
        let store = seeded_store().await;
        let app = test::init_service(app(&store)).await;
        let req = test::TestRequest::get()
            .uri("/api/attendance/day?employee_id=EMP2&date=2025-04-01")
            .insert_header(("Authorization", admin_token()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
