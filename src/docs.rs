use crate::api::RequestListQuery;
use crate::api::approval::DecisionBody;
use crate::api::attendance::CheckOut;
use crate::engine::approval::ReconciliationReport;
use crate::engine::lifecycle::{DtrpDraft, LeaveDraft, OvertimeDraft};
use crate::engine::notifications::Notifications;
use crate::engine::productivity::ProductivitySnapshot;
use crate::engine::status::RefreshCounts;
use crate::model::activity_log::ActivityLog;
use crate::model::attendance::AttendanceRecord;
use crate::model::dtrp::{DtrpRequest, DtrpType};
use crate::model::leave_request::LeaveRequest;
use crate::model::overtime::OvertimeRequest;
use crate::model::request::{Decision, RequestKind, RequestStatus};
use crate::service::{DayPatch, DecisionOutcome, RequestPage};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Timekeeping API",
        version = "1.0.0",
        description = r#"
## Employee Timekeeping & Request Approval

Employees file **time-record corrections (DTRP)**, **leave** and **overtime**
requests. Admins and employers approve or reject them; approvals are written
back to the **attendance ledger** in the same transaction.

### 🔹 Key Features
- **Requests**
  - File, edit and withdraw DTRP, leave and overtime requests while PENDING
  - One non-rejected request per employee and time window
- **Approval**
  - Approve / reject with ledger reconciliation (all or nothing)
- **Attendance**
  - Daily clock-in / clock-out, day and range lookups
- **Activity & Dashboard**
  - Live activity status and a server-sent productivity feed

### 🔐 Security
Every endpoint is protected using **JWT Bearer authentication**.
Only **Admin** or **Employer** roles can decide requests or correct the ledger.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::dtrp::create_dtrp,
        crate::api::dtrp::list_dtrp,
        crate::api::dtrp::get_dtrp,
        crate::api::dtrp::update_dtrp,
        crate::api::dtrp::delete_dtrp,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::list_leave,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::update_leave,
        crate::api::leave_request::delete_leave,

        crate::api::overtime::create_overtime,
        crate::api::overtime::list_overtime,
        crate::api::overtime::get_overtime,
        crate::api::overtime::update_overtime,
        crate::api::overtime::delete_overtime,

        crate::api::approval::decide,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::find_day,
        crate::api::attendance::find_range,
        crate::api::attendance::upsert_day,

        crate::api::notifications::notifications,

        crate::api::activity::refresh_statuses,
        crate::api::activity::mark_active,
        crate::api::activity::today_logs,

        crate::api::dashboard::stream_dashboard
    ),
    components(
        schemas(
            RequestListQuery,
            RequestPage,
            RequestKind,
            RequestStatus,
            Decision,
            DecisionBody,
            DecisionOutcome,
            ReconciliationReport,
            DtrpDraft,
            DtrpRequest,
            DtrpType,
            LeaveDraft,
            LeaveRequest,
            OvertimeDraft,
            OvertimeRequest,
            AttendanceRecord,
            CheckOut,
            DayPatch,
            Notifications,
            ActivityLog,
            RefreshCounts,
            ProductivitySnapshot
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "DTRP", description = "Daily time record problem requests"),
        (name = "Leave", description = "Leave request APIs"),
        (name = "Overtime", description = "Overtime request APIs"),
        (name = "Approval", description = "Request approval APIs"),
        (name = "Attendance", description = "Attendance ledger APIs"),
        (name = "Notifications", description = "Request notification feed"),
        (name = "Activity", description = "Live activity status APIs"),
        (name = "Dashboard", description = "Productivity stream"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
