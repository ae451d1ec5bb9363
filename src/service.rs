//! Request and attendance operations. Every write runs in one unit of work
//! holding the employee lock, so the conflict check and the write it guards
//! cannot interleave with another write for the same employee.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::engine::approval::{self, DecisionContext, ReconciliationReport};
use crate::engine::conflict::ensure_no_conflict;
use crate::engine::lifecycle::{self, RequestDraft};
use crate::engine::notifications::{self, Notifications};
use crate::engine::productivity::{self, ProductivitySnapshot};
use crate::engine::status::{self, RefreshCounts};
use crate::error::ServiceError;
use crate::model::activity_log::ActivityLog;
use crate::model::attendance::{AttendanceRecord, CLOCKED_OUT_REMARK};
use crate::model::employee::{STATUS_ACTIVE, STATUS_ON_LEAVE};
use crate::model::request::{Decision, Request, RequestKind};
use crate::store::{PageRequest, RequestFilter, ScheduleSource, Store};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RequestPage {
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Request>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub page_size: u32,
    #[schema(example = 1)]
    pub total: u64,
    #[schema(example = 1)]
    pub total_pages: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DecisionOutcome {
    #[schema(value_type = Object)]
    pub request: Request,
    pub reconciliation: ReconciliationReport,
}

/// Fields to set on one day of the ledger; absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DayPatch {
    #[schema(example = "2025-04-01T08:00:00Z", format = "date-time", value_type = Option<String>)]
    pub time_in: Option<DateTime<Utc>>,
    #[schema(example = "2025-04-01T17:00:00Z", format = "date-time", value_type = Option<String>)]
    pub time_out: Option<DateTime<Utc>>,
    #[schema(example = "Adjusted by HR")]
    pub remarks: Option<String>,
}

fn not_found(kind: RequestKind, id: &str) -> ServiceError {
    ServiceError::NotFound(format!("{kind} request {id} not found"))
}

/// Requests owned by someone else are reported as missing.
fn visible_to(request: Option<Request>, owner: Option<&str>) -> Option<Request> {
    request.filter(|r| owner.is_none_or(|o| r.employee_id() == o))
}

fn start_of(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

#[derive(Clone)]
pub struct TimekeepingService {
    store: Arc<dyn Store>,
    schedules: Arc<dyn ScheduleSource>,
}

impl TimekeepingService {
    pub fn new(store: Arc<dyn Store>, schedules: Arc<dyn ScheduleSource>) -> Self {
        Self { store, schedules }
    }

    /* =========================
    Request store
    ========================= */

    pub async fn create_request(
        &self,
        draft: RequestDraft,
        now: DateTime<Utc>,
    ) -> Result<Request, ServiceError> {
        let request = lifecycle::build(draft, approval::new_record_id(), now)?;

        let mut tx = self.store.begin().await?;
        tx.lock_employee(request.employee_id()).await?;
        ensure_no_conflict(tx.as_mut(), &request).await?;
        tx.insert_request(&request).await?;
        tx.commit().await?;

        info!(
            kind = %request.kind(),
            request_id = request.id(),
            employee_id = request.employee_id(),
            "Request filed"
        );
        Ok(request)
    }

    pub async fn update_request(
        &self,
        kind: RequestKind,
        id: &str,
        patch: RequestDraft,
        owner: Option<&str>,
    ) -> Result<Request, ServiceError> {
        let owner_id = self.owner_of(kind, id, owner).await?;
        let mut tx = self.store.begin().await?;
        tx.lock_employee(&owner_id).await?;
        let existing = visible_to(tx.get_request(kind, id).await?, owner)
            .ok_or_else(|| not_found(kind, id))?;

        let updated = lifecycle::apply_patch(&existing, patch)?;
        ensure_no_conflict(tx.as_mut(), &updated).await?;
        tx.update_request(&updated).await?;
        tx.commit().await?;

        info!(kind = %kind, request_id = id, "Request updated");
        Ok(updated)
    }

    pub async fn delete_request(
        &self,
        kind: RequestKind,
        id: &str,
        owner: Option<&str>,
    ) -> Result<(), ServiceError> {
        let owner_id = self.owner_of(kind, id, owner).await?;
        let mut tx = self.store.begin().await?;
        tx.lock_employee(&owner_id).await?;
        if visible_to(tx.get_request(kind, id).await?, owner).is_none() {
            return Err(not_found(kind, id));
        }
        if !tx.delete_request(kind, id).await? {
            return Err(not_found(kind, id));
        }
        tx.commit().await?;

        info!(kind = %kind, request_id = id, "Request deleted");
        Ok(())
    }

    /// Owner of a visible request, read without row locks. Writers take the
    /// employee lock before any request row lock, so this runs before `begin`.
    async fn owner_of(
        &self,
        kind: RequestKind,
        id: &str,
        owner: Option<&str>,
    ) -> Result<String, ServiceError> {
        visible_to(self.store.get_request(kind, id).await?, owner)
            .map(|r| r.employee_id().to_string())
            .ok_or_else(|| not_found(kind, id))
    }

    pub async fn get_request(
        &self,
        kind: RequestKind,
        id: &str,
        owner: Option<&str>,
    ) -> Result<Request, ServiceError> {
        visible_to(self.store.get_request(kind, id).await?, owner)
            .ok_or_else(|| not_found(kind, id))
    }

    pub async fn list_requests(
        &self,
        kind: RequestKind,
        filter: &RequestFilter,
        page: PageRequest,
    ) -> Result<RequestPage, ServiceError> {
        if let Some(from) = &filter.from {
            lifecycle::storable(from, "start_date")?;
        }
        if let Some(to) = &filter.to {
            lifecycle::storable(to, "end_date")?;
        }
        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if from > to {
                return Err(ServiceError::Validation(
                    "start_date cannot be after end_date".into(),
                ));
            }
        }
        let (data, total) = self.store.list_requests(kind, filter, page).await?;
        Ok(RequestPage {
            data,
            page: page.page,
            page_size: page.page_size,
            total,
            total_pages: page.total_pages(total),
        })
    }

    /* =========================
    Approval engine
    ========================= */

    /// Applies a terminal decision. The status change, the ledger writes and
    /// the live status update commit together or not at all.
    pub async fn decide_request(
        &self,
        kind: RequestKind,
        id: &str,
        decision: Decision,
        today: NaiveDate,
    ) -> Result<DecisionOutcome, ServiceError> {
        let existing = self
            .store
            .get_request(kind, id)
            .await?
            .ok_or_else(|| not_found(kind, id))?;

        // looked up before the unit of work: the profile store is not ours
        let schedule = match (kind, decision) {
            (RequestKind::Leave, Decision::Approve) => {
                self.schedules.schedule(existing.employee_id()).await?
            }
            _ => None,
        };
        let ctx = DecisionContext { today, schedule };

        let mut tx = self.store.begin().await?;
        tx.lock_employee(existing.employee_id()).await?;
        let mut current = tx
            .get_request(kind, id)
            .await?
            .ok_or_else(|| not_found(kind, id))?;

        let plan = approval::plan(&current, decision, &ctx)?;
        let report = approval::reconcile(tx.as_mut(), &plan.writes).await?;

        if plan.mark_on_leave {
            let updated = tx
                .set_activity_status(current.employee_id(), STATUS_ON_LEAVE)
                .await
                .map_err(|e| ServiceError::Reconciliation(e.to_string()))?;
            if !updated {
                warn!(
                    employee_id = current.employee_id(),
                    "No employee profile, live status left unchanged"
                );
            }
        }

        current.set_status(plan.status);
        tx.update_request(&current).await?;
        tx.commit().await?;

        info!(
            kind = %kind,
            request_id = id,
            status = %plan.status,
            written = report.written_days.len(),
            skipped = report.skipped_days.len(),
            "Request decided"
        );
        Ok(DecisionOutcome {
            request: current,
            reconciliation: report,
        })
    }

    /* =========================
    Notifications
    ========================= */

    /// One employee's view when `employee_id` is set, otherwise everyone's.
    pub async fn notifications(
        &self,
        employee_id: Option<&str>,
    ) -> Result<Notifications, ServiceError> {
        let mut latest = Vec::with_capacity(RequestKind::ALL.len());
        let mut pending = Vec::with_capacity(RequestKind::ALL.len());
        for kind in RequestKind::ALL {
            latest.push(self.store.latest_request(kind, employee_id).await?);
            pending.push(self.store.pending_requests(kind, employee_id).await?);
        }
        Ok(notifications::summarize(latest, pending))
    }

    /* =========================
    Attendance ledger
    ========================= */

    pub async fn clock_in(
        &self,
        employee_id: &str,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, ServiceError> {
        let today = now.date_naive();
        let mut tx = self.store.begin().await?;
        tx.lock_employee(employee_id).await?;

        let record = match tx.find_day(employee_id, today).await? {
            Some(existing) if existing.time_in.is_some() => {
                return Err(ServiceError::Conflict("already clocked in today".into()));
            }
            Some(mut existing) => {
                existing.time_in = Some(now);
                tx.update_attendance(&existing).await?;
                existing
            }
            None => {
                let record = AttendanceRecord {
                    id: approval::new_record_id(),
                    employee_id: employee_id.to_string(),
                    date: today,
                    time_in: Some(now),
                    time_out: None,
                    remarks: None,
                };
                tx.insert_attendance(&record).await?;
                record
            }
        };
        tx.commit().await?;

        info!(employee_id, %today, "Clocked in");
        Ok(record)
    }

    pub async fn clock_out(
        &self,
        employee_id: &str,
        remarks: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, ServiceError> {
        let today = now.date_naive();
        let mut tx = self.store.begin().await?;
        tx.lock_employee(employee_id).await?;

        let mut record = tx
            .find_day(employee_id, today)
            .await?
            .filter(|r| r.time_in.is_some())
            .ok_or_else(|| ServiceError::Validation("no time-in recorded today".into()))?;
        record.time_out = Some(now);
        record.remarks = Some(
            remarks
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| CLOCKED_OUT_REMARK.to_string()),
        );
        tx.update_attendance(&record).await?;
        tx.commit().await?;

        info!(employee_id, %today, "Clocked out");
        Ok(record)
    }

    /// Day-keyed upsert: present fields overwrite, absent ones are kept.
    pub async fn upsert_day(
        &self,
        employee_id: &str,
        date: NaiveDate,
        patch: DayPatch,
    ) -> Result<AttendanceRecord, ServiceError> {
        let mut tx = self.store.begin().await?;
        tx.lock_employee(employee_id).await?;

        let record = match tx.find_day(employee_id, date).await? {
            Some(mut existing) => {
                existing.time_in = patch.time_in.or(existing.time_in);
                existing.time_out = patch.time_out.or(existing.time_out);
                existing.remarks = patch.remarks.or(existing.remarks);
                tx.update_attendance(&existing).await?;
                existing
            }
            None => {
                let record = AttendanceRecord {
                    id: approval::new_record_id(),
                    employee_id: employee_id.to_string(),
                    date,
                    time_in: patch.time_in,
                    time_out: patch.time_out,
                    remarks: patch.remarks,
                };
                tx.insert_attendance(&record).await?;
                record
            }
        };
        tx.commit().await?;
        Ok(record)
    }

    pub async fn find_day(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> Result<AttendanceRecord, ServiceError> {
        self.store
            .find_day(employee_id, date)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("no attendance record for {employee_id} on {date}"))
            })
    }

    pub async fn find_range(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, ServiceError> {
        if start > end {
            return Err(ServiceError::Validation(
                "start_date cannot be after end_date".into(),
            ));
        }
        Ok(self.store.find_range(employee_id, start, end).await?)
    }

    /* =========================
    Activity status
    ========================= */

    pub async fn refresh_statuses(&self, today: NaiveDate) -> Result<RefreshCounts, ServiceError> {
        let mut tx = self.store.begin().await?;
        let statuses = tx.employee_statuses().await?;
        let leaves = tx.approved_leaves().await?;
        let ongoing = tx.ongoing_activities().await?;

        let refresh = status::refresh(&statuses, &leaves, &ongoing, today);
        for (employee_id, new_status) in &refresh.changes {
            tx.set_activity_status(employee_id, new_status).await?;
        }
        tx.commit().await?;

        info!(
            changed = refresh.changes.len(),
            leave_started = refresh.counts.leave_started,
            leave_ended = refresh.counts.leave_ended,
            from_activity = refresh.counts.from_activity,
            defaulted_active = refresh.counts.defaulted_active,
            "Activity statuses refreshed"
        );
        Ok(refresh.counts)
    }

    pub async fn mark_active(&self, employee_id: &str) -> Result<(), ServiceError> {
        let mut tx = self.store.begin().await?;
        if !tx.set_activity_status(employee_id, STATUS_ACTIVE).await? {
            return Err(ServiceError::NotFound(format!(
                "employee {employee_id} has no profile"
            )));
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn today_activity_logs(
        &self,
        employee_id: Option<&str>,
        today: NaiveDate,
    ) -> Result<Vec<ActivityLog>, ServiceError> {
        Ok(self
            .store
            .activity_logs_since(employee_id, start_of(today))
            .await?)
    }

    /* =========================
    Dashboard
    ========================= */

    /// Polls for today's time-in until `timeout` elapses.
    pub async fn wait_for_time_in(
        &self,
        employee_id: &str,
        today: NaiveDate,
        timeout: StdDuration,
        poll_every: StdDuration,
    ) -> Result<DateTime<Utc>, ServiceError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let time_in = self
                .store
                .find_day(employee_id, today)
                .await?
                .and_then(|r| r.time_in);
            if let Some(time_in) = time_in {
                return Ok(time_in);
            }
            if tokio::time::Instant::now() + poll_every > deadline {
                return Err(ServiceError::NotYetAvailable(format!(
                    "{employee_id} has not clocked in today"
                )));
            }
            tokio::time::sleep(poll_every).await;
        }
    }

    pub async fn productivity(
        &self,
        employee_id: &str,
        time_in: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<ProductivitySnapshot, ServiceError> {
        let logs = self
            .store
            .activity_logs_since(Some(employee_id), start_of(now.date_naive()))
            .await?;
        let employee_status = self
            .store
            .employee_status(employee_id)
            .await?
            .and_then(|s| s.activity_status);
        Ok(productivity::snapshot(employee_status, time_in, &logs, now))
    }
}
