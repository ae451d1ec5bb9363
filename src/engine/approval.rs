//! Terminal decisions and their side effects on the attendance ledger.
//!
//! `plan` decides what must happen; `reconcile` performs the ledger writes
//! through the caller's unit of work so the status change and the writes
//! commit together.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::engine::lifecycle::transition;
use crate::error::ServiceError;
use crate::model::attendance::{AttendanceRecord, ON_LEAVE_REMARK};
use crate::model::dtrp::DtrpType;
use crate::model::employee::Schedule;
use crate::model::request::{Decision, Request, RequestStatus};
use crate::store::{StoreError, StoreTx};

/// Inputs the engine needs but does not own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionContext {
    pub today: NaiveDate,
    /// Required only to approve leave.
    pub schedule: Option<Schedule>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerWrite {
    /// Overwrite one side of the day's record, creating the record if absent.
    Correct {
        employee_id: String,
        day: NaiveDate,
        side: DtrpType,
        at: DateTime<Utc>,
    },
    /// Create a scheduled day marked as leave, unless the day already has a record.
    LeaveDay {
        employee_id: String,
        day: NaiveDate,
        time_in: DateTime<Utc>,
        time_out: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalPlan {
    pub status: RequestStatus,
    pub writes: Vec<LedgerWrite>,
    /// Set the live status to "On Leave" as part of the same unit of work.
    pub mark_on_leave: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ReconciliationReport {
    #[schema(value_type = Vec<String>)]
    pub written_days: Vec<NaiveDate>,
    /// Leave days that already had a record and were left untouched.
    #[schema(value_type = Vec<String>)]
    pub skipped_days: Vec<NaiveDate>,
}

pub fn plan(
    request: &Request,
    decision: Decision,
    ctx: &DecisionContext,
) -> Result<ApprovalPlan, ServiceError> {
    let status = transition(request.kind(), request.status(), decision)?;

    if decision == Decision::Reject {
        return Ok(ApprovalPlan {
            status,
            writes: Vec::new(),
            mark_on_leave: false,
        });
    }

    match request {
        Request::Dtrp(r) => Ok(ApprovalPlan {
            status,
            writes: vec![LedgerWrite::Correct {
                employee_id: r.employee_id.clone(),
                day: r.date.date_naive(),
                side: r.dtrp_type,
                at: r.date,
            }],
            mark_on_leave: false,
        }),
        Request::Leave(r) => {
            let schedule = ctx.schedule.ok_or_else(|| {
                ServiceError::Reconciliation(format!(
                    "employee {} has no configured schedule",
                    r.employee_id
                ))
            })?;
            let writes = r
                .days()
                .map(|day| {
                    let (time_in, time_out) = schedule.on(day);
                    LedgerWrite::LeaveDay {
                        employee_id: r.employee_id.clone(),
                        day,
                        time_in,
                        time_out,
                    }
                })
                .collect();
            Ok(ApprovalPlan {
                status,
                writes,
                mark_on_leave: r.start_date == ctx.today,
            })
        }
        // overtime hours are derived from the request itself
        Request::Overtime(_) => Ok(ApprovalPlan {
            status,
            writes: Vec::new(),
            mark_on_leave: false,
        }),
    }
}

fn reconciliation_failed(e: StoreError) -> ServiceError {
    ServiceError::Reconciliation(e.to_string())
}

pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Applies the ledger writes of a plan. Any failure aborts the whole
/// decision: the caller drops the unit of work without committing.
pub async fn reconcile(
    tx: &mut dyn StoreTx,
    writes: &[LedgerWrite],
) -> Result<ReconciliationReport, ServiceError> {
    let mut report = ReconciliationReport::default();

    for write in writes {
        match write {
            LedgerWrite::Correct {
                employee_id,
                day,
                side,
                at,
            } => {
                let existing = tx
                    .find_day(employee_id, *day)
                    .await
                    .map_err(reconciliation_failed)?;
                match existing {
                    Some(mut record) => {
                        match side {
                            DtrpType::TimeIn => record.time_in = Some(*at),
                            DtrpType::TimeOut => record.time_out = Some(*at),
                        }
                        tx.update_attendance(&record)
                            .await
                            .map_err(reconciliation_failed)?;
                        debug!(employee_id = %employee_id, %day, %side, "Corrected existing attendance record");
                    }
                    None => {
                        let record = AttendanceRecord {
                            id: new_record_id(),
                            employee_id: employee_id.clone(),
                            date: *day,
                            time_in: (*side == DtrpType::TimeIn).then_some(*at),
                            time_out: (*side == DtrpType::TimeOut).then_some(*at),
                            remarks: None,
                        };
                        tx.insert_attendance(&record)
                            .await
                            .map_err(reconciliation_failed)?;
                        debug!(employee_id = %employee_id, %day, %side, "Created attendance record from correction");
                    }
                }
                report.written_days.push(*day);
            }
            LedgerWrite::LeaveDay {
                employee_id,
                day,
                time_in,
                time_out,
            } => {
                let existing = tx
                    .find_day(employee_id, *day)
                    .await
                    .map_err(reconciliation_failed)?;
                if existing.is_some() {
                    info!(employee_id = %employee_id, %day, "Day already recorded, leave day skipped");
                    report.skipped_days.push(*day);
                    continue;
                }
                let record = AttendanceRecord {
                    id: new_record_id(),
                    employee_id: employee_id.clone(),
                    date: *day,
                    time_in: Some(*time_in),
                    time_out: Some(*time_out),
                    remarks: Some(ON_LEAVE_REMARK.to_string()),
                };
                tx.insert_attendance(&record)
                    .await
                    .map_err(reconciliation_failed)?;
                report.written_days.push(*day);
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::dtrp::DtrpRequest;
    use crate::model::leave_request::LeaveRequest;
    use crate::model::overtime::OvertimeRequest;
    use chrono::{NaiveTime, TimeZone};
    use rstest::{fixture, rstest};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[fixture]
    fn schedule() -> Schedule {
        Schedule {
            time_in: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            time_out: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        }
    }

    fn ctx(today: NaiveDate, schedule: Option<Schedule>) -> DecisionContext {
        DecisionContext { today, schedule }
    }

    fn leave(start: NaiveDate, end: NaiveDate) -> Request {
        Request::Leave(LeaveRequest {
            id: "l-1".into(),
            employee_id: "EMP1".into(),
            leave_type: "annual".into(),
            start_date: start,
            end_date: end,
            reason: "Trip".into(),
            status: RequestStatus::Pending,
            created_at: Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
        })
    }

    fn dtrp(side: DtrpType) -> Request {
        Request::Dtrp(DtrpRequest {
            id: "d-1".into(),
            employee_id: "EMP1".into(),
            dtrp_type: side,
            date: Utc.with_ymd_and_hms(2025, 4, 1, 8, 0, 0).unwrap(),
            remarks: "Forgot".into(),
            status: RequestStatus::Pending,
            created_at: Utc.with_ymd_and_hms(2025, 4, 1, 9, 0, 0).unwrap(),
        })
    }

    #[rstest]
    fn approving_leave_plans_one_write_per_day(schedule: Schedule) {
        let plan = plan(
            &leave(day(2025, 3, 1), day(2025, 3, 3)),
            Decision::Approve,
            &ctx(day(2025, 2, 20), Some(schedule)),
        )
        .unwrap();

        assert_eq!(plan.status, RequestStatus::Approved);
        assert!(!plan.mark_on_leave);
        let days: Vec<NaiveDate> = plan
            .writes
            .iter()
            .map(|w| match w {
                LedgerWrite::LeaveDay { day, time_in, time_out, .. } => {
                    assert_eq!(time_in.time(), schedule.time_in);
                    assert_eq!(time_out.time(), schedule.time_out);
                    assert_eq!(time_in.date_naive(), *day);
                    *day
                }
                other => panic!("unexpected write {other:?}"),
            })
            .collect();
        assert_eq!(days, vec![day(2025, 3, 1), day(2025, 3, 2), day(2025, 3, 3)]);
    }

    #[rstest]
    fn leave_starting_today_marks_the_employee_on_leave(schedule: Schedule) {
        let plan = plan(
            &leave(day(2025, 3, 1), day(2025, 3, 1)),
            Decision::Approve,
            &ctx(day(2025, 3, 1), Some(schedule)),
        )
        .unwrap();
        assert!(plan.mark_on_leave);
    }

    #[rstest]
    fn leave_without_schedule_cannot_be_approved() {
        let err = plan(
            &leave(day(2025, 3, 1), day(2025, 3, 3)),
            Decision::Approve,
            &ctx(day(2025, 2, 20), None),
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::Reconciliation(_)));
    }

    #[rstest]
    fn leave_without_schedule_can_still_be_rejected() {
        let plan = plan(
            &leave(day(2025, 3, 1), day(2025, 3, 3)),
            Decision::Reject,
            &ctx(day(2025, 3, 1), None),
        )
        .unwrap();
        assert_eq!(plan.status, RequestStatus::Rejected);
        assert!(plan.writes.is_empty());
        assert!(!plan.mark_on_leave);
    }

    #[rstest]
    #[case(DtrpType::TimeIn)]
    #[case(DtrpType::TimeOut)]
    fn approving_dtrp_plans_a_correction_on_its_day(#[case] side: DtrpType) {
        let plan = plan(&dtrp(side), Decision::Approve, &ctx(day(2025, 4, 2), None)).unwrap();
        assert_eq!(plan.status, RequestStatus::Resolved);
        assert_eq!(
            plan.writes,
            vec![LedgerWrite::Correct {
                employee_id: "EMP1".into(),
                day: day(2025, 4, 1),
                side,
                at: Utc.with_ymd_and_hms(2025, 4, 1, 8, 0, 0).unwrap(),
            }]
        );
    }

    #[rstest]
    fn approving_overtime_touches_nothing() {
        let request = Request::Overtime(OvertimeRequest {
            id: "o-1".into(),
            employee_id: "EMP1".into(),
            start_date: Utc.with_ymd_and_hms(2025, 4, 1, 17, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2025, 4, 1, 19, 0, 0).unwrap(),
            reason: "Release".into(),
            status: RequestStatus::Pending,
            created_at: Utc.with_ymd_and_hms(2025, 4, 2, 0, 0, 0).unwrap(),
        });
        let plan = plan(&request, Decision::Approve, &ctx(day(2025, 4, 2), None)).unwrap();
        assert_eq!(plan.status, RequestStatus::Approved);
        assert!(plan.writes.is_empty());
    }

    #[rstest]
    fn decided_requests_are_refused() {
        let mut request = dtrp(DtrpType::TimeIn);
        request.set_status(RequestStatus::Resolved);
        assert!(matches!(
            plan(&request, Decision::Reject, &ctx(day(2025, 4, 2), None)),
            Err(ServiceError::InvalidState(_))
        ));
    }
}
