//! Overlap rules for the three request kinds.
//!
//! - DTRP: an exact-timestamp collision, expressed as the half-open window
//!   `[at, at + 1ms)`. Two corrections one second apart do not collide.
//! - Leave: calendar-day ranges, `existing.start <= new.end && existing.end >= new.start`.
//! - Overtime: the same inclusive test over timestamps.
//!
//! Rejected requests never collide, and a request never collides with itself.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::warn;

use crate::error::ServiceError;
use crate::model::request::{Request, RequestStatus};
use crate::store::StoreTx;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Instant(DateTime<Utc>),
    Days { start: NaiveDate, end: NaiveDate },
    Span { start: DateTime<Utc>, end: DateTime<Utc> },
}

impl Window {
    /// Width of the DTRP collision window.
    pub fn instant_width() -> Duration {
        Duration::milliseconds(1)
    }

    /// Exclusive end of the DTRP window; `None` when it would pass the last
    /// representable instant, leaving the window open-ended.
    pub fn instant_end(at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        at.checked_add_signed(Self::instant_width())
    }

    pub fn of(request: &Request) -> Window {
        match request {
            Request::Dtrp(r) => Window::Instant(r.date),
            Request::Leave(r) => Window::Days {
                start: r.start_date,
                end: r.end_date,
            },
            Request::Overtime(r) => Window::Span {
                start: r.start_date,
                end: r.end_date,
            },
        }
    }

    /// Whether `existing` blocks a request occupying this window.
    pub fn collides_with(&self, existing: &Request) -> bool {
        if existing.status() == RequestStatus::Rejected {
            return false;
        }
        match (self, existing) {
            (Window::Instant(at), Request::Dtrp(r)) => {
                r.date >= *at && Self::instant_end(*at).is_none_or(|end| r.date < end)
            }
            (Window::Days { start, end }, Request::Leave(r)) => {
                r.start_date <= *end && r.end_date >= *start
            }
            (Window::Span { start, end }, Request::Overtime(r)) => {
                r.start_date <= *end && r.end_date >= *start
            }
            _ => false,
        }
    }
}

/// Fails with a conflict if any stored request of the same kind and employee
/// collides with `candidate`. Must run inside the unit of work that writes
/// `candidate`, after the employee lock is taken.
pub async fn ensure_no_conflict(
    tx: &mut dyn StoreTx,
    candidate: &Request,
) -> Result<(), ServiceError> {
    let window = Window::of(candidate);
    let existing = tx
        .find_in_window(
            candidate.kind(),
            candidate.employee_id(),
            &window,
            candidate.id(),
        )
        .await?;

    let blocking: Vec<&Request> = existing
        .iter()
        .filter(|r| r.id() != candidate.id())
        .filter(|r| window.collides_with(r))
        .collect();

    if let Some(first) = blocking.first() {
        warn!(
            kind = %candidate.kind(),
            employee_id = candidate.employee_id(),
            request_id = candidate.id(),
            blocking_id = first.id(),
            "Request collides with an existing request"
        );
        return Err(ServiceError::request_conflict());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::dtrp::{DtrpRequest, DtrpType};
    use crate::model::leave_request::LeaveRequest;
    use crate::model::overtime::OvertimeRequest;
    use chrono::TimeZone;
    use rstest::rstest;

    fn ts(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 1, h, m, s).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn dtrp(at: DateTime<Utc>, status: RequestStatus) -> Request {
        Request::Dtrp(DtrpRequest {
            id: "d-existing".into(),
            employee_id: "EMP1".into(),
            dtrp_type: DtrpType::TimeIn,
            date: at,
            remarks: "Forgot".into(),
            status,
            created_at: ts(0, 0, 0),
        })
    }

    fn leave(start: u32, end: u32, status: RequestStatus) -> Request {
        Request::Leave(LeaveRequest {
            id: "l-existing".into(),
            employee_id: "EMP1".into(),
            leave_type: "annual".into(),
            start_date: day(start),
            end_date: day(end),
            reason: "Trip".into(),
            status,
            created_at: ts(0, 0, 0),
        })
    }

    fn overtime(start_h: u32, end_h: u32, status: RequestStatus) -> Request {
        Request::Overtime(OvertimeRequest {
            id: "o-existing".into(),
            employee_id: "EMP1".into(),
            start_date: ts(start_h, 0, 0),
            end_date: ts(end_h, 0, 0),
            reason: "Release".into(),
            status,
            created_at: ts(0, 0, 0),
        })
    }

    #[rstest]
    fn dtrp_collides_only_on_the_exact_timestamp() {
        let window = Window::Instant(ts(8, 0, 0));
        assert!(window.collides_with(&dtrp(ts(8, 0, 0), RequestStatus::Pending)));
        assert!(!window.collides_with(&dtrp(ts(8, 0, 1), RequestStatus::Pending)));
        assert!(!window.collides_with(&dtrp(ts(7, 59, 59), RequestStatus::Pending)));
    }

    #[rstest]
    fn dtrp_window_is_one_millisecond_wide() {
        let at = ts(8, 0, 0);
        let window = Window::Instant(at);
        let inside = at + Duration::microseconds(999);
        let outside = at + Duration::milliseconds(1);
        assert!(window.collides_with(&dtrp(inside, RequestStatus::Pending)));
        assert!(!window.collides_with(&dtrp(outside, RequestStatus::Pending)));
    }

    #[rstest]
    fn dtrp_window_at_the_last_instant_stays_open_ended() {
        let at = DateTime::<Utc>::MAX_UTC;
        assert_eq!(Window::instant_end(at), None);
        let window = Window::Instant(at);
        assert!(window.collides_with(&dtrp(at, RequestStatus::Pending)));
        assert!(!window.collides_with(&dtrp(ts(8, 0, 0), RequestStatus::Pending)));
    }

    #[rstest]
    #[case(1, 3, 3, 5, true)]
    #[case(1, 3, 4, 5, false)]
    #[case(2, 2, 1, 3, true)]
    #[case(5, 6, 1, 4, false)]
    #[case(1, 10, 4, 5, true)]
    fn leave_uses_inclusive_day_overlap(
        #[case] existing_start: u32,
        #[case] existing_end: u32,
        #[case] new_start: u32,
        #[case] new_end: u32,
        #[case] collides: bool,
    ) {
        let window = Window::Days {
            start: day(new_start),
            end: day(new_end),
        };
        let existing = leave(existing_start, existing_end, RequestStatus::Approved);
        assert_eq!(window.collides_with(&existing), collides);
    }

    #[rstest]
    #[case(17, 19, 19, 20, true)]
    #[case(17, 19, 20, 21, false)]
    #[case(17, 19, 15, 18, true)]
    fn overtime_uses_inclusive_span_overlap(
        #[case] existing_start: u32,
        #[case] existing_end: u32,
        #[case] new_start: u32,
        #[case] new_end: u32,
        #[case] collides: bool,
    ) {
        let window = Window::Span {
            start: ts(new_start, 0, 0),
            end: ts(new_end, 0, 0),
        };
        let existing = overtime(existing_start, existing_end, RequestStatus::Pending);
        assert_eq!(window.collides_with(&existing), collides);
    }

    #[rstest]
    fn rejected_requests_never_collide() {
        assert!(!Window::Instant(ts(8, 0, 0)).collides_with(&dtrp(ts(8, 0, 0), RequestStatus::Rejected)));
        let days = Window::Days { start: day(1), end: day(3) };
        assert!(!days.collides_with(&leave(1, 3, RequestStatus::Rejected)));
    }

    #[rstest]
    fn kinds_never_cross_collide() {
        let days = Window::Days { start: day(1), end: day(31) };
        assert!(!days.collides_with(&overtime(0, 23, RequestStatus::Pending)));
    }
}
