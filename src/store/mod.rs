//! Persistence seam. Handlers and the approval engine only see these traits;
//! `MySqlStore` backs production and `MemoryStore` backs tests.
//!
//! A `StoreTx` is one unit of work: everything written through it becomes
//! visible on `commit` or disappears when it is dropped.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use derive_more::Display;

use crate::engine::conflict::Window;
use crate::model::activity_log::ActivityLog;
use crate::model::attendance::AttendanceRecord;
use crate::model::employee::{EmployeeStatus, Schedule};
use crate::model::leave_request::LeaveRequest;
use crate::model::request::{Request, RequestKind, RequestStatus};

#[cfg(test)]
pub mod memory;
pub mod mysql;

#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),

    #[display(fmt = "corrupt row: {}", _0)]
    Corrupt(String),

    #[display(fmt = "store unavailable: {}", _0)]
    Unavailable(String),
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e)
    }
}

/// Filters accepted by request listings. Every field narrows the result.
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub employee_id: Option<String>,
    pub status: Option<RequestStatus>,
    /// Leave only.
    pub leave_type: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl RequestFilter {
    /// Inclusive lower bound of the window as an instant.
    pub fn from_instant(&self) -> Option<DateTime<Utc>> {
        self.from.map(|d| d.and_time(NaiveTime::MIN).and_utc())
    }

    /// Exclusive upper bound: midnight after the `to` day. `None` also when
    /// `to` is the last representable day, which bounds nothing.
    pub fn to_instant(&self) -> Option<DateTime<Utc>> {
        self.to
            .and_then(|d| d.succ_opt())
            .map(|d| d.and_time(NaiveTime::MIN).and_utc())
    }

    /// Leave and overtime must lie fully inside the window; a DTRP's own
    /// timestamp must.
    pub fn matches(&self, request: &Request) -> bool {
        if let Some(employee_id) = &self.employee_id {
            if request.employee_id() != employee_id {
                return false;
            }
        }
        if let Some(status) = self.status {
            if request.status() != status {
                return false;
            }
        }
        let (from, to) = (self.from_instant(), self.to_instant());
        let inside = |start: DateTime<Utc>, end: DateTime<Utc>| {
            from.is_none_or(|f| start >= f) && to.is_none_or(|t| end < t)
        };
        match request {
            Request::Dtrp(r) => inside(r.date, r.date),
            Request::Leave(r) => {
                let type_ok = self
                    .leave_type
                    .as_deref()
                    .is_none_or(|t| r.leave_type.eq_ignore_ascii_case(t));
                type_ok
                    && self.from.is_none_or(|f| r.start_date >= f)
                    && self.to.is_none_or(|t| r.end_date <= t)
            }
            Request::Overtime(r) => inside(r.start_date, r.end_date),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub const DEFAULT_PAGE_SIZE: u32 = 10;
    pub const MAX_PAGE_SIZE: u32 = 100;

    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(Self::DEFAULT_PAGE_SIZE)
                .clamp(1, Self::MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.page_size))
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError>;

    async fn get_request(&self, kind: RequestKind, id: &str)
    -> Result<Option<Request>, StoreError>;

    /// Newest `created_at` first, plus the unpaginated total.
    async fn list_requests(
        &self,
        kind: RequestKind,
        filter: &RequestFilter,
        page: PageRequest,
    ) -> Result<(Vec<Request>, u64), StoreError>;

    async fn latest_request(
        &self,
        kind: RequestKind,
        employee_id: Option<&str>,
    ) -> Result<Option<Request>, StoreError>;

    /// Newest first.
    async fn pending_requests(
        &self,
        kind: RequestKind,
        employee_id: Option<&str>,
    ) -> Result<Vec<Request>, StoreError>;

    async fn find_day(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError>;

    /// Both ends inclusive, ordered by date.
    async fn find_range(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, StoreError>;

    async fn activity_logs_since(
        &self,
        employee_id: Option<&str>,
        since: DateTime<Utc>,
    ) -> Result<Vec<ActivityLog>, StoreError>;

    async fn employee_status(&self, employee_id: &str)
    -> Result<Option<EmployeeStatus>, StoreError>;
}

#[async_trait]
pub trait StoreTx: Send {
    /// Serializes units of work touching the same employee until commit/drop.
    async fn lock_employee(&mut self, employee_id: &str) -> Result<(), StoreError>;

    async fn get_request(
        &mut self,
        kind: RequestKind,
        id: &str,
    ) -> Result<Option<Request>, StoreError>;

    /// Non-rejected requests of `kind` for the employee that may fall inside
    /// `window`, excluding `exclude_id`. The caller applies the exact predicate.
    async fn find_in_window(
        &mut self,
        kind: RequestKind,
        employee_id: &str,
        window: &Window,
        exclude_id: &str,
    ) -> Result<Vec<Request>, StoreError>;

    async fn insert_request(&mut self, request: &Request) -> Result<(), StoreError>;

    async fn update_request(&mut self, request: &Request) -> Result<(), StoreError>;

    async fn delete_request(&mut self, kind: RequestKind, id: &str) -> Result<bool, StoreError>;

    async fn find_day(
        &mut self,
        employee_id: &str,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError>;

    async fn insert_attendance(&mut self, record: &AttendanceRecord) -> Result<(), StoreError>;

    async fn update_attendance(&mut self, record: &AttendanceRecord) -> Result<(), StoreError>;

    async fn approved_leaves(&mut self) -> Result<Vec<LeaveRequest>, StoreError>;

    async fn ongoing_activities(&mut self) -> Result<Vec<ActivityLog>, StoreError>;

    async fn employee_statuses(&mut self) -> Result<Vec<EmployeeStatus>, StoreError>;

    /// Returns false when the employee has no profile.
    async fn set_activity_status(
        &mut self,
        employee_id: &str,
        status: &str,
    ) -> Result<bool, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

/// Employee-profile lookups this service consumes but does not own.
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    async fn schedule(&self, employee_id: &str) -> Result<Option<Schedule>, StoreError>;
}
