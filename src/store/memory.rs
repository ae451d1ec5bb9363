//! In-process store backing the unit tests; compiled only under `cfg(test)`.
//!
//! A unit of work holds the single state lock for its whole life and edits a
//! private copy; `commit` swaps the copy in, dropping the unit discards it.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::engine::conflict::Window;
use crate::model::activity_log::ActivityLog;
use crate::model::attendance::AttendanceRecord;
use crate::model::employee::{EmployeeStatus, Schedule};
use crate::model::leave_request::LeaveRequest;
use crate::model::request::{Request, RequestKind, RequestStatus};
use crate::store::{
    PageRequest, RequestFilter, ScheduleSource, Store, StoreError, StoreTx,
};

#[derive(Debug, Clone, Default)]
struct Profile {
    activity_status: Option<String>,
    schedule: Option<Schedule>,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    requests: Vec<Request>,
    attendance: Vec<AttendanceRecord>,
    profiles: HashMap<String, Profile>,
    activity_logs: Vec<ActivityLog>,
}

impl MemoryState {
    fn request(&self, kind: RequestKind, id: &str) -> Option<&Request> {
        self.requests
            .iter()
            .find(|r| r.kind() == kind && r.id() == id)
    }

    fn day(&self, employee_id: &str, date: NaiveDate) -> Option<&AttendanceRecord> {
        self.attendance
            .iter()
            .find(|a| a.employee_id == employee_id && a.date == date)
    }

    fn newest_first(&self, kind: RequestKind) -> Vec<&Request> {
        let mut requests: Vec<&Request> =
            self.requests.iter().filter(|r| r.kind() == kind).collect();
        requests.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        requests
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    fail_attendance_writes: Arc<AtomicBool>,
    offline: Arc<AtomicBool>,
    lock_trail: Arc<Mutex<Vec<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_employee(&self, employee_id: &str, schedule: Option<Schedule>) {
        self.state.lock().await.profiles.insert(
            employee_id.to_string(),
            Profile {
                activity_status: None,
                schedule,
            },
        );
    }

    pub async fn add_activity_log(&self, log: ActivityLog) {
        self.state.lock().await.activity_logs.push(log);
    }

    pub async fn add_attendance(&self, record: AttendanceRecord) {
        self.state.lock().await.attendance.push(record);
    }

    pub async fn attendance(&self) -> Vec<AttendanceRecord> {
        let mut records = self.state.lock().await.attendance.clone();
        records.sort_by(|a, b| (&a.employee_id, a.date).cmp(&(&b.employee_id, b.date)));
        records
    }

    /// Makes every attendance write inside a unit of work fail.
    pub fn fail_attendance_writes(&self, fail: bool) {
        self.fail_attendance_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes every call fail as if the database were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Locks taken inside units of work, in order: `employee:<id>` for the
    /// employee lock and `request:<id>` for a row read, which MySQL locks.
    pub async fn lock_trail(&self) -> Vec<String> {
        self.lock_trail.lock().await.clone()
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        self.check_online()?;
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx {
            guard,
            working,
            fail_attendance_writes: self.fail_attendance_writes.load(Ordering::SeqCst),
            lock_trail: self.lock_trail.clone(),
        }))
    }

    async fn get_request(
        &self,
        kind: RequestKind,
        id: &str,
    ) -> Result<Option<Request>, StoreError> {
        self.check_online()?;
        Ok(self.state.lock().await.request(kind, id).cloned())
    }

    async fn list_requests(
        &self,
        kind: RequestKind,
        filter: &RequestFilter,
        page: PageRequest,
    ) -> Result<(Vec<Request>, u64), StoreError> {
        self.check_online()?;
        let state = self.state.lock().await;
        let matching: Vec<&Request> = state
            .newest_first(kind)
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .cloned()
            .collect();
        Ok((items, total))
    }

    async fn latest_request(
        &self,
        kind: RequestKind,
        employee_id: Option<&str>,
    ) -> Result<Option<Request>, StoreError> {
        self.check_online()?;
        let state = self.state.lock().await;
        Ok(state
            .newest_first(kind)
            .into_iter()
            .find(|r| employee_id.is_none_or(|e| r.employee_id() == e))
            .cloned())
    }

    async fn pending_requests(
        &self,
        kind: RequestKind,
        employee_id: Option<&str>,
    ) -> Result<Vec<Request>, StoreError> {
        self.check_online()?;
        let state = self.state.lock().await;
        Ok(state
            .newest_first(kind)
            .into_iter()
            .filter(|r| r.status() == RequestStatus::Pending)
            .filter(|r| employee_id.is_none_or(|e| r.employee_id() == e))
            .cloned()
            .collect())
    }

    async fn find_day(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        self.check_online()?;
        Ok(self.state.lock().await.day(employee_id, date).cloned())
    }

    async fn find_range(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        self.check_online()?;
        let state = self.state.lock().await;
        let mut records: Vec<AttendanceRecord> = state
            .attendance
            .iter()
            .filter(|a| a.employee_id == employee_id && a.date >= start && a.date <= end)
            .cloned()
            .collect();
        records.sort_by_key(|a| a.date);
        Ok(records)
    }

    async fn activity_logs_since(
        &self,
        employee_id: Option<&str>,
        since: DateTime<Utc>,
    ) -> Result<Vec<ActivityLog>, StoreError> {
        self.check_online()?;
        let state = self.state.lock().await;
        let mut logs: Vec<ActivityLog> = state
            .activity_logs
            .iter()
            .filter(|l| l.start >= since)
            .filter(|l| employee_id.is_none_or(|e| l.employee_id == e))
            .cloned()
            .collect();
        logs.sort_by_key(|l| l.start);
        Ok(logs)
    }

    async fn employee_status(
        &self,
        employee_id: &str,
    ) -> Result<Option<EmployeeStatus>, StoreError> {
        self.check_online()?;
        let state = self.state.lock().await;
        Ok(state.profiles.get(employee_id).map(|p| EmployeeStatus {
            employee_id: employee_id.to_string(),
            activity_status: p.activity_status.clone(),
        }))
    }
}

#[async_trait]
impl ScheduleSource for MemoryStore {
    async fn schedule(&self, employee_id: &str) -> Result<Option<Schedule>, StoreError> {
        self.check_online()?;
        let state = self.state.lock().await;
        Ok(state.profiles.get(employee_id).and_then(|p| p.schedule))
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
    fail_attendance_writes: bool,
    lock_trail: Arc<Mutex<Vec<String>>>,
}

impl MemoryTx {
    fn check_attendance_write(&self) -> Result<(), StoreError> {
        if self.fail_attendance_writes {
            return Err(StoreError::Unavailable("attendance writes disabled".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn lock_employee(&mut self, employee_id: &str) -> Result<(), StoreError> {
        // the unit of work already holds the whole store
        self.lock_trail
            .lock()
            .await
            .push(format!("employee:{employee_id}"));
        Ok(())
    }

    async fn get_request(
        &mut self,
        kind: RequestKind,
        id: &str,
    ) -> Result<Option<Request>, StoreError> {
        self.lock_trail.lock().await.push(format!("request:{id}"));
        Ok(self.working.request(kind, id).cloned())
    }

    async fn find_in_window(
        &mut self,
        kind: RequestKind,
        employee_id: &str,
        window: &Window,
        exclude_id: &str,
    ) -> Result<Vec<Request>, StoreError> {
        Ok(self
            .working
            .requests
            .iter()
            .filter(|r| r.kind() == kind && r.employee_id() == employee_id)
            .filter(|r| r.id() != exclude_id)
            .filter(|r| window.collides_with(r))
            .cloned()
            .collect())
    }

    async fn insert_request(&mut self, request: &Request) -> Result<(), StoreError> {
        if self.working.request(request.kind(), request.id()).is_some() {
            return Err(StoreError::Corrupt(format!(
                "duplicate request id {}",
                request.id()
            )));
        }
        self.working.requests.push(request.clone());
        Ok(())
    }

    async fn update_request(&mut self, request: &Request) -> Result<(), StoreError> {
        let slot = self
            .working
            .requests
            .iter_mut()
            .find(|r| r.kind() == request.kind() && r.id() == request.id())
            .ok_or_else(|| StoreError::Corrupt(format!("missing request {}", request.id())))?;
        *slot = request.clone();
        Ok(())
    }

    async fn delete_request(&mut self, kind: RequestKind, id: &str) -> Result<bool, StoreError> {
        let before = self.working.requests.len();
        self.working
            .requests
            .retain(|r| !(r.kind() == kind && r.id() == id));
        Ok(self.working.requests.len() != before)
    }

    async fn find_day(
        &mut self,
        employee_id: &str,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        Ok(self.working.day(employee_id, date).cloned())
    }

    async fn insert_attendance(&mut self, record: &AttendanceRecord) -> Result<(), StoreError> {
        self.check_attendance_write()?;
        if self.working.day(&record.employee_id, record.date).is_some() {
            return Err(StoreError::Corrupt(format!(
                "{} already has a record on {}",
                record.employee_id, record.date
            )));
        }
        self.working.attendance.push(record.clone());
        Ok(())
    }

    async fn update_attendance(&mut self, record: &AttendanceRecord) -> Result<(), StoreError> {
        self.check_attendance_write()?;
        let slot = self
            .working
            .attendance
            .iter_mut()
            .find(|a| a.id == record.id)
            .ok_or_else(|| StoreError::Corrupt(format!("missing attendance {}", record.id)))?;
        *slot = record.clone();
        Ok(())
    }

    async fn approved_leaves(&mut self) -> Result<Vec<LeaveRequest>, StoreError> {
        Ok(self
            .working
            .requests
            .iter()
            .filter_map(|r| match r {
                Request::Leave(l) if l.status == RequestStatus::Approved => Some(l.clone()),
                _ => None,
            })
            .collect())
    }

    async fn ongoing_activities(&mut self) -> Result<Vec<ActivityLog>, StoreError> {
        Ok(self
            .working
            .activity_logs
            .iter()
            .filter(|l| l.end.is_none())
            .cloned()
            .collect())
    }

    async fn employee_statuses(&mut self) -> Result<Vec<EmployeeStatus>, StoreError> {
        let mut statuses: Vec<EmployeeStatus> = self
            .working
            .profiles
            .iter()
            .map(|(id, p)| EmployeeStatus {
                employee_id: id.clone(),
                activity_status: p.activity_status.clone(),
            })
            .collect();
        statuses.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));
        Ok(statuses)
    }

    async fn set_activity_status(
        &mut self,
        employee_id: &str,
        status: &str,
    ) -> Result<bool, StoreError> {
        Ok(match self.working.profiles.get_mut(employee_id) {
            Some(profile) => {
                profile.activity_status = Some(status.to_string());
                true
            }
            None => false,
        })
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTx {
            mut guard, working, ..
        } = *self;
        *guard = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::dtrp::{DtrpRequest, DtrpType};
    use chrono::TimeZone;

    fn dtrp(id: &str, hour: u32) -> Request {
        Request::Dtrp(DtrpRequest {
            id: id.into(),
            employee_id: "EMP1".into(),
            dtrp_type: DtrpType::TimeIn,
            date: Utc.with_ymd_and_hms(2025, 4, 1, hour, 0, 0).unwrap(),
            remarks: "Forgot".into(),
            status: RequestStatus::Pending,
            created_at: Utc.with_ymd_and_hms(2025, 4, 2, hour, 0, 0).unwrap(),
        })
    }

    #[actix_web::test]
    async fn dropped_unit_of_work_leaves_no_trace() {
        let store = MemoryStore::new();
        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_request(&dtrp("d-1", 8)).await.unwrap();
        }
        assert!(store.get_request(RequestKind::Dtrp, "d-1").await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn committed_writes_become_visible() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_request(&dtrp("d-1", 8)).await.unwrap();
        tx.commit().await.unwrap();
        assert!(store.get_request(RequestKind::Dtrp, "d-1").await.unwrap().is_some());
    }

    #[actix_web::test]
    async fn lists_newest_first_with_total() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        for (id, hour) in [("d-1", 8), ("d-2", 9), ("d-3", 10)] {
            tx.insert_request(&dtrp(id, hour)).await.unwrap();
        }
        tx.commit().await.unwrap();

        let (items, total) = store
            .list_requests(
                RequestKind::Dtrp,
                &RequestFilter::default(),
                PageRequest::new(Some(1), Some(2)),
            )
            .await
            .unwrap();
        assert_eq!(total, 3);
        let ids: Vec<&str> = items.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["d-3", "d-2"]);
    }

    #[actix_web::test]
    async fn second_record_for_a_day_is_refused() {
        let store = MemoryStore::new();
        let day = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        let record = AttendanceRecord {
            id: "a-1".into(),
            employee_id: "EMP1".into(),
            date: day,
            time_in: None,
            time_out: None,
            remarks: None,
        };
        let mut tx = store.begin().await.unwrap();
        tx.insert_attendance(&record).await.unwrap();
        let again = AttendanceRecord {
            id: "a-2".into(),
            ..record
        };
        assert!(tx.insert_attendance(&again).await.is_err());
    }

    #[actix_web::test]
    async fn offline_store_reports_unavailable() {
        let store = MemoryStore::new();
        store.set_offline(true);
        assert!(matches!(
            store.get_request(RequestKind::Leave, "x").await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.begin().await.is_err());
    }
}
