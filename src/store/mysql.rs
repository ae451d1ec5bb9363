use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{Executor, FromRow, MySql, MySqlPool, Row, Transaction};
use tracing::debug;

use crate::engine::conflict::Window;
use crate::model::activity_log::ActivityLog;
use crate::model::attendance::AttendanceRecord;
use crate::model::dtrp::{DtrpRequest, DtrpType};
use crate::model::employee::{EmployeeStatus, Schedule};
use crate::model::leave_request::LeaveRequest;
use crate::model::overtime::OvertimeRequest;
use crate::model::request::{Request, RequestKind, RequestStatus};
use crate::store::{PageRequest, RequestFilter, ScheduleSource, Store, StoreError, StoreTx};
use crate::utils::db_utils::{SqlValue, SqlWhere, bind, bind_as};

/* =========================
Row shapes
========================= */

#[derive(FromRow)]
struct DtrpRow {
    id: String,
    employee_id: String,
    dtrp_type: String,
    dtrp_date: DateTime<Utc>,
    remarks: String,
    status: String,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct LeaveRow {
    id: String,
    employee_id: String,
    leave_type: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    reason: String,
    status: String,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct OvertimeRow {
    id: String,
    employee_id: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    reason: String,
    status: String,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct AttendanceRow {
    id: String,
    employee_id: String,
    record_date: NaiveDate,
    time_in: Option<DateTime<Utc>>,
    time_out: Option<DateTime<Utc>>,
    remarks: Option<String>,
}

#[derive(FromRow)]
struct ActivityRow {
    id: String,
    employee_id: String,
    activity: String,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

fn parse_status(id: &str, status: &str) -> Result<RequestStatus, StoreError> {
    RequestStatus::from_str(status)
        .map_err(|_| StoreError::Corrupt(format!("request {id} has unknown status {status}")))
}

impl TryFrom<DtrpRow> for Request {
    type Error = StoreError;

    fn try_from(row: DtrpRow) -> Result<Self, Self::Error> {
        let status = parse_status(&row.id, &row.status)?;
        let dtrp_type = DtrpType::from_str(&row.dtrp_type).map_err(|_| {
            StoreError::Corrupt(format!("request {} has unknown type {}", row.id, row.dtrp_type))
        })?;
        Ok(Request::Dtrp(DtrpRequest {
            id: row.id,
            employee_id: row.employee_id,
            dtrp_type,
            date: row.dtrp_date,
            remarks: row.remarks,
            status,
            created_at: row.created_at,
        }))
    }
}

impl TryFrom<LeaveRow> for Request {
    type Error = StoreError;

    fn try_from(row: LeaveRow) -> Result<Self, Self::Error> {
        let status = parse_status(&row.id, &row.status)?;
        Ok(Request::Leave(LeaveRequest {
            id: row.id,
            employee_id: row.employee_id,
            leave_type: row.leave_type,
            start_date: row.start_date,
            end_date: row.end_date,
            reason: row.reason,
            status,
            created_at: row.created_at,
        }))
    }
}

impl TryFrom<OvertimeRow> for Request {
    type Error = StoreError;

    fn try_from(row: OvertimeRow) -> Result<Self, Self::Error> {
        let status = parse_status(&row.id, &row.status)?;
        Ok(Request::Overtime(OvertimeRequest {
            id: row.id,
            employee_id: row.employee_id,
            start_date: row.start_date,
            end_date: row.end_date,
            reason: row.reason,
            status,
            created_at: row.created_at,
        }))
    }
}

impl From<AttendanceRow> for AttendanceRecord {
    fn from(row: AttendanceRow) -> Self {
        AttendanceRecord {
            id: row.id,
            employee_id: row.employee_id,
            date: row.record_date,
            time_in: row.time_in,
            time_out: row.time_out,
            remarks: row.remarks,
        }
    }
}

impl From<ActivityRow> for ActivityLog {
    fn from(row: ActivityRow) -> Self {
        ActivityLog {
            id: row.id,
            employee_id: row.employee_id,
            activity: row.activity,
            start: row.started_at,
            end: row.ended_at,
        }
    }
}

/* =========================
Shared SQL
========================= */

fn table(kind: RequestKind) -> &'static str {
    match kind {
        RequestKind::Dtrp => "dtrp_requests",
        RequestKind::Leave => "leave_requests",
        RequestKind::Overtime => "overtime_requests",
    }
}

fn columns(kind: RequestKind) -> &'static str {
    match kind {
        RequestKind::Dtrp => {
            "id, employee_id, dtrp_type, dtrp_date, remarks, status, created_at"
        }
        RequestKind::Leave => {
            "id, employee_id, leave_type, start_date, end_date, reason, status, created_at"
        }
        RequestKind::Overtime => {
            "id, employee_id, start_date, end_date, reason, status, created_at"
        }
    }
}

const ATTENDANCE_COLUMNS: &str = "id, employee_id, record_date, time_in, time_out, remarks";
const ACTIVITY_COLUMNS: &str = "id, employee_id, activity, started_at, ended_at";

async fn select_requests<'e, E>(
    executor: E,
    kind: RequestKind,
    tail: &str,
    values: &[SqlValue],
) -> Result<Vec<Request>, StoreError>
where
    E: Executor<'e, Database = MySql>,
{
    let sql = format!("SELECT {} FROM {}{}", columns(kind), table(kind), tail);
    match kind {
        RequestKind::Dtrp => bind_as(sqlx::query_as::<_, DtrpRow>(&sql), values)
            .fetch_all(executor)
            .await?
            .into_iter()
            .map(Request::try_from)
            .collect(),
        RequestKind::Leave => bind_as(sqlx::query_as::<_, LeaveRow>(&sql), values)
            .fetch_all(executor)
            .await?
            .into_iter()
            .map(Request::try_from)
            .collect(),
        RequestKind::Overtime => bind_as(sqlx::query_as::<_, OvertimeRow>(&sql), values)
            .fetch_all(executor)
            .await?
            .into_iter()
            .map(Request::try_from)
            .collect(),
    }
}

fn by_id(id: &str) -> SqlWhere {
    let mut w = SqlWhere::new();
    w.push("id = ?", [SqlValue::String(id.to_string())]);
    w
}

fn window_where(kind: RequestKind, employee_id: &str, window: &Window, exclude_id: &str) -> SqlWhere {
    let mut w = SqlWhere::new();
    w.push("employee_id = ?", [SqlValue::String(employee_id.to_string())])
        .push("status <> 'REJECTED'", [])
        .push("id <> ?", [SqlValue::String(exclude_id.to_string())]);
    match (kind, window) {
        (RequestKind::Dtrp, Window::Instant(at)) => {
            w.push("dtrp_date >= ?", [SqlValue::DateTime(*at)]).push_opt(
                "dtrp_date < ?",
                Window::instant_end(*at).map(SqlValue::DateTime),
            );
        }
        (RequestKind::Leave, Window::Days { start, end }) => {
            w.push(
                "start_date <= ? AND end_date >= ?",
                [SqlValue::Date(*end), SqlValue::Date(*start)],
            );
        }
        (RequestKind::Overtime, Window::Span { start, end }) => {
            w.push(
                "start_date <= ? AND end_date >= ?",
                [SqlValue::DateTime(*end), SqlValue::DateTime(*start)],
            );
        }
        // mismatched window: nothing can collide
        _ => {
            w.push("1 = 0", []);
        }
    }
    w
}

fn list_where(kind: RequestKind, filter: &RequestFilter) -> SqlWhere {
    let mut w = SqlWhere::new();
    w.push_opt(
        "employee_id = ?",
        filter.employee_id.clone().map(SqlValue::String),
    )
    .push_opt(
        "status = ?",
        filter.status.map(|s| SqlValue::String(s.to_string())),
    );
    match kind {
        RequestKind::Dtrp => {
            w.push_opt("dtrp_date >= ?", filter.from_instant().map(SqlValue::DateTime))
                .push_opt("dtrp_date < ?", filter.to_instant().map(SqlValue::DateTime));
        }
        RequestKind::Leave => {
            w.push_opt(
                "LOWER(leave_type) = LOWER(?)",
                filter.leave_type.clone().map(SqlValue::String),
            )
            .push_opt("start_date >= ?", filter.from.map(SqlValue::Date))
            .push_opt("end_date <= ?", filter.to.map(SqlValue::Date));
        }
        RequestKind::Overtime => {
            w.push_opt("start_date >= ?", filter.from_instant().map(SqlValue::DateTime))
                .push_opt("end_date < ?", filter.to_instant().map(SqlValue::DateTime));
        }
    }
    w
}

/* =========================
Store over the pool
========================= */

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for MySqlStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(MySqlTx { tx }))
    }

    async fn get_request(
        &self,
        kind: RequestKind,
        id: &str,
    ) -> Result<Option<Request>, StoreError> {
        let w = by_id(id);
        let mut rows = select_requests(&self.pool, kind, &w.sql(), w.values()).await?;
        Ok(rows.pop())
    }

    async fn list_requests(
        &self,
        kind: RequestKind,
        filter: &RequestFilter,
        page: PageRequest,
    ) -> Result<(Vec<Request>, u64), StoreError> {
        let w = list_where(kind, filter);

        let count_sql = format!("SELECT COUNT(*) FROM {}{}", table(kind), w.sql());
        let total: i64 = bind(sqlx::query(&count_sql), w.values())
            .fetch_one(&self.pool)
            .await?
            .try_get(0)?;

        let mut values = w.values().to_vec();
        values.push(SqlValue::U64(u64::from(page.page_size)));
        values.push(SqlValue::U64(page.offset()));
        let tail = format!("{} ORDER BY created_at DESC LIMIT ? OFFSET ?", w.sql());
        let items = select_requests(&self.pool, kind, &tail, &values).await?;

        Ok((items, total.max(0) as u64))
    }

    async fn latest_request(
        &self,
        kind: RequestKind,
        employee_id: Option<&str>,
    ) -> Result<Option<Request>, StoreError> {
        let mut w = SqlWhere::new();
        w.push_opt(
            "employee_id = ?",
            employee_id.map(|e| SqlValue::String(e.to_string())),
        );
        let tail = format!("{} ORDER BY created_at DESC LIMIT 1", w.sql());
        let mut rows = select_requests(&self.pool, kind, &tail, w.values()).await?;
        Ok(rows.pop())
    }

    async fn pending_requests(
        &self,
        kind: RequestKind,
        employee_id: Option<&str>,
    ) -> Result<Vec<Request>, StoreError> {
        let mut w = SqlWhere::new();
        w.push("status = 'PENDING'", []).push_opt(
            "employee_id = ?",
            employee_id.map(|e| SqlValue::String(e.to_string())),
        );
        let tail = format!("{} ORDER BY created_at DESC", w.sql());
        select_requests(&self.pool, kind, &tail, w.values()).await
    }

    async fn find_day(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let sql = format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance_records WHERE employee_id = ? AND record_date = ?"
        );
        let row = sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(employee_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(AttendanceRecord::from))
    }

    async fn find_range(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let sql = format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance_records \
             WHERE employee_id = ? AND record_date >= ? AND record_date <= ? \
             ORDER BY record_date ASC"
        );
        let rows = sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(employee_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(AttendanceRecord::from).collect())
    }

    async fn activity_logs_since(
        &self,
        employee_id: Option<&str>,
        since: DateTime<Utc>,
    ) -> Result<Vec<ActivityLog>, StoreError> {
        let mut w = SqlWhere::new();
        w.push("started_at >= ?", [SqlValue::DateTime(since)]).push_opt(
            "employee_id = ?",
            employee_id.map(|e| SqlValue::String(e.to_string())),
        );
        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM human_activity_logs{} ORDER BY started_at ASC",
            w.sql()
        );
        let rows = bind_as(sqlx::query_as::<_, ActivityRow>(&sql), w.values())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(ActivityLog::from).collect())
    }

    async fn employee_status(
        &self,
        employee_id: &str,
    ) -> Result<Option<EmployeeStatus>, StoreError> {
        let row = sqlx::query(
            "SELECT employee_id, activity_status FROM employee_details WHERE employee_id = ?",
        )
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| {
            Ok(EmployeeStatus {
                employee_id: r.try_get("employee_id")?,
                activity_status: r.try_get("activity_status")?,
            })
        })
        .transpose()
    }
}

#[async_trait]
impl ScheduleSource for MySqlStore {
    async fn schedule(&self, employee_id: &str) -> Result<Option<Schedule>, StoreError> {
        let row = sqlx::query(
            "SELECT schedule_time_in, schedule_time_out FROM employee_details WHERE employee_id = ?",
        )
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let time_in: Option<NaiveTime> = row.try_get("schedule_time_in")?;
        let time_out: Option<NaiveTime> = row.try_get("schedule_time_out")?;
        Ok(time_in
            .zip(time_out)
            .map(|(time_in, time_out)| Schedule { time_in, time_out }))
    }
}

/* =========================
Unit of work
========================= */

pub struct MySqlTx {
    tx: Transaction<'static, MySql>,
}

#[async_trait]
impl StoreTx for MySqlTx {
    async fn lock_employee(&mut self, employee_id: &str) -> Result<(), StoreError> {
        sqlx::query("INSERT IGNORE INTO employee_locks (employee_id) VALUES (?)")
            .bind(employee_id)
            .execute(&mut *self.tx)
            .await?;
        sqlx::query("SELECT employee_id FROM employee_locks WHERE employee_id = ? FOR UPDATE")
            .bind(employee_id)
            .fetch_one(&mut *self.tx)
            .await?;
        debug!(employee_id, "Employee lock acquired");
        Ok(())
    }

    async fn get_request(
        &mut self,
        kind: RequestKind,
        id: &str,
    ) -> Result<Option<Request>, StoreError> {
        let w = by_id(id);
        let tail = format!("{} FOR UPDATE", w.sql());
        let mut rows = select_requests(&mut *self.tx, kind, &tail, w.values()).await?;
        Ok(rows.pop())
    }

    async fn find_in_window(
        &mut self,
        kind: RequestKind,
        employee_id: &str,
        window: &Window,
        exclude_id: &str,
    ) -> Result<Vec<Request>, StoreError> {
        let w = window_where(kind, employee_id, window, exclude_id);
        select_requests(&mut *self.tx, kind, &w.sql(), w.values()).await
    }

    async fn insert_request(&mut self, request: &Request) -> Result<(), StoreError> {
        let query = match request {
            Request::Dtrp(r) => sqlx::query(
                "INSERT INTO dtrp_requests \
                 (id, employee_id, dtrp_type, dtrp_date, remarks, status, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&r.id)
            .bind(&r.employee_id)
            .bind(r.dtrp_type.as_ref())
            .bind(r.date)
            .bind(&r.remarks)
            .bind(r.status.as_ref())
            .bind(r.created_at),
            Request::Leave(r) => sqlx::query(
                "INSERT INTO leave_requests \
                 (id, employee_id, leave_type, start_date, end_date, reason, status, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&r.id)
            .bind(&r.employee_id)
            .bind(&r.leave_type)
            .bind(r.start_date)
            .bind(r.end_date)
            .bind(&r.reason)
            .bind(r.status.as_ref())
            .bind(r.created_at),
            Request::Overtime(r) => sqlx::query(
                "INSERT INTO overtime_requests \
                 (id, employee_id, start_date, end_date, reason, status, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&r.id)
            .bind(&r.employee_id)
            .bind(r.start_date)
            .bind(r.end_date)
            .bind(&r.reason)
            .bind(r.status.as_ref())
            .bind(r.created_at),
        };
        query.execute(&mut *self.tx).await?;
        Ok(())
    }

    async fn update_request(&mut self, request: &Request) -> Result<(), StoreError> {
        let query = match request {
            Request::Dtrp(r) => sqlx::query(
                "UPDATE dtrp_requests SET dtrp_type = ?, dtrp_date = ?, remarks = ?, status = ? \
                 WHERE id = ?",
            )
            .bind(r.dtrp_type.as_ref())
            .bind(r.date)
            .bind(&r.remarks)
            .bind(r.status.as_ref())
            .bind(&r.id),
            Request::Leave(r) => sqlx::query(
                "UPDATE leave_requests SET leave_type = ?, start_date = ?, end_date = ?, \
                 reason = ?, status = ? WHERE id = ?",
            )
            .bind(&r.leave_type)
            .bind(r.start_date)
            .bind(r.end_date)
            .bind(&r.reason)
            .bind(r.status.as_ref())
            .bind(&r.id),
            Request::Overtime(r) => sqlx::query(
                "UPDATE overtime_requests SET start_date = ?, end_date = ?, reason = ?, \
                 status = ? WHERE id = ?",
            )
            .bind(r.start_date)
            .bind(r.end_date)
            .bind(&r.reason)
            .bind(r.status.as_ref())
            .bind(&r.id),
        };
        query.execute(&mut *self.tx).await?;
        Ok(())
    }

    async fn delete_request(&mut self, kind: RequestKind, id: &str) -> Result<bool, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = ?", table(kind));
        let result = sqlx::query(&sql).bind(id).execute(&mut *self.tx).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_day(
        &mut self,
        employee_id: &str,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let sql = format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance_records \
             WHERE employee_id = ? AND record_date = ? FOR UPDATE"
        );
        let row = sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(employee_id)
            .bind(date)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.map(AttendanceRecord::from))
    }

    async fn insert_attendance(&mut self, record: &AttendanceRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO attendance_records \
             (id, employee_id, record_date, time_in, time_out, remarks) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.employee_id)
        .bind(record.date)
        .bind(record.time_in)
        .bind(record.time_out)
        .bind(&record.remarks)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn update_attendance(&mut self, record: &AttendanceRecord) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE attendance_records SET time_in = ?, time_out = ?, remarks = ? WHERE id = ?",
        )
        .bind(record.time_in)
        .bind(record.time_out)
        .bind(&record.remarks)
        .bind(&record.id)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn approved_leaves(&mut self) -> Result<Vec<LeaveRequest>, StoreError> {
        let mut w = SqlWhere::new();
        w.push("status = 'APPROVED'", []);
        let rows = select_requests(&mut *self.tx, RequestKind::Leave, &w.sql(), w.values()).await?;
        Ok(rows
            .into_iter()
            .filter_map(|r| match r {
                Request::Leave(l) => Some(l),
                _ => None,
            })
            .collect())
    }

    async fn ongoing_activities(&mut self) -> Result<Vec<ActivityLog>, StoreError> {
        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM human_activity_logs WHERE ended_at IS NULL"
        );
        let rows = sqlx::query_as::<_, ActivityRow>(&sql)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows.into_iter().map(ActivityLog::from).collect())
    }

    async fn employee_statuses(&mut self) -> Result<Vec<EmployeeStatus>, StoreError> {
        let rows = sqlx::query(
            "SELECT employee_id, activity_status FROM employee_details \
             ORDER BY employee_id FOR UPDATE",
        )
        .fetch_all(&mut *self.tx)
        .await?;
        rows.into_iter()
            .map(|r| {
                Ok(EmployeeStatus {
                    employee_id: r.try_get("employee_id")?,
                    activity_status: r.try_get("activity_status")?,
                })
            })
            .collect()
    }

    async fn set_activity_status(
        &mut self,
        employee_id: &str,
        status: &str,
    ) -> Result<bool, StoreError> {
        // affected-row counts skip unchanged rows, so check existence first
        let exists = sqlx::query("SELECT 1 FROM employee_details WHERE employee_id = ?")
            .bind(employee_id)
            .fetch_optional(&mut *self.tx)
            .await?
            .is_some();
        if !exists {
            return Ok(false);
        }
        sqlx::query("UPDATE employee_details SET activity_status = ? WHERE employee_id = ?")
            .bind(status)
            .bind(employee_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(true)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn dtrp_window_is_half_open() {
        let at = Utc.with_ymd_and_hms(2025, 4, 1, 8, 0, 0).unwrap();
        let w = window_where(RequestKind::Dtrp, "EMP1", &Window::Instant(at), "d-1");
        assert_eq!(
            w.sql(),
            " WHERE employee_id = ? AND status <> 'REJECTED' AND id <> ? \
             AND dtrp_date >= ? AND dtrp_date < ?"
        );
        assert_eq!(w.values()[3], SqlValue::DateTime(at + Window::instant_width()));
    }

    #[test]
    fn dtrp_window_at_the_last_instant_drops_the_upper_bound() {
        let at = DateTime::<Utc>::MAX_UTC;
        let w = window_where(RequestKind::Dtrp, "EMP1", &Window::Instant(at), "d-1");
        assert!(w.sql().ends_with("AND dtrp_date >= ?"), "{}", w.sql());
        assert_eq!(w.values().len(), 3);
    }

    #[test]
    fn list_window_ending_on_the_last_date_is_open_ended() {
        let filter = RequestFilter {
            to: Some(NaiveDate::MAX),
            ..Default::default()
        };
        let w = list_where(RequestKind::Dtrp, &filter);
        assert_eq!(w.sql(), "");
    }

    #[test]
    fn leave_window_binds_end_before_start() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let w = window_where(RequestKind::Leave, "EMP1", &Window::Days { start, end }, "l-1");
        assert_eq!(&w.values()[2..], &[SqlValue::Date(end), SqlValue::Date(start)]);
    }

    #[test]
    fn list_filters_only_add_present_fields() {
        let filter = RequestFilter {
            status: Some(RequestStatus::Pending),
            ..Default::default()
        };
        let w = list_where(RequestKind::Overtime, &filter);
        assert_eq!(w.sql(), " WHERE status = ?");
        assert_eq!(w.values(), &[SqlValue::String("PENDING".into())]);
    }

    #[test]
    fn corrupt_status_is_reported() {
        let row = LeaveRow {
            id: "l-1".into(),
            employee_id: "EMP1".into(),
            leave_type: "sick".into(),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            reason: "Flu".into(),
            status: "MAYBE".into(),
            created_at: Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
        };
        assert!(matches!(Request::try_from(row), Err(StoreError::Corrupt(_))));
    }
}
