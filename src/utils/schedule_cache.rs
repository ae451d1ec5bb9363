use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveTime;
use futures_util::StreamExt;
use moka::future::Cache;
use sqlx::MySqlPool;
use tracing::info;

use crate::model::employee::Schedule;
use crate::store::{ScheduleSource, StoreError};

/// Read-through cache over the employee profile schedules.
/// Only found schedules are cached, so a newly configured one shows up
/// on the next lookup.
pub struct ScheduleCache {
    source: Arc<dyn ScheduleSource>,
    cache: Cache<String, Schedule>,
}

impl ScheduleCache {
    pub fn new(source: Arc<dyn ScheduleSource>, ttl: Duration) -> Self {
        Self {
            source,
            cache: Cache::builder()
                .max_capacity(100_000)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Batch insert already-known schedules
    async fn batch_insert(&self, entries: &[(String, Schedule)]) {
        let futures: Vec<_> = entries
            .iter()
            .map(|(id, schedule)| self.cache.insert(id.clone(), *schedule))
            .collect();

        futures::future::join_all(futures).await;
    }
}

#[async_trait]
impl ScheduleSource for ScheduleCache {
    async fn schedule(&self, employee_id: &str) -> Result<Option<Schedule>, StoreError> {
        if let Some(hit) = self.cache.get(employee_id).await {
            return Ok(Some(hit));
        }
        let found = self.source.schedule(employee_id).await?;
        if let Some(schedule) = found {
            self.cache.insert(employee_id.to_string(), schedule).await;
        }
        Ok(found)
    }
}

/// Load every configured schedule into the cache (batched)
pub async fn warmup_schedule_cache(
    pool: &MySqlPool,
    cache: &ScheduleCache,
    batch_size: usize,
) -> anyhow::Result<usize> {
    let mut stream = sqlx::query_as::<_, (String, NaiveTime, NaiveTime)>(
        r#"
        SELECT employee_id, schedule_time_in, schedule_time_out
        FROM employee_details
        WHERE schedule_time_in IS NOT NULL
          AND schedule_time_out IS NOT NULL
        "#,
    )
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        let (employee_id, time_in, time_out) = row?;
        batch.push((employee_id, Schedule { time_in, time_out }));
        total_count += 1;

        if batch.len() >= batch_size {
            cache.batch_insert(&batch).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        cache.batch_insert(&batch).await;
    }

    info!(total_count, "Schedule cache warmup complete");
    Ok(total_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        schedule: Option<Schedule>,
    }

    #[async_trait]
    impl ScheduleSource for CountingSource {
        async fn schedule(&self, _employee_id: &str) -> Result<Option<Schedule>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.schedule)
        }
    }

    fn nine_to_six() -> Schedule {
        Schedule {
            time_in: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            time_out: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        }
    }

    #[actix_web::test]
    async fn hits_the_source_once_per_employee() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            schedule: Some(nine_to_six()),
        });
        let cache = ScheduleCache::new(source.clone(), Duration::from_secs(60));

        assert_eq!(cache.schedule("EMP1").await.unwrap(), Some(nine_to_six()));
        assert_eq!(cache.schedule("EMP1").await.unwrap(), Some(nine_to_six()));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[actix_web::test]
    async fn missing_schedules_are_not_cached() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            schedule: None,
        });
        let cache = ScheduleCache::new(source.clone(), Duration::from_secs(60));

        assert_eq!(cache.schedule("EMP1").await.unwrap(), None);
        assert_eq!(cache.schedule("EMP1").await.unwrap(), None);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
