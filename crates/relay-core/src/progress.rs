//! Progress reporter: bridges producer progress callbacks to status writes.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::warn;

use crate::domain::{StatusRecord, TaskId};
use crate::ports::{Clock, ProgressSink, StatusStore};

/// Sink handed to the producer for one processing pass.
///
/// Each report overwrites the record's progress/step and bumps the updated
/// timestamp while the status stays Processing. The reporter carries the
/// original created timestamp and TTL, so no read-back is needed per report.
/// Write failures are absorbed: losing one progress update must not fail the
/// computation.
pub struct ProgressReporter {
    status_store: Arc<dyn StatusStore>,
    clock: Arc<dyn Clock>,
    task_id: TaskId,
    created_at: DateTime<Utc>,
    ttl_seconds: u64,
}

impl ProgressReporter {
    pub fn new(
        status_store: Arc<dyn StatusStore>,
        clock: Arc<dyn Clock>,
        task_id: TaskId,
        created_at: DateTime<Utc>,
        ttl_seconds: u64,
    ) -> Self {
        Self {
            status_store,
            clock,
            task_id,
            created_at,
            ttl_seconds,
        }
    }

    fn record(&self, percentage: u8, step: &str) -> StatusRecord {
        let mut record = StatusRecord::queued(self.task_id, self.created_at, self.ttl_seconds);
        record.begin_processing(self.clock.now());
        record.report_progress(percentage, step, self.clock.now());
        record
    }
}

#[async_trait]
impl ProgressSink for ProgressReporter {
    async fn report(&self, percentage: u8, step: &str) {
        let record = self.record(percentage, step);
        if let Err(error) = self.status_store.upsert(record).await {
            warn!(task_id = %self.task_id, %error, "progress write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::TaskStatus;
    use crate::impls::InMemoryStatusStore;
    use crate::ports::FixedClock;

    #[tokio::test]
    async fn reports_keep_processing_and_preserve_created_at() {
        let created = Utc::now();
        let clock = Arc::new(FixedClock::new(created + Duration::seconds(10)));
        let store = Arc::new(InMemoryStatusStore::new());

        let task_id = TaskId::generate_at(created);
        store
            .upsert(StatusRecord::queued(task_id, created, 3600))
            .await
            .unwrap();

        let reporter = ProgressReporter::new(store.clone(), clock.clone(), task_id, created, 3600);
        reporter.report(40, "searching flights").await;

        let record = store.get(task_id).await.unwrap().unwrap();
        assert_eq!(record.status, TaskStatus::Processing);
        assert_eq!(record.progress_percentage, 40);
        assert_eq!(record.current_step, "searching flights");
        assert_eq!(record.created_at, created);
        assert_eq!(record.updated_at, clock.now());
        assert_eq!(record.ttl_seconds, 3600);
    }

    #[tokio::test]
    async fn successive_reports_overwrite() {
        let store = Arc::new(InMemoryStatusStore::new());
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let task_id = TaskId::generate_at(clock.now());

        let reporter = ProgressReporter::new(store.clone(), clock.clone(), task_id, clock.now(), 60);
        reporter.report(20, "looking up hotels").await;
        reporter.report(70, "pricing the plan").await;

        let record = store.get(task_id).await.unwrap().unwrap();
        assert_eq!(record.progress_percentage, 70);
        assert_eq!(record.current_step, "pricing the plan");
    }
}
