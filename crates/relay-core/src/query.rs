//! Client-facing status and result reads.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::{StatusRecord, TaskId, TaskStatus};
use crate::error::RelayError;
use crate::ports::{ResultStore, StatusStore};

/// Status record plus the result payload once the task has completed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    #[serde(flatten)]
    pub record: StatusRecord,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

/// Outcome of a result fetch. "Known but not finished" is a retryable client
/// outcome, distinct from "unknown task".
#[derive(Debug, Clone, PartialEq)]
pub enum ResultFetch {
    Ready(serde_json::Value),
    NotReady,
    NotFound,
}

/// Pure reads against the two stores; stateless and freely shareable.
pub struct TaskQueries {
    status_store: Arc<dyn StatusStore>,
    result_store: Arc<dyn ResultStore>,
}

impl TaskQueries {
    pub fn new(status_store: Arc<dyn StatusStore>, result_store: Arc<dyn ResultStore>) -> Self {
        Self {
            status_store,
            result_store,
        }
    }

    /// Status for a task, with the result payload embedded once completed.
    pub async fn status(&self, id: TaskId) -> Result<Option<StatusView>, RelayError> {
        let Some(record) = self.status_store.get(id).await? else {
            return Ok(None);
        };

        let result = if record.status == TaskStatus::Completed {
            self.result_store.get(id).await?.map(|r| r.payload)
        } else {
            None
        };

        Ok(Some(StatusView { record, result }))
    }

    /// Result payload for a task, or why it is not available.
    pub async fn result(&self, id: TaskId) -> Result<ResultFetch, RelayError> {
        match self.status_store.get(id).await? {
            None => Ok(ResultFetch::NotFound),
            Some(record) if record.status == TaskStatus::Completed => {
                match self.result_store.get(id).await? {
                    Some(result) => Ok(ResultFetch::Ready(result.payload)),
                    // Completed status but the result write has not landed
                    // yet from this reader's point of view; retryable.
                    None => Ok(ResultFetch::NotReady),
                }
            }
            Some(_) => Ok(ResultFetch::NotReady),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::ResultRecord;
    use crate::impls::{InMemoryResultStore, InMemoryStatusStore};

    fn queries() -> (Arc<InMemoryStatusStore>, Arc<InMemoryResultStore>, TaskQueries) {
        let status_store = Arc::new(InMemoryStatusStore::new());
        let result_store = Arc::new(InMemoryResultStore::new());
        let queries = TaskQueries::new(status_store.clone(), result_store.clone());
        (status_store, result_store, queries)
    }

    #[tokio::test]
    async fn unknown_task_is_not_found() {
        let (_, _, queries) = queries();
        let id = TaskId::generate_at(Utc::now());

        assert!(queries.status(id).await.unwrap().is_none());
        assert_eq!(queries.result(id).await.unwrap(), ResultFetch::NotFound);
    }

    #[tokio::test]
    async fn queued_and_processing_tasks_are_not_ready() {
        let (status_store, _, queries) = queries();
        let id = TaskId::generate_at(Utc::now());

        let mut record = StatusRecord::queued(id, Utc::now(), 60);
        status_store.upsert(record.clone()).await.unwrap();
        assert_eq!(queries.result(id).await.unwrap(), ResultFetch::NotReady);

        record.begin_processing(Utc::now());
        status_store.upsert(record).await.unwrap();
        assert_eq!(queries.result(id).await.unwrap(), ResultFetch::NotReady);

        // And the status view carries no embedded result yet.
        let view = queries.status(id).await.unwrap().unwrap();
        assert!(view.result.is_none());
    }

    #[tokio::test]
    async fn completed_task_returns_the_payload() {
        let (status_store, result_store, queries) = queries();
        let id = TaskId::generate_at(Utc::now());

        let mut record = StatusRecord::queued(id, Utc::now(), 60);
        record.begin_processing(Utc::now());
        record.complete(Utc::now());
        status_store.upsert(record).await.unwrap();
        result_store
            .put(ResultRecord::new(id, serde_json::json!({"destination": "Paris"})))
            .await
            .unwrap();

        let fetched = queries.result(id).await.unwrap();
        assert_eq!(
            fetched,
            ResultFetch::Ready(serde_json::json!({"destination": "Paris"}))
        );

        let view = queries.status(id).await.unwrap().unwrap();
        assert_eq!(view.record.status, TaskStatus::Completed);
        assert_eq!(view.result.unwrap()["destination"], "Paris");
    }

    #[tokio::test]
    async fn failed_task_reports_not_ready_with_the_error_on_status() {
        let (status_store, _, queries) = queries();
        let id = TaskId::generate_at(Utc::now());

        let mut record = StatusRecord::queued(id, Utc::now(), 60);
        record.begin_processing(Utc::now());
        record.fail("upstream rate limit", Utc::now());
        status_store.upsert(record).await.unwrap();

        assert_eq!(queries.result(id).await.unwrap(), ResultFetch::NotReady);
        let view = queries.status(id).await.unwrap().unwrap();
        assert_eq!(view.record.error_message.as_deref(), Some("upstream rate limit"));
    }
}
