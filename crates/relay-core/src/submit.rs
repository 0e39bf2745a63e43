//! Task submission service.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::config::RelayConfig;
use crate::domain::{StatusRecord, TaskId, TaskMessage};
use crate::error::RelayError;
use crate::ports::{Clock, StatusStore, WorkQueue};

/// What the caller gets back immediately: the id and where to poll.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskHandle {
    pub task_id: TaskId,
    pub status_path: String,
    pub result_path: String,
    pub message: String,
}

/// Accepts new work: allocates an id, enqueues the message, writes the
/// initial status record, returns a handle. Never waits on the computation.
///
/// Stateless; safe to share across any number of concurrent callers.
pub struct SubmissionService {
    queue: Arc<dyn WorkQueue>,
    status_store: Arc<dyn StatusStore>,
    clock: Arc<dyn Clock>,
    config: RelayConfig,
}

impl SubmissionService {
    pub fn new(
        queue: Arc<dyn WorkQueue>,
        status_store: Arc<dyn StatusStore>,
        clock: Arc<dyn Clock>,
        config: RelayConfig,
    ) -> Self {
        Self {
            queue,
            status_store,
            clock,
            config,
        }
    }

    /// Submit one unit of work.
    ///
    /// The two writes are not atomic. Enqueue goes first: if it fails the
    /// whole submission fails with no orphan "queued" record, and a worker
    /// that sees the message before the status record simply treats the
    /// absent record as a new task.
    pub async fn submit(&self, input: serde_json::Value) -> Result<TaskHandle, RelayError> {
        let now = self.clock.now();
        let task_id = TaskId::generate_at(now);

        let message = TaskMessage::new(task_id, input, now);
        self.queue.enqueue(message.to_bytes()?).await?;

        let record = StatusRecord::queued(task_id, now, self.config.status_ttl_seconds);
        self.status_store.upsert(record).await?;

        info!(%task_id, queue = %self.config.queue_name, "task accepted");

        Ok(TaskHandle {
            task_id,
            status_path: format!("/tasks/{task_id}/status"),
            result_path: format!("/tasks/{task_id}/result"),
            message: "task accepted for processing".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::domain::TaskStatus;
    use crate::impls::{InMemoryStatusStore, InMemoryWorkQueue};
    use crate::observability::QueueCounts;
    use crate::ports::{Delivery, SystemClock};

    fn service(
        queue: Arc<dyn WorkQueue>,
        status_store: Arc<InMemoryStatusStore>,
    ) -> SubmissionService {
        SubmissionService::new(
            queue,
            status_store,
            Arc::new(SystemClock),
            RelayConfig::default(),
        )
    }

    #[tokio::test]
    async fn submit_returns_a_fresh_id_and_an_immediate_queued_status() {
        let queue = Arc::new(InMemoryWorkQueue::new("test"));
        let store = Arc::new(InMemoryStatusStore::new());
        let service = service(queue.clone(), store.clone());

        let first = service.submit(serde_json::json!({"destination": "Paris"})).await.unwrap();
        let second = service.submit(serde_json::json!({"destination": "Kyoto"})).await.unwrap();
        assert_ne!(first.task_id, second.task_id);

        let record = store.get(first.task_id).await.unwrap().unwrap();
        assert_eq!(record.status, TaskStatus::Queued);
        assert_eq!(record.progress_percentage, 0);

        assert_eq!(queue.counts().await.unwrap().queued, 2);
        assert!(first.status_path.contains(&first.task_id.to_string()));
        assert!(first.result_path.contains(&first.task_id.to_string()));
    }

    #[tokio::test]
    async fn enqueued_message_carries_the_input() {
        let queue = Arc::new(InMemoryWorkQueue::new("test"));
        let store = Arc::new(InMemoryStatusStore::new());
        let service = service(queue.clone(), store);

        let handle = service.submit(serde_json::json!({"budget": 1000})).await.unwrap();

        let delivery = queue.receive().await.unwrap();
        let message = TaskMessage::from_bytes(delivery.body()).unwrap();
        assert_eq!(message.task_id, handle.task_id);
        assert_eq!(message.input["budget"], 1000);
        delivery.acknowledge().await.unwrap();
    }

    struct BrokenQueue;

    #[async_trait]
    impl WorkQueue for BrokenQueue {
        async fn enqueue(&self, _body: Vec<u8>) -> Result<(), RelayError> {
            Err(RelayError::Queue("broker unreachable".to_string()))
        }

        async fn receive(&self) -> Option<Box<dyn Delivery>> {
            None
        }

        async fn counts(&self) -> Result<QueueCounts, RelayError> {
            Ok(QueueCounts::default())
        }
    }

    #[tokio::test]
    async fn enqueue_failure_leaves_no_orphan_status_record() {
        let store = Arc::new(InMemoryStatusStore::new());
        let service = service(Arc::new(BrokenQueue), store.clone());

        let err = service.submit(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, RelayError::Queue(_)));

        // Enqueue goes first, so the failed submission wrote nothing.
        assert_eq!(store.len(), 0);
    }
}
