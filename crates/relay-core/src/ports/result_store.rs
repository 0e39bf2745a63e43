//! Result store port.

use async_trait::async_trait;

use crate::domain::{ResultRecord, TaskId};
use crate::error::RelayError;

/// Keyed store for completed outputs, addressed by the derived result key.
///
/// Result records are created once and never mutated; implementations should
/// provision the same TTL policy as the status store.
#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn put(&self, record: ResultRecord) -> Result<(), RelayError>;

    async fn get(&self, task_id: TaskId) -> Result<Option<ResultRecord>, RelayError>;
}
