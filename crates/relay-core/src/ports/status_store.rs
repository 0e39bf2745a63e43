//! Status store port.

use async_trait::async_trait;

use crate::domain::{StatusRecord, TaskId};
use crate::error::RelayError;

/// Keyed store mapping task id to status record.
///
/// Design:
/// - `upsert` is a full-record write; last writer wins. Every writer writes
///   its committed view of the moment, so no read-modify-write loop is
///   required here.
/// - TTL enforcement belongs to the store: a record past its expiry horizon
///   is simply absent from `get`.
#[async_trait]
pub trait StatusStore: Send + Sync {
    async fn upsert(&self, record: StatusRecord) -> Result<(), RelayError>;

    async fn get(&self, id: TaskId) -> Result<Option<StatusRecord>, RelayError>;
}
