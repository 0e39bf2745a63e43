//! Queue message wire contract.
//!
//! A message and its status record are logically one task but live in two
//! stores with no transactional coupling. Consumers must tolerate a message
//! without a record (treat as new) and a record without a message (already
//! handled or superseded).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TaskId;
use crate::error::RelayError;

/// Declared content type of serialized task messages.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// The unit of work carried by the queue: task id plus the original input,
/// tagged with the time it was enqueued. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskMessage {
    pub task_id: TaskId,
    pub input: serde_json::Value,
    pub enqueued_at: DateTime<Utc>,
}

impl TaskMessage {
    pub fn new(task_id: TaskId, input: serde_json::Value, enqueued_at: DateTime<Utc>) -> Self {
        Self {
            task_id,
            input,
            enqueued_at,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, RelayError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RelayError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_roundtrip() {
        let msg = TaskMessage::new(
            TaskId::generate_at(Utc::now()),
            serde_json::json!({"destination": "Paris", "budget": 1000}),
            Utc::now(),
        );

        let bytes = msg.to_bytes().unwrap();
        let back = TaskMessage::from_bytes(&bytes).unwrap();
        assert_eq!(msg, back);
    }

    #[test]
    fn wire_fields_are_camel_case() {
        let msg = TaskMessage::new(TaskId::generate_at(Utc::now()), serde_json::json!({}), Utc::now());
        let v = serde_json::to_value(&msg).unwrap();
        assert!(v.get("taskId").is_some());
        assert!(v.get("enqueuedAt").is_some());
        assert!(v.get("input").is_some());
    }

    #[test]
    fn malformed_bytes_are_rejected() {
        assert!(TaskMessage::from_bytes(b"not json at all").is_err());
        assert!(TaskMessage::from_bytes(b"{\"taskId\": 42}").is_err());
    }
}
