//! Completed-output record.
//!
//! Keyed by "<taskId>_result" so status and result records never collide in
//! the same key space. Created once on success, never mutated, expires on the
//! same horizon as its status record.

use serde::{Deserialize, Serialize};

use super::TaskId;

/// Derive the result-record key for a task.
pub fn result_key(task_id: TaskId) -> String {
    format!("{task_id}_result")
}

/// Persisted computation output, linked to its task by key derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub id: String,
    pub payload: serde_json::Value,
}

impl ResultRecord {
    pub fn new(task_id: TaskId, payload: serde_json::Value) -> Self {
        Self {
            id: result_key(task_id),
            payload,
        }
    }
}
