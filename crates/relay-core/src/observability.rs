//! Operational snapshots exposed by the queue for tests and diagnostics.

use serde::{Deserialize, Serialize};

/// Queue depth snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCounts {
    pub queued: usize,
    pub in_flight: usize,
    pub dead_lettered: usize,
}
