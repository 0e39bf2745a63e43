//! In-memory status store with lazy TTL expiry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::{StatusRecord, TaskId};
use crate::error::RelayError;
use crate::ports::{Clock, StatusStore, SystemClock};

/// Keyed map of status records. Expiry is enforced on read: a record past
/// its horizon is removed and reported absent, the way a store-level TTL
/// behaves from the client's point of view.
pub struct InMemoryStatusStore {
    records: Mutex<HashMap<TaskId, StatusRecord>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryStatusStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            clock,
        }
    }
}

impl InMemoryStatusStore {
    /// Number of live records (for testing).
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

impl Default for InMemoryStatusStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatusStore for InMemoryStatusStore {
    async fn upsert(&self, record: StatusRecord) -> Result<(), RelayError> {
        let mut records = self.records.lock().unwrap();
        records.insert(record.id, record);
        Ok(())
    }

    async fn get(&self, id: TaskId) -> Result<Option<StatusRecord>, RelayError> {
        let now = self.clock.now();
        let mut records = self.records.lock().unwrap();

        let expired = records
            .get(&id)
            .map(|record| record.expires_at() <= now)
            .unwrap_or(false);
        if expired {
            records.remove(&id);
            return Ok(None);
        }

        Ok(records.get(&id).cloned())
    }
}
