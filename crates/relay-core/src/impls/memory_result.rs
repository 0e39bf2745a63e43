//! In-memory result store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{ResultRecord, TaskId, result_key};
use crate::error::RelayError;
use crate::ports::ResultStore;

/// Keyed map of result records. Results are immutable: the first write for a
/// key sticks, so a racing duplicate processing pass cannot clobber the
/// output a client may already have read.
#[derive(Default)]
pub struct InMemoryResultStore {
    records: Mutex<HashMap<String, ResultRecord>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultStore for InMemoryResultStore {
    async fn put(&self, record: ResultRecord) -> Result<(), RelayError> {
        let mut records = self.records.lock().unwrap();
        records.entry(record.id.clone()).or_insert(record);
        Ok(())
    }

    async fn get(&self, task_id: TaskId) -> Result<Option<ResultRecord>, RelayError> {
        let records = self.records.lock().unwrap();
        Ok(records.get(&result_key(task_id)).cloned())
    }
}
