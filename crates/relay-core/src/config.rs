//! Pipeline configuration surface.

use serde::Deserialize;

/// Knobs for the pipeline.
///
/// The defaults are the reference values: three deliveries before
/// dead-lettering, a 24-hour status horizon, and strict one-at-a-time
/// dispatch so duplicate reasoning stays tractable.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RelayConfig {
    /// Queue identity, used for wiring and log context.
    pub queue_name: String,

    /// Deliveries allowed before a failing message is dead-lettered.
    pub max_deliveries: u32,

    /// TTL applied to every status (and result) record, in seconds.
    pub status_ttl_seconds: u64,

    /// Worker slots per process. Raising this past 1 admits concurrent
    /// reprocessing of the same redelivered task id.
    pub max_concurrency: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            queue_name: "relay-tasks".to_string(),
            max_deliveries: 3,
            status_ttl_seconds: 86_400,
            max_concurrency: 1,
        }
    }
}
