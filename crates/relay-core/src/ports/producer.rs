//! Producer port: the long-running computation at its interface boundary.

use async_trait::async_trait;

use crate::error::RelayError;

/// Single-method capability handed into the computation so it can report
/// progress without knowing anything about storage.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Report progress. Infallible from the computation's point of view;
    /// sinks absorb their own write failures.
    async fn report(&self, percentage: u8, step: &str);
}

/// The computation performed per task (here, an itinerary generator; the
/// engine only needs this contract).
///
/// Cancellation is cooperative: the worker drops the in-flight `produce`
/// future when it is told to shut down, so implementations must not rely on
/// running to completion.
#[async_trait]
pub trait Producer: Send + Sync {
    async fn produce(
        &self,
        input: &serde_json::Value,
        progress: &dyn ProgressSink,
    ) -> Result<serde_json::Value, RelayError>;
}
