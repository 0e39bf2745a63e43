//! Work queue port.

use async_trait::async_trait;

use crate::error::RelayError;
use crate::observability::QueueCounts;

/// One received message, held under a delivery lock.
/// The worker owns this and must explicitly dispose of it.
///
/// Design intent:
/// - The queue tracks delivery counts; the worker decides the disposition
///   (acknowledge, abandon for redelivery, or dead-letter).
/// - Dropping an undisposed delivery returns the message to the queue, the
///   same way an expiring message lock makes it visible again.
#[async_trait]
pub trait Delivery: Send {
    /// Serialized message body as enqueued.
    fn body(&self) -> &[u8];

    /// Number of times this message has been delivered, this one included.
    fn delivery_count(&self) -> u32;

    /// Remove the message; terminal success or a recognized duplicate.
    async fn acknowledge(self: Box<Self>) -> Result<(), RelayError>;

    /// Return the message to the queue for redelivery.
    async fn abandon(self: Box<Self>) -> Result<(), RelayError>;

    /// Move the message to the dead-letter path; never redelivered.
    async fn dead_letter(self: Box<Self>, reason: String) -> Result<(), RelayError>;
}

/// Durable at-least-once queue carrying serialized task messages.
#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Enqueue a new message body.
    async fn enqueue(&self, body: Vec<u8>) -> Result<(), RelayError>;

    /// Receive one message, waiting until available. `None` means the queue
    /// is closed and no further messages will arrive.
    async fn receive(&self) -> Option<Box<dyn Delivery>>;

    /// Snapshot of queue depth for observability.
    async fn counts(&self) -> Result<QueueCounts, RelayError>;
}
