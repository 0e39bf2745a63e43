use thiserror::Error;

/// Errors surfaced by the pipeline.
///
/// Producer failures and store failures inside the worker never reach the
/// submitting caller; they show up as a `failed` status on the next poll.
/// Only submission-time failures propagate synchronously.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("queue: {0}")]
    Queue(String),

    #[error("status store: {0}")]
    StatusStore(String),

    #[error("result store: {0}")]
    ResultStore(String),

    #[error("codec: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("producer: {0}")]
    Producer(String),
}
