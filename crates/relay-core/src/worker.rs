//! Message consumer: worker group lifecycle and the per-message algorithm.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::RelayConfig;
use crate::domain::{ResultRecord, StatusRecord, TaskMessage, TaskStatus};
use crate::error::RelayError;
use crate::ports::{Clock, Delivery, Producer, ResultStore, StatusStore, WorkQueue};
use crate::progress::ProgressReporter;

/// Everything one worker slot needs to drive a message to disposition.
pub struct WorkerContext {
    pub queue: Arc<dyn WorkQueue>,
    pub status_store: Arc<dyn StatusStore>,
    pub result_store: Arc<dyn ResultStore>,
    pub producer: Arc<dyn Producer>,
    pub clock: Arc<dyn Clock>,
    pub config: RelayConfig,
}

/// Worker group handle.
/// - `request_shutdown()` stops taking new messages and cancels the in-flight
///   computation; the current message is left unacknowledged for redelivery
/// - `shutdown_and_join()` additionally waits for every worker to exit
pub struct WorkerGroup {
    shutdown_tx: watch::Sender<bool>,
    joins: Vec<JoinHandle<()>>,
}

impl WorkerGroup {
    /// Spawn `config.max_concurrency` workers sharing one context.
    pub fn spawn(context: WorkerContext) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let context = Arc::new(context);

        let n = context.config.max_concurrency.max(1);
        let mut joins = Vec::with_capacity(n);
        for worker_id in 0..n {
            let ctx = Arc::clone(&context);
            let mut rx = shutdown_rx.clone();

            let join = tokio::spawn(async move {
                worker_loop(worker_id, ctx, &mut rx).await;
            });
            joins.push(join);
        }

        Self { shutdown_tx, joins }
    }

    /// Request shutdown for all workers.
    pub fn request_shutdown(&self) {
        // ignore send error: receivers may already be dropped
        let _ = self.shutdown_tx.send(true);
    }

    /// Shutdown and wait for all workers.
    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        for join in self.joins {
            let _ = join.await;
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    ctx: Arc<WorkerContext>,
    shutdown_rx: &mut watch::Receiver<bool>,
) {
    info!(worker_id, queue = %ctx.config.queue_name, "worker started");
    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        // receive() can wait indefinitely, so race it against shutdown.
        let delivery = tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() {
                    // Sender dropped without an explicit shutdown; same thing.
                    break;
                }
                continue;
            }
            delivery = ctx.queue.receive() => delivery,
        };

        let Some(delivery) = delivery else {
            // Queue closed; nothing more will arrive.
            break;
        };

        handle_delivery(&ctx, delivery, shutdown_rx).await;
    }
    info!(worker_id, "worker stopped");
}

enum ProcessEnd {
    Finished,
    Cancelled,
}

/// Drive one delivery to its disposition. Never propagates an error: every
/// failure either becomes a Failed status plus retry accounting or, for
/// unparseable bodies, an immediate dead-letter.
async fn handle_delivery(
    ctx: &WorkerContext,
    delivery: Box<dyn Delivery>,
    shutdown_rx: &mut watch::Receiver<bool>,
) {
    // Step 1: decode. Malformed content cannot self-heal, so it skips the
    // retry budget entirely.
    let message = match TaskMessage::from_bytes(delivery.body()) {
        Ok(message) => message,
        Err(decode_error) => {
            warn!(%decode_error, "malformed message, dead-lettering");
            if let Err(error) = delivery
                .dead_letter(format!("invalid message: {decode_error}"))
                .await
            {
                error!(%error, "dead-letter failed for malformed message");
            }
            return;
        }
    };
    let task_id = message.task_id;
    let delivery_count = delivery.delivery_count();

    // Step 2: duplicate check. A lookup failure is treated like an absent
    // record: the message itself is the evidence the task exists.
    let existing = match ctx.status_store.get(task_id).await {
        Ok(existing) => existing,
        Err(error) => {
            warn!(%task_id, %error, "status lookup failed, treating as new task");
            None
        }
    };
    if let Some(record) = &existing {
        match record.status {
            TaskStatus::Completed => {
                // Already finished; remove the duplicate without touching
                // either record.
                debug!(%task_id, "duplicate delivery of completed task, acknowledging");
                if let Err(error) = delivery.acknowledge().await {
                    warn!(%task_id, %error, "acknowledge failed for duplicate");
                }
                return;
            }
            TaskStatus::Processing => {
                // In-flight duplicate or a retry after a crashed worker.
                // Proceed: the final write is idempotent for the same task.
                debug!(%task_id, "task already processing, reprocessing anyway");
            }
            TaskStatus::Queued | TaskStatus::Failed => {}
        }
    }

    let created_at = existing.as_ref().map(|r| r.created_at).unwrap_or_else(|| ctx.clock.now());
    let ttl_seconds = existing
        .as_ref()
        .map(|r| r.ttl_seconds)
        .unwrap_or(ctx.config.status_ttl_seconds);

    // Steps 3-5.
    match process_once(ctx, &message, created_at, ttl_seconds, shutdown_rx).await {
        Ok(ProcessEnd::Finished) => {
            info!(%task_id, attempt = delivery_count, "task completed");
            if let Err(error) = delivery.acknowledge().await {
                warn!(%task_id, %error, "acknowledge failed after completion");
            }
        }
        Ok(ProcessEnd::Cancelled) => {
            // Shutting down mid-computation: leave the message undisposed so
            // it is redelivered, exactly as an expiring lock would.
            info!(%task_id, "processing cancelled by shutdown, leaving message for redelivery");
            drop(delivery);
        }
        Err(failure) => {
            // Step 6: best-effort Failed write; the message's own retry
            // accounting is the backstop, not this write.
            let mut failed = StatusRecord::queued(task_id, created_at, ttl_seconds);
            failed.fail(failure.to_string(), ctx.clock.now());
            if let Err(error) = ctx.status_store.upsert(failed).await {
                warn!(%task_id, %error, "failed-status write failed");
            }

            if delivery_count >= ctx.config.max_deliveries {
                error!(%task_id, attempt = delivery_count, %failure, "delivery cap reached, dead-lettering");
                if let Err(error) = delivery.dead_letter(failure.to_string()).await {
                    error!(%task_id, %error, "dead-letter failed");
                }
            } else {
                warn!(%task_id, attempt = delivery_count, %failure, "task failed, releasing for redelivery");
                if let Err(error) = delivery.abandon().await {
                    error!(%task_id, %error, "abandon failed");
                }
            }
        }
    }
}

/// One uninterrupted processing pass: Processing status, the computation with
/// its progress sink, the result write, and the Completed status.
async fn process_once(
    ctx: &WorkerContext,
    message: &TaskMessage,
    created_at: DateTime<Utc>,
    ttl_seconds: u64,
    shutdown_rx: &mut watch::Receiver<bool>,
) -> Result<ProcessEnd, RelayError> {
    let task_id = message.task_id;

    let mut starting = StatusRecord::queued(task_id, created_at, ttl_seconds);
    starting.begin_processing(ctx.clock.now());
    ctx.status_store.upsert(starting).await?;

    let reporter = ProgressReporter::new(
        Arc::clone(&ctx.status_store),
        Arc::clone(&ctx.clock),
        task_id,
        created_at,
        ttl_seconds,
    );

    // The computation is the only long suspend point. Dropping its future on
    // shutdown is the cancellation path.
    let payload = tokio::select! {
        _ = shutdown_rx.changed() => return Ok(ProcessEnd::Cancelled),
        produced = ctx.producer.produce(&message.input, &reporter) => produced?,
    };

    ctx.result_store.put(ResultRecord::new(task_id, payload)).await?;

    let mut completed = StatusRecord::queued(task_id, created_at, ttl_seconds);
    completed.complete(ctx.clock.now());
    ctx.status_store.upsert(completed).await?;

    Ok(ProcessEnd::Finished)
}
