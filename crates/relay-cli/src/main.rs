//! Demo wiring for the relay pipeline: an in-memory queue and stores, one
//! worker, and a fake itinerary producer with injectable failures so the
//! retry path is visible in the logs.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::info;
use tracing_subscriber::EnvFilter;

use relay_core::RelayConfig;
use relay_core::error::RelayError;
use relay_core::impls::{InMemoryResultStore, InMemoryStatusStore, InMemoryWorkQueue};
use relay_core::ports::{Clock, Producer, ProgressSink, SystemClock, WorkQueue};
use relay_core::query::{ResultFetch, TaskQueries};
use relay_core::submit::SubmissionService;
use relay_core::worker::{WorkerContext, WorkerGroup};

#[derive(Debug, Deserialize)]
struct TripRequest {
    destination: String,
    #[serde(default)]
    budget: u64,
}

/// Fake itinerary generator. Fails the first `remaining_failures` calls to
/// exercise redelivery, then produces a small structured plan with progress
/// reports along the way.
struct ItineraryProducer {
    remaining_failures: AtomicU32,
}

impl ItineraryProducer {
    fn new(failures: u32) -> Self {
        Self {
            remaining_failures: AtomicU32::new(failures),
        }
    }
}

#[async_trait]
impl Producer for ItineraryProducer {
    async fn produce(
        &self,
        input: &serde_json::Value,
        progress: &dyn ProgressSink,
    ) -> Result<serde_json::Value, RelayError> {
        let request: TripRequest = serde_json::from_value(input.clone())
            .map_err(|e| RelayError::Producer(format!("bad trip request: {e}")))?;

        let left = self.remaining_failures.load(Ordering::Relaxed);
        if left > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::Relaxed);
            return Err(RelayError::Producer(format!(
                "itinerary model unavailable (left={left})"
            )));
        }

        let steps = [
            (20, "researching the destination"),
            (45, "picking places to stay"),
            (70, "planning each day"),
            (90, "balancing the budget"),
        ];
        for (percentage, step) in steps {
            progress.report(percentage, step).await;
            sleep(Duration::from_millis(150)).await;
        }

        Ok(serde_json::json!({
            "destination": request.destination,
            "budget": request.budget,
            "days": 3,
            "dailyPlan": [
                {"day": 1, "theme": "old town on foot"},
                {"day": 2, "theme": "museums and markets"},
                {"day": 3, "theme": "day trip"},
            ],
        }))
    }
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = RelayConfig::default();
    let queue = Arc::new(InMemoryWorkQueue::new(config.queue_name.clone()));
    let status_store = Arc::new(InMemoryStatusStore::new());
    let result_store = Arc::new(InMemoryResultStore::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let submission = SubmissionService::new(
        queue.clone(),
        status_store.clone(),
        clock.clone(),
        config.clone(),
    );
    let queries = TaskQueries::new(status_store.clone(), result_store.clone());

    // Two injected failures: with the default cap of 3 the third delivery
    // succeeds, so the demo shows retry without dead-lettering.
    let workers = WorkerGroup::spawn(WorkerContext {
        queue: queue.clone(),
        status_store,
        result_store,
        producer: Arc::new(ItineraryProducer::new(2)),
        clock,
        config,
    });

    let handle = submission
        .submit(serde_json::json!({"destination": "Paris", "budget": 1000}))
        .await
        .expect("submission failed");
    info!(task_id = %handle.task_id, status_path = %handle.status_path, "submitted");

    loop {
        let view = queries
            .status(handle.task_id)
            .await
            .expect("status read failed")
            .expect("status record missing");
        info!(
            status = ?view.record.status,
            progress = view.record.progress_percentage,
            step = %view.record.current_step,
            "poll"
        );
        if view.record.status.is_settled() {
            break;
        }
        sleep(Duration::from_millis(200)).await;
    }

    match queries.result(handle.task_id).await.expect("result read failed") {
        ResultFetch::Ready(payload) => {
            println!("{}", serde_json::to_string_pretty(&payload).expect("print"));
        }
        other => println!("no result: {other:?}"),
    }
    info!(counts = ?queue.counts().await.expect("counts"), "queue at exit");

    workers.shutdown_and_join().await;
}
