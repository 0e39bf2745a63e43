//! In-memory work queue.
//!
//! Models the at-least-once contract of a real broker: per-message delivery
//! counts, explicit disposition, a dead-letter side list, and redelivery of
//! messages whose holder went away (drop of an undisposed delivery).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::error::RelayError;
use crate::observability::QueueCounts;
use crate::ports::{Delivery, WorkQueue};

#[derive(Debug, Clone)]
struct StoredMessage {
    body: Vec<u8>,
    delivery_count: u32,
}

/// A message removed from the main queue after exhausting its retry budget
/// (or carrying a body that could never be parsed).
#[derive(Debug, Clone)]
pub struct DeadLetter {
    pub body: Vec<u8>,
    pub reason: String,
    pub delivery_count: u32,
}

#[derive(Default)]
struct QueueState {
    ready: VecDeque<StoredMessage>,
    dead: Vec<DeadLetter>,
    in_flight: usize,
}

/// In-memory queue.
///
/// The mutex guards short critical sections only and is never held across an
/// await; `Notify` wakes one waiting receiver per enqueue or abandon.
pub struct InMemoryWorkQueue {
    name: String,
    state: Arc<Mutex<QueueState>>,
    notify: Arc<Notify>,
}

impl InMemoryWorkQueue {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(QueueState::default())),
            notify: Arc::new(Notify::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inspect the dead-letter path.
    pub fn dead_letters(&self) -> Vec<DeadLetter> {
        let state = self.state.lock().unwrap();
        state.dead.clone()
    }
}

#[async_trait]
impl WorkQueue for InMemoryWorkQueue {
    async fn enqueue(&self, body: Vec<u8>) -> Result<(), RelayError> {
        {
            let mut state = self.state.lock().unwrap();
            state.ready.push_back(StoredMessage {
                body,
                delivery_count: 0,
            });
        }
        self.notify.notify_one();
        Ok(())
    }

    async fn receive(&self) -> Option<Box<dyn Delivery>> {
        loop {
            {
                let mut state = self.state.lock().unwrap();
                if let Some(mut message) = state.ready.pop_front() {
                    message.delivery_count += 1;
                    state.in_flight += 1;
                    return Some(Box::new(InMemoryDelivery {
                        message: Some(message),
                        state: Arc::clone(&self.state),
                        notify: Arc::clone(&self.notify),
                    }));
                }
            }
            // notify_one stores a permit, so an enqueue racing this gap is
            // not lost.
            self.notify.notified().await;
        }
    }

    async fn counts(&self) -> Result<QueueCounts, RelayError> {
        let state = self.state.lock().unwrap();
        Ok(QueueCounts {
            queued: state.ready.len(),
            in_flight: state.in_flight,
            dead_lettered: state.dead.len(),
        })
    }
}

struct InMemoryDelivery {
    /// Taken by whichever disposition runs; `Some` at drop means the holder
    /// never disposed and the message goes back to the queue.
    message: Option<StoredMessage>,
    state: Arc<Mutex<QueueState>>,
    notify: Arc<Notify>,
}

#[async_trait]
impl Delivery for InMemoryDelivery {
    fn body(&self) -> &[u8] {
        self.message.as_ref().map(|m| m.body.as_slice()).unwrap_or(&[])
    }

    fn delivery_count(&self) -> u32 {
        self.message.as_ref().map(|m| m.delivery_count).unwrap_or(0)
    }

    async fn acknowledge(mut self: Box<Self>) -> Result<(), RelayError> {
        if self.message.take().is_some() {
            let mut state = self.state.lock().unwrap();
            state.in_flight -= 1;
        }
        Ok(())
    }

    async fn abandon(mut self: Box<Self>) -> Result<(), RelayError> {
        if let Some(message) = self.message.take() {
            {
                let mut state = self.state.lock().unwrap();
                state.in_flight -= 1;
                state.ready.push_back(message);
            }
            self.notify.notify_one();
        }
        Ok(())
    }

    async fn dead_letter(mut self: Box<Self>, reason: String) -> Result<(), RelayError> {
        if let Some(message) = self.message.take() {
            let mut state = self.state.lock().unwrap();
            state.in_flight -= 1;
            state.dead.push(DeadLetter {
                body: message.body,
                reason,
                delivery_count: message.delivery_count,
            });
        }
        Ok(())
    }
}

impl Drop for InMemoryDelivery {
    fn drop(&mut self) {
        if let Some(message) = self.message.take() {
            if let Ok(mut state) = self.state.lock() {
                state.in_flight -= 1;
                state.ready.push_back(message);
            }
            self.notify.notify_one();
        }
    }
}
