//! In-memory adapters for development and tests.

mod memory_queue;
mod memory_result;
mod memory_status;

pub use memory_queue::{DeadLetter, InMemoryWorkQueue};
pub use memory_result::InMemoryResultStore;
pub use memory_status::InMemoryStatusStore;
