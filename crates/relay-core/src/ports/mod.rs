//! Ports: the seams between the engine and its external collaborators.
//!
//! The status store, work queue, and result store are separate systems with
//! no shared commit; each trait here is an independent single-key surface.
//! Swapping an implementation (in-memory, a cloud queue, a document store)
//! happens behind these traits only.

pub mod clock;
pub mod producer;
pub mod result_store;
pub mod status_store;
pub mod work_queue;

pub use clock::{Clock, FixedClock, SystemClock};
pub use producer::{Producer, ProgressSink};
pub use result_store::ResultStore;
pub use status_store::StatusStore;
pub use work_queue::{Delivery, WorkQueue};
