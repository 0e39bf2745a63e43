//! Domain model: identifiers, status records, queue messages, results.

pub mod ids;
pub mod message;
pub mod result;
pub mod status;

pub use ids::TaskId;
pub use message::{CONTENT_TYPE_JSON, TaskMessage};
pub use result::{ResultRecord, result_key};
pub use status::{StatusRecord, TaskStatus};
