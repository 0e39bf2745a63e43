//! relay-core
//!
//! Core building blocks for the relay task pipeline: submit a unit of work,
//! get a task id back immediately, and poll for completion while a background
//! worker drives the computation through a durable queue.
//!
//! # Module layout
//! - **domain**: data model (TaskId, StatusRecord, TaskMessage, ResultRecord)
//! - **ports**: abstraction layer (StatusStore, WorkQueue, ResultStore, Producer, Clock)
//! - **impls**: in-memory adapters for development and tests
//! - **submit**: task submission service
//! - **worker**: background consumer loop and group lifecycle
//! - **progress**: bridge from producer progress callbacks to status writes
//! - **query**: client-facing status/result reads

pub mod config;
pub mod domain;
pub mod error;
pub mod impls;
pub mod observability;
pub mod ports;
pub mod progress;
pub mod query;
pub mod submit;
pub mod worker;

pub use config::RelayConfig;
pub use error::RelayError;
