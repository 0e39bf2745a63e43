//! Task identifier.
//!
//! ULID-backed: 128 bits, negligible collision probability, sortable by
//! creation time. Serialized as the canonical 26-character string so it can
//! travel through queue messages and store keys unchanged.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Identifier of a task, assigned once at submission and never reused.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Ulid);

impl TaskId {
    /// Generate a fresh id whose timestamp half comes from the given clock
    /// reading and whose low 80 bits are random.
    pub fn generate_at(now: DateTime<Utc>) -> Self {
        let ulid = Ulid::from_parts(now.timestamp_millis() as u64, rand::random());
        Self(ulid)
    }

    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl From<Ulid> for TaskId {
    fn from(ulid: Ulid) -> Self {
        Self(ulid)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TaskId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Ulid::from_str(s)?))
    }
}
