//! Client-visible task status record.
//!
//! State transitions:
//! - Queued -> Processing -> Completed
//! - Queued -> Processing -> Failed (a redelivery may run the same task back
//!   through Processing; Completed is terminal)
//!
//! Design:
//! - This record is the producer's committed view of the moment it was
//!   written; the store applies full-record upserts, last writer wins.
//! - All transitions go through methods, never direct field pokes, so the
//!   created timestamp survives and updated is bumped on every write.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::TaskId;

/// Lifecycle state as observed by a polling client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    /// Completed never transitions again; Failed can be re-driven by a
    /// redelivered message, so only Completed is terminal for duplicates.
    pub fn is_settled(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

/// Persisted status record, one per task id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRecord {
    pub id: TaskId,
    pub status: TaskStatus,

    /// 0-100, expected (not enforced) to be non-decreasing within one
    /// uninterrupted processing pass.
    pub progress_percentage: u8,

    /// Human-readable description of the current step.
    pub current_step: String,

    /// Set once at submission, immutable thereafter.
    pub created_at: DateTime<Utc>,

    /// Bumped on every write.
    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Horizon after which the store may drop the record.
    pub ttl_seconds: u64,
}

impl StatusRecord {
    /// Fresh record written by the submission service.
    pub fn queued(id: TaskId, now: DateTime<Utc>, ttl_seconds: u64) -> Self {
        Self {
            id,
            status: TaskStatus::Queued,
            progress_percentage: 0,
            current_step: "queued for processing".to_string(),
            created_at: now,
            updated_at: now,
            error_message: None,
            ttl_seconds,
        }
    }

    /// Mark the start of a processing pass. Clears any error left by an
    /// earlier failed attempt.
    pub fn begin_processing(&mut self, now: DateTime<Utc>) {
        self.status = TaskStatus::Processing;
        self.progress_percentage = 0;
        self.current_step = "starting".to_string();
        self.error_message = None;
        self.updated_at = now;
    }

    /// Incremental progress while Processing.
    pub fn report_progress(&mut self, percentage: u8, step: &str, now: DateTime<Utc>) {
        self.status = TaskStatus::Processing;
        self.progress_percentage = percentage.min(100);
        self.current_step = step.to_string();
        self.updated_at = now;
    }

    /// Terminal success.
    pub fn complete(&mut self, now: DateTime<Utc>) {
        self.status = TaskStatus::Completed;
        self.progress_percentage = 100;
        self.current_step = "finished".to_string();
        self.error_message = None;
        self.updated_at = now;
    }

    /// Failed attempt; a redelivery may supersede this later.
    pub fn fail(&mut self, error: impl Into<String>, now: DateTime<Utc>) {
        self.status = TaskStatus::Failed;
        self.current_step = "failed".to_string();
        self.error_message = Some(error.into());
        self.updated_at = now;
    }

    /// Point in time at which the store may drop this record.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + Duration::seconds(self.ttl_seconds as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> StatusRecord {
        StatusRecord::queued(TaskId::generate_at(Utc::now()), Utc::now(), 86_400)
    }

    #[test]
    fn queued_record_starts_at_zero() {
        let r = record();
        assert_eq!(r.status, TaskStatus::Queued);
        assert_eq!(r.progress_percentage, 0);
        assert_eq!(r.created_at, r.updated_at);
        assert!(r.error_message.is_none());
    }

    #[test]
    fn transitions_preserve_created_and_bump_updated() {
        let mut r = record();
        let created = r.created_at;

        let later = created + Duration::seconds(5);
        r.begin_processing(later);
        assert_eq!(r.status, TaskStatus::Processing);
        assert_eq!(r.created_at, created);
        assert_eq!(r.updated_at, later);

        let done = created + Duration::seconds(9);
        r.complete(done);
        assert_eq!(r.status, TaskStatus::Completed);
        assert_eq!(r.progress_percentage, 100);
        assert_eq!(r.created_at, created);
        assert_eq!(r.updated_at, done);
    }

    #[test]
    fn fail_records_the_error_and_a_retry_clears_it() {
        let mut r = record();
        r.begin_processing(Utc::now());
        r.fail("upstream timed out", Utc::now());
        assert_eq!(r.status, TaskStatus::Failed);
        assert_eq!(r.error_message.as_deref(), Some("upstream timed out"));

        // Redelivery drives the same record back through Processing.
        r.begin_processing(Utc::now());
        assert_eq!(r.status, TaskStatus::Processing);
        assert!(r.error_message.is_none());
    }

    #[test]
    fn progress_is_clamped_to_100() {
        let mut r = record();
        r.begin_processing(Utc::now());
        r.report_progress(250, "overshoot", Utc::now());
        assert_eq!(r.progress_percentage, 100);
    }

    #[test]
    fn wire_contract_uses_camel_case_and_lowercase_status() {
        let mut r = record();
        r.begin_processing(Utc::now());
        r.report_progress(40, "searching flights", Utc::now());

        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["status"], "processing");
        assert_eq!(v["progressPercentage"], 40);
        assert_eq!(v["currentStep"], "searching flights");
        assert!(v.get("createdAt").is_some());
        assert!(v.get("updatedAt").is_some());
        assert!(v.get("errorMessage").is_none());
        assert_eq!(v["ttlSeconds"], 86_400);
    }

    #[test]
    fn only_completed_and_failed_are_settled() {
        assert!(!TaskStatus::Queued.is_settled());
        assert!(!TaskStatus::Processing.is_settled());
        assert!(TaskStatus::Completed.is_settled());
        assert!(TaskStatus::Failed.is_settled());
    }
}
