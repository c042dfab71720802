//! Job lineage and prior-step state snapshots.
//!
//! Every triggered notification produces a parent-linked chain of jobs, one
//! per executed step. Walking that chain backwards yields the "state" array a
//! bridge runtime receives when a later step executes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::workflow::StepType;

/// Terminal and in-flight statuses of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Queued,
    Running,
    Completed,
    Failed,
    Delayed,
    Canceled,
    /// Folded into a digest job instead of executing on its own.
    Merged,
    Skipped,
}

/// One executed (or executing) step of a triggered notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    /// Previous step's job in the chain; `None` for the trigger step.
    pub parent_id: Option<String>,
    pub environment_id: String,
    /// Persisted workflow this job belongs to.
    pub workflow_id: String,
    pub step_id: String,
    /// Template binding of the step at execution time.
    pub step_template_id: String,
    pub step_type: StepType,
    pub status: JobStatus,
    pub error: Option<Value>,
    /// Trigger payload as received, internal fields included.
    pub payload: Value,
    /// Output produced by the step itself (custom steps).
    pub output: Option<Value>,
    /// Jobs merged into this one when the step is a digest.
    pub digested_job_ids: Vec<String>,
    pub transaction_id: String,
    pub subscriber_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Seen/read bookkeeping for an in-app delivery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRecord {
    pub id: String,
    pub job_id: String,
    pub seen: bool,
    pub read: bool,
    pub last_seen_date: Option<DateTime<Utc>>,
    pub last_read_date: Option<DateTime<Utc>>,
}

/// One payload batched by a digest step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestEvent {
    pub id: String,
    pub time: DateTime<Utc>,
    pub payload: Value,
}

/// Type-specific output of a previously executed step.
///
/// Serialized untagged so the wire sees plain objects; kinds with nothing to
/// report serialize as `{}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged, rename_all = "camelCase")]
pub enum SnapshotOutput {
    Delay {
        /// Wall-clock milliseconds elapsed since the delay job was created.
        #[serde(rename = "duration")]
        duration_ms: i64,
    },
    Digest {
        /// All batched payloads, ascending by time.
        events: Vec<DigestEvent>,
    },
    InApp {
        seen: bool,
        read: bool,
        #[serde(rename = "lastSeenDate")]
        last_seen_date: Option<DateTime<Utc>>,
        #[serde(rename = "lastReadDate")]
        last_read_date: Option<DateTime<Utc>>,
    },
    /// A custom step's own previously produced output.
    Custom(Value),
    Empty {},
}

/// Terminal status and error recorded for a prior step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotState {
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

/// Snapshot of one prior step, as sent to the bridge runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSnapshot {
    pub step_id: String,
    pub outputs: SnapshotOutput,
    pub state: SnapshotState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_output_serializes_to_empty_object() {
        let snapshot = StepSnapshot {
            step_id: "send-sms".into(),
            outputs: SnapshotOutput::Empty {},
            state: SnapshotState {
                status: JobStatus::Completed,
                error: None,
            },
        };
        let value = serde_json::to_value(&snapshot).expect("serializable");
        assert_eq!(
            value,
            json!({"stepId": "send-sms", "outputs": {}, "state": {"status": "completed"}})
        );
    }

    #[test]
    fn custom_output_passes_through() {
        let outputs = SnapshotOutput::Custom(json!({"score": 7}));
        assert_eq!(serde_json::to_value(&outputs).expect("serializable"), json!({"score": 7}));
    }

    #[test]
    fn delay_output_carries_duration() {
        let value = serde_json::to_value(SnapshotOutput::Delay { duration_ms: 1500 }).expect("serializable");
        assert_eq!(value, json!({"duration": 1500}));
    }
}
