//! Collaborator-owned records the core reads and writes.
//!
//! These mirror the slices of the control plane's document store the bridge
//! subsystem touches: environments, notification groups, stored control
//! values, and execution-detail audit entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Environment scope for workflows, jobs, and the stored bridge URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub id: String,
    pub name: String,
    /// Bridge endpoint persisted by the last successful sync.
    pub bridge_url: Option<String>,
    /// Production-equivalent environments keep strict TLS validation.
    pub production: bool,
}

/// Named grouping for workflows; sync falls back to the group named
/// "General" when a discovered workflow does not specify one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationGroup {
    pub id: String,
    pub environment_id: String,
    pub name: String,
}

/// Author-stored control values bound to one step template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlValuesRecord {
    pub id: String,
    pub environment_id: String,
    pub workflow_id: String,
    pub step_template_id: String,
    pub controls: Value,
}

/// Outcome recorded in an execution-detail audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Success,
    Failed,
}

/// Audit entry written for every remote step invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionDetail {
    pub job_id: String,
    pub status: ExecutionStatus,
    pub detail: String,
    /// Raw response metadata on success, classified error payload on failure.
    pub raw: Option<Value>,
    pub timestamp: DateTime<Utc>,
}
