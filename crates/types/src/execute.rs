//! Wire shapes for the `execute` and `preview` actions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::job::StepSnapshot;

/// Recipient identity forwarded to the bridge runtime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub subscriber_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Body of an `execute`/`preview` POST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Trigger payload with internal-only fields stripped.
    pub payload: Value,
    /// Resolved control values for the target step.
    pub controls: Value,
    /// Prior-step snapshots, most recent first.
    pub state: Vec<StepSnapshot>,
    pub subscriber: Subscriber,
}

/// Runtime-reported execution metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionMetadata {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<bool>,
    /// Runtime-measured duration in milliseconds.
    #[serde(default)]
    pub duration: Option<i64>,
}

/// Result of a single remote step invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    #[serde(default)]
    pub outputs: Option<Value>,
    #[serde(default)]
    pub metadata: Option<ExecutionMetadata>,
}
