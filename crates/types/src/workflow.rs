//! Discovery-side workflow model.
//!
//! These types describe what a remote bridge runtime reports during the
//! `discover` action: workflows, their ordered steps, and the JSON schemas
//! attached to each. They are ephemeral: a [`WorkflowDefinition`] lives only
//! for the duration of one discovery call and is converted into durable
//! records by the reconciler.
//!
//! Raw discovery JSON crosses into the typed model in exactly one place,
//! [`DiscoveryOutput::from_value`]; nothing downstream touches the untyped
//! payload.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Channel or control-flow kind of a single workflow step.
///
/// This is a closed set: the state builder and control sanitizer both match
/// exhaustively on it, so new kinds are a deliberate, compiler-checked
/// addition rather than a runtime string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    Email,
    Sms,
    Push,
    Chat,
    InApp,
    Digest,
    Delay,
    Custom,
}

impl StepType {
    /// Wire name of the step type, matching the bridge protocol strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
            Self::Push => "push",
            Self::Chat => "chat",
            Self::InApp => "in_app",
            Self::Digest => "digest",
            Self::Delay => "delay",
            Self::Custom => "custom",
        }
    }
}

/// Per-step options reported by the runtime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOptions {
    /// When true, a failing step aborts the whole notification instead of
    /// continuing with the next step.
    #[serde(default)]
    pub fail_on_error_enabled: Option<bool>,
}

/// A single step as declared by the remote runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDefinition {
    /// Stable identifier; the join key that preserves step identity across
    /// repeated syncs.
    pub step_id: String,
    /// Channel or control-flow kind.
    #[serde(rename = "type")]
    pub step_type: StepType,
    /// JSON schema for the step's author-editable controls.
    #[serde(default)]
    pub controls: Option<Value>,
    /// JSON schema for the step's outputs.
    #[serde(default)]
    pub outputs: Option<Value>,
    /// JSON schema for the step's delivery results.
    #[serde(default)]
    pub results: Option<Value>,
    #[serde(default)]
    pub options: StepOptions,
}

/// Enablement overlay for a single channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelPreference {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub read_only: Option<bool>,
}

/// Workflow-level preference overlay.
///
/// Every field is optional: preferences are merged onto whatever is already
/// persisted, never replaced wholesale. See [`WorkflowPreferences::merged_over`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowPreferences {
    /// Overlay applied to all channels unless a channel entry overrides it.
    #[serde(default)]
    pub all: Option<ChannelPreference>,
    /// Per-channel overlays keyed by channel name, preserving author order.
    #[serde(default)]
    pub channels: IndexMap<String, ChannelPreference>,
}

impl WorkflowPreferences {
    /// Returns these preferences merged over `base` as a partial overlay:
    /// fields present here win, everything else keeps the base value.
    pub fn merged_over(&self, base: &WorkflowPreferences) -> WorkflowPreferences {
        let mut merged = base.clone();
        if let Some(all) = &self.all {
            let target = merged.all.get_or_insert_with(ChannelPreference::default);
            if all.enabled.is_some() {
                target.enabled = all.enabled;
            }
            if all.read_only.is_some() {
                target.read_only = all.read_only;
            }
        }
        for (channel, overlay) in &self.channels {
            let target = merged.channels.entry(channel.clone()).or_default();
            if overlay.enabled.is_some() {
                target.enabled = overlay.enabled;
            }
            if overlay.read_only.is_some() {
                target.read_only = overlay.read_only;
            }
        }
        merged
    }

    /// True when the overlay carries no values at all.
    pub fn is_empty(&self) -> bool {
        self.all.is_none() && self.channels.is_empty()
    }
}

/// A complete workflow as reported by one discovery call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDefinition {
    /// Canonical identifier; doubles as the trigger identifier on the
    /// persisted side.
    pub workflow_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Ordered execution steps.
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
    /// JSON schema for the trigger payload.
    #[serde(default)]
    pub payload: Option<Value>,
    /// JSON schema for workflow-level controls.
    #[serde(default)]
    pub controls: Option<Value>,
    #[serde(default)]
    pub preferences: Option<WorkflowPreferences>,
}

/// Failure converting raw discovery JSON into the typed model.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// The payload was not an object with a `workflows` array.
    #[error("discovery payload has no workflows array")]
    MissingWorkflows,
    /// A workflow or step failed schema conversion.
    #[error("malformed workflow definition: {0}")]
    Malformed(#[from] serde_json::Error),
    /// A workflow arrived without an identifier.
    #[error("workflow definition is missing a workflowId")]
    MissingWorkflowId,
    /// A step arrived without an identifier.
    #[error("step in workflow '{workflow_id}' is missing a stepId")]
    MissingStepId { workflow_id: String },
}

/// Top-level payload of the `discover` action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryOutput {
    pub workflows: Vec<WorkflowDefinition>,
}

impl DiscoveryOutput {
    /// Converts an untyped discovery response into the typed model.
    ///
    /// This is the single validation boundary for discovery JSON. A missing
    /// or non-array `workflows` field is rejected; an empty array is a valid
    /// result (the runtime simply exposes no workflows). Identifiers must be
    /// non-empty on every workflow and step.
    pub fn from_value(value: Value) -> Result<Self, DefinitionError> {
        let workflows = match value {
            Value::Object(mut map) => match map.remove("workflows") {
                Some(Value::Array(items)) => items,
                _ => return Err(DefinitionError::MissingWorkflows),
            },
            _ => return Err(DefinitionError::MissingWorkflows),
        };

        let mut parsed = Vec::with_capacity(workflows.len());
        for item in workflows {
            let definition: WorkflowDefinition = serde_json::from_value(item)?;
            if definition.workflow_id.trim().is_empty() {
                return Err(DefinitionError::MissingWorkflowId);
            }
            for step in &definition.steps {
                if step.step_id.trim().is_empty() {
                    return Err(DefinitionError::MissingStepId {
                        workflow_id: definition.workflow_id.clone(),
                    });
                }
            }
            parsed.push(definition);
        }
        Ok(Self { workflows: parsed })
    }
}
