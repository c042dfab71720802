//! Durable workflow records.
//!
//! A [`PersistedWorkflow`] is what survives between syncs. Steps are bound to
//! stable template ids so that authored control values keep their anchor even
//! when the remote runtime reorders or extends its step list.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::workflow::{StepType, WorkflowPreferences};

/// Provenance of a persisted workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowOrigin {
    /// Authored in externally hosted code and imported through sync.
    External,
    /// Authored through the management UI; never writable by sync.
    ManagementUi,
    Other,
}

/// Execution kind of a persisted workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowKind {
    Bridge,
    Echo,
    Other,
}

impl WorkflowKind {
    /// Kinds that participate in bridge synchronization and disposal.
    pub fn is_bridge_managed(&self) -> bool {
        matches!(self, Self::Bridge | Self::Echo)
    }
}

/// A step bound to a persisted template id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedStep {
    /// Stable template identity; preserved whenever the step's `step_id`
    /// survives a re-sync, regardless of position.
    pub template_id: String,
    pub step_id: String,
    pub step_type: StepType,
    pub name: String,
    /// JSON schema for the step's controls, from the latest discovery.
    pub controls_schema: Option<Value>,
    pub fail_on_error: bool,
}

/// Durable record of a bridge-managed workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedWorkflow {
    pub id: String,
    pub environment_id: String,
    /// Unique per environment among non-deleted bridge-managed workflows;
    /// equals the discovered `workflow_id`.
    pub trigger_identifier: String,
    /// `None` on legacy records predating origin tracking; treated like
    /// [`WorkflowOrigin::External`] during disposal.
    pub origin: Option<WorkflowOrigin>,
    pub kind: WorkflowKind,
    pub name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub steps: Vec<PersistedStep>,
    pub payload_schema: Option<Value>,
    pub controls_schema: Option<Value>,
    pub preferences: WorkflowPreferences,
    pub notification_group_id: Option<String>,
    pub active: bool,
    pub draft: bool,
    /// Raw discovery snapshot kept for debugging and diffing.
    pub raw_discovery: Option<Value>,
    pub deleted: bool,
}

/// Update intent for an optional field, distinguishing "leave it alone" from
/// "explicitly clear it" from "set a new value".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldUpdate<T> {
    /// Keep whatever is currently stored.
    #[default]
    Keep,
    /// Remove the stored value.
    Clear,
    /// Replace the stored value.
    Set(T),
}

impl<T> FieldUpdate<T> {
    /// Builds the update that makes the stored field mirror `discovered`:
    /// a present value becomes [`FieldUpdate::Set`], an absent one becomes
    /// [`FieldUpdate::Clear`].
    pub fn mirror(discovered: Option<T>) -> Self {
        match discovered {
            Some(value) => Self::Set(value),
            None => Self::Clear,
        }
    }

    /// Applies the update to a stored optional field.
    pub fn apply(self, target: &mut Option<T>) {
        match self {
            Self::Keep => {}
            Self::Clear => *target = None,
            Self::Set(value) => *target = Some(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_update_tri_state() {
        let mut description = Some("original".to_string());
        FieldUpdate::Keep.apply(&mut description);
        assert_eq!(description.as_deref(), Some("original"));

        FieldUpdate::Set("replaced".to_string()).apply(&mut description);
        assert_eq!(description.as_deref(), Some("replaced"));

        FieldUpdate::<String>::Clear.apply(&mut description);
        assert_eq!(description, None);
    }

    #[test]
    fn mirror_maps_absent_to_clear() {
        assert_eq!(FieldUpdate::mirror(Some("d".to_string())), FieldUpdate::Set("d".to_string()));
        assert_eq!(FieldUpdate::<String>::mirror(None), FieldUpdate::Clear);
    }

    #[test]
    fn bridge_managed_kinds() {
        assert!(WorkflowKind::Bridge.is_bridge_managed());
        assert!(WorkflowKind::Echo.is_bridge_managed());
        assert!(!WorkflowKind::Other.is_bridge_managed());
    }
}
