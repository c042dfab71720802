//! Engine-level error type.

use notiflow_transport::BridgeError;
use thiserror::Error;

use crate::stores::StoreError;

/// Failure of a discovery, sync, or execution operation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A transport-level failure, already classified into the bridge taxonomy.
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    /// A persistence collaborator failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Discovery returned a transport failure or an unusable payload; no
    /// partial result is accepted.
    #[error("invalid bridge discovery response: {0}")]
    InvalidDiscovery(String),

    /// A discovered workflow's trigger identifier collides with a workflow
    /// already created through the management UI. The persisted record is
    /// left untouched.
    #[error(
        "workflow '{0}' was already created in the management UI; rename the bridge workflow or delete the UI workflow before syncing"
    )]
    TriggerCollision(String),

    /// A new workflow specified no notification group and the environment
    /// has no fallback group.
    #[error("environment '{environment_id}' has no notification group named '{group_name}'")]
    MissingNotificationGroup { environment_id: String, group_name: String },

    /// A job referenced a persisted workflow that no longer exists.
    #[error("workflow '{0}' was not found")]
    WorkflowNotFound(String),

    /// The runtime answered an execution request with a body that does not
    /// fit the execution result shape.
    #[error("bridge returned a malformed execution result: {0}")]
    MalformedExecutionResult(String),
}
