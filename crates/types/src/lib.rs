//! Shared data model for the notiflow bridge subsystem.
//!
//! Split along the lifecycle of a workflow:
//!
//! - **`workflow`**: ephemeral definitions produced by discovery
//! - **`persisted`**: durable records maintained by the reconciler
//! - **`job`**: execution lineage and prior-step snapshots
//! - **`execute`**: wire shapes for remote step invocation
//! - **`records`**: collaborator-owned store records

pub mod execute;
pub mod job;
pub mod persisted;
pub mod records;
pub mod workflow;

pub use execute::{ExecutionMetadata, ExecutionRequest, ExecutionResult, Subscriber};
pub use job::{DeliveryRecord, DigestEvent, Job, JobStatus, SnapshotOutput, SnapshotState, StepSnapshot};
pub use persisted::{FieldUpdate, PersistedStep, PersistedWorkflow, WorkflowKind, WorkflowOrigin};
pub use records::{ControlValuesRecord, Environment, ExecutionDetail, ExecutionStatus, NotificationGroup};
pub use workflow::{
    ChannelPreference, DefinitionError, DiscoveryOutput, StepDefinition, StepOptions, StepType, WorkflowDefinition,
    WorkflowPreferences,
};
