//! Collaborator interfaces consumed by the bridge core.
//!
//! Persistence lives outside this subsystem; these traits are the seams the
//! document-store adapters implement. In-memory reference implementations
//! for local development and tests live in [`crate::memory`].

use async_trait::async_trait;
use thiserror::Error;

use notiflow_types::{
    ControlValuesRecord, DeliveryRecord, ExecutionDetail, Job, NotificationGroup, PersistedWorkflow, WorkflowPreferences,
};

/// Failure surfaced by a persistence collaborator.
#[derive(Debug, Error)]
#[error("store operation failed: {0}")]
pub struct StoreError(pub String);

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Environment record access; the stored bridge URL is written only after a
/// fully successful sync.
#[async_trait]
pub trait EnvironmentStore: Send + Sync {
    async fn store_bridge_url(&self, environment_id: &str, url: &str) -> Result<(), StoreError>;
}

/// Durable workflow records, keyed by environment and trigger identifier.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Looks up a non-deleted workflow by its trigger identifier.
    async fn find_by_trigger(&self, environment_id: &str, trigger_identifier: &str)
    -> Result<Option<PersistedWorkflow>, StoreError>;

    async fn by_id(&self, environment_id: &str, workflow_id: &str) -> Result<Option<PersistedWorkflow>, StoreError>;

    /// All non-deleted bridge-managed (BRIDGE/ECHO) workflows of an
    /// environment; the disposal sweep iterates this.
    async fn list_bridge_managed(&self, environment_id: &str) -> Result<Vec<PersistedWorkflow>, StoreError>;

    async fn insert(&self, workflow: PersistedWorkflow) -> Result<PersistedWorkflow, StoreError>;

    async fn update(&self, workflow: PersistedWorkflow) -> Result<PersistedWorkflow, StoreError>;
}

/// Notification group lookup used for the "General" fallback on create.
#[async_trait]
pub trait NotificationGroupStore: Send + Sync {
    async fn find_by_name(&self, environment_id: &str, name: &str) -> Result<Option<NotificationGroup>, StoreError>;
}

/// Author-stored control values, keyed by step template id so they survive
/// re-syncs that keep the step's `step_id`.
#[async_trait]
pub trait ControlValuesStore: Send + Sync {
    async fn find(
        &self,
        environment_id: &str,
        workflow_id: &str,
        step_template_id: &str,
    ) -> Result<Option<ControlValuesRecord>, StoreError>;

    async fn delete(&self, environment_id: &str, workflow_id: &str, step_template_id: &str) -> Result<(), StoreError>;
}

/// Read access to the job chain.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn job(&self, job_id: &str) -> Result<Option<Job>, StoreError>;

    /// Batch fetch used when expanding digested jobs.
    async fn jobs(&self, job_ids: &[String]) -> Result<Vec<Job>, StoreError>;
}

/// Seen/read lookups for in-app deliveries.
#[async_trait]
pub trait DeliveryRecordStore: Send + Sync {
    async fn find_by_job(&self, job_id: &str) -> Result<Option<DeliveryRecord>, StoreError>;
}

/// Upserts workflow-level preferences. Callers pass the already-merged
/// overlay; implementations replace the stored preferences for the workflow.
#[async_trait]
pub trait PreferencesService: Send + Sync {
    async fn upsert_workflow_preferences(
        &self,
        environment_id: &str,
        workflow_id: &str,
        preferences: &WorkflowPreferences,
    ) -> Result<(), StoreError>;
}

/// Audit log of remote step invocations.
#[async_trait]
pub trait ExecutionDetailStore: Send + Sync {
    async fn record(&self, detail: ExecutionDetail) -> Result<(), StoreError>;
}

/// Soft-deletes a workflow that is no longer discovered. Cascading cleanup
/// (messages, triggers) is the collaborator's concern.
#[async_trait]
pub trait WorkflowDisposer: Send + Sync {
    async fn dispose(&self, environment_id: &str, workflow_id: &str) -> Result<(), StoreError>;
}
