//! In-memory reference implementations of the collaborator interfaces.
//!
//! These back local development, previews, and the test suites. They are
//! deliberately simple: every store is a `Mutex` around plain collections,
//! which is plenty under the one-sync-per-environment contract.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use notiflow_transport::{BridgeError, BridgeErrorCode, BridgeRequest};
use notiflow_types::{
    ControlValuesRecord, DeliveryRecord, Environment, ExecutionDetail, Job, NotificationGroup, PersistedWorkflow,
    WorkflowPreferences,
};

use crate::bridge::BridgeInvoker;
use crate::stores::{
    ControlValuesStore, DeliveryRecordStore, EnvironmentStore, ExecutionDetailStore, JobStore, NotificationGroupStore,
    PreferencesService, StoreError, WorkflowDisposer, WorkflowStore,
};

/// Environment store holding bridge URLs in a map.
#[derive(Default)]
pub struct InMemoryEnvironmentStore {
    bridge_urls: Mutex<HashMap<String, String>>,
}

impl InMemoryEnvironmentStore {
    pub fn bridge_url(&self, environment_id: &str) -> Option<String> {
        self.bridge_urls.lock().expect("lock poisoned").get(environment_id).cloned()
    }
}

#[async_trait]
impl EnvironmentStore for InMemoryEnvironmentStore {
    async fn store_bridge_url(&self, environment_id: &str, url: &str) -> Result<(), StoreError> {
        self.bridge_urls
            .lock()
            .expect("lock poisoned")
            .insert(environment_id.to_string(), url.to_string());
        Ok(())
    }
}

/// Workflow store keyed by workflow id.
#[derive(Default)]
pub struct InMemoryWorkflowStore {
    workflows: Mutex<HashMap<String, PersistedWorkflow>>,
}

impl InMemoryWorkflowStore {
    pub fn seed(&self, workflow: PersistedWorkflow) {
        self.workflows.lock().expect("lock poisoned").insert(workflow.id.clone(), workflow);
    }

    pub fn get(&self, workflow_id: &str) -> Option<PersistedWorkflow> {
        self.workflows.lock().expect("lock poisoned").get(workflow_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.workflows.lock().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl WorkflowStore for InMemoryWorkflowStore {
    async fn find_by_trigger(
        &self,
        environment_id: &str,
        trigger_identifier: &str,
    ) -> Result<Option<PersistedWorkflow>, StoreError> {
        Ok(self
            .workflows
            .lock()
            .expect("lock poisoned")
            .values()
            .find(|w| w.environment_id == environment_id && w.trigger_identifier == trigger_identifier && !w.deleted)
            .cloned())
    }

    async fn by_id(&self, environment_id: &str, workflow_id: &str) -> Result<Option<PersistedWorkflow>, StoreError> {
        Ok(self
            .workflows
            .lock()
            .expect("lock poisoned")
            .get(workflow_id)
            .filter(|w| w.environment_id == environment_id)
            .cloned())
    }

    async fn list_bridge_managed(&self, environment_id: &str) -> Result<Vec<PersistedWorkflow>, StoreError> {
        Ok(self
            .workflows
            .lock()
            .expect("lock poisoned")
            .values()
            .filter(|w| w.environment_id == environment_id && w.kind.is_bridge_managed() && !w.deleted)
            .cloned()
            .collect())
    }

    async fn insert(&self, workflow: PersistedWorkflow) -> Result<PersistedWorkflow, StoreError> {
        self.workflows
            .lock()
            .expect("lock poisoned")
            .insert(workflow.id.clone(), workflow.clone());
        Ok(workflow)
    }

    async fn update(&self, workflow: PersistedWorkflow) -> Result<PersistedWorkflow, StoreError> {
        let mut workflows = self.workflows.lock().expect("lock poisoned");
        if !workflows.contains_key(&workflow.id) {
            return Err(StoreError::new(format!("workflow '{}' does not exist", workflow.id)));
        }
        workflows.insert(workflow.id.clone(), workflow.clone());
        Ok(workflow)
    }
}

/// Notification groups keyed by (environment, name).
#[derive(Default)]
pub struct InMemoryNotificationGroupStore {
    groups: Mutex<Vec<NotificationGroup>>,
}

impl InMemoryNotificationGroupStore {
    pub fn seed(&self, group: NotificationGroup) {
        self.groups.lock().expect("lock poisoned").push(group);
    }
}

#[async_trait]
impl NotificationGroupStore for InMemoryNotificationGroupStore {
    async fn find_by_name(&self, environment_id: &str, name: &str) -> Result<Option<NotificationGroup>, StoreError> {
        Ok(self
            .groups
            .lock()
            .expect("lock poisoned")
            .iter()
            .find(|g| g.environment_id == environment_id && g.name == name)
            .cloned())
    }
}

/// Control values keyed by (workflow, step template).
#[derive(Default)]
pub struct InMemoryControlValuesStore {
    records: Mutex<Vec<ControlValuesRecord>>,
}

impl InMemoryControlValuesStore {
    pub fn seed(&self, record: ControlValuesRecord) {
        self.records.lock().expect("lock poisoned").push(record);
    }

    pub fn all(&self) -> Vec<ControlValuesRecord> {
        self.records.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl ControlValuesStore for InMemoryControlValuesStore {
    async fn find(
        &self,
        environment_id: &str,
        workflow_id: &str,
        step_template_id: &str,
    ) -> Result<Option<ControlValuesRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .expect("lock poisoned")
            .iter()
            .find(|r| {
                r.environment_id == environment_id && r.workflow_id == workflow_id && r.step_template_id == step_template_id
            })
            .cloned())
    }

    async fn delete(&self, environment_id: &str, workflow_id: &str, step_template_id: &str) -> Result<(), StoreError> {
        self.records.lock().expect("lock poisoned").retain(|r| {
            !(r.environment_id == environment_id && r.workflow_id == workflow_id && r.step_template_id == step_template_id)
        });
        Ok(())
    }
}

/// Job store keyed by job id.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: Mutex<HashMap<String, Job>>,
}

impl InMemoryJobStore {
    pub fn seed(&self, job: Job) {
        self.jobs.lock().expect("lock poisoned").insert(job.id.clone(), job);
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn job(&self, job_id: &str) -> Result<Option<Job>, StoreError> {
        Ok(self.jobs.lock().expect("lock poisoned").get(job_id).cloned())
    }

    async fn jobs(&self, job_ids: &[String]) -> Result<Vec<Job>, StoreError> {
        let jobs = self.jobs.lock().expect("lock poisoned");
        Ok(job_ids.iter().filter_map(|id| jobs.get(id).cloned()).collect())
    }
}

/// Delivery records keyed by job id.
#[derive(Default)]
pub struct InMemoryDeliveryRecordStore {
    records: Mutex<HashMap<String, DeliveryRecord>>,
}

impl InMemoryDeliveryRecordStore {
    pub fn seed(&self, record: DeliveryRecord) {
        self.records.lock().expect("lock poisoned").insert(record.job_id.clone(), record);
    }
}

#[async_trait]
impl DeliveryRecordStore for InMemoryDeliveryRecordStore {
    async fn find_by_job(&self, job_id: &str) -> Result<Option<DeliveryRecord>, StoreError> {
        Ok(self.records.lock().expect("lock poisoned").get(job_id).cloned())
    }
}

/// Preferences service that records the latest upsert per workflow.
#[derive(Default)]
pub struct InMemoryPreferencesService {
    upserts: Mutex<HashMap<String, WorkflowPreferences>>,
}

impl InMemoryPreferencesService {
    pub fn latest(&self, workflow_id: &str) -> Option<WorkflowPreferences> {
        self.upserts.lock().expect("lock poisoned").get(workflow_id).cloned()
    }
}

#[async_trait]
impl PreferencesService for InMemoryPreferencesService {
    async fn upsert_workflow_preferences(
        &self,
        _environment_id: &str,
        workflow_id: &str,
        preferences: &WorkflowPreferences,
    ) -> Result<(), StoreError> {
        self.upserts
            .lock()
            .expect("lock poisoned")
            .insert(workflow_id.to_string(), preferences.clone());
        Ok(())
    }
}

/// Execution-detail log that appends to a vector.
#[derive(Default)]
pub struct InMemoryExecutionDetailStore {
    details: Mutex<Vec<ExecutionDetail>>,
}

impl InMemoryExecutionDetailStore {
    pub fn all(&self) -> Vec<ExecutionDetail> {
        self.details.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl ExecutionDetailStore for InMemoryExecutionDetailStore {
    async fn record(&self, detail: ExecutionDetail) -> Result<(), StoreError> {
        self.details.lock().expect("lock poisoned").push(detail);
        Ok(())
    }
}

/// Disposer that records the ids it was asked to dispose, in call order.
#[derive(Default)]
pub struct RecordingDisposer {
    disposed: Mutex<Vec<String>>,
}

impl RecordingDisposer {
    pub fn disposed(&self) -> Vec<String> {
        self.disposed.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl WorkflowDisposer for RecordingDisposer {
    async fn dispose(&self, _environment_id: &str, workflow_id: &str) -> Result<(), StoreError> {
        self.disposed.lock().expect("lock poisoned").push(workflow_id.to_string());
        Ok(())
    }
}

/// Bridge invoker that replays queued responses; used for previews against
/// canned payloads and throughout the test suites.
#[derive(Default)]
pub struct ScriptedBridge {
    responses: Mutex<Vec<Result<Value, BridgeError>>>,
    requests: Mutex<Vec<BridgeRequest>>,
}

impl ScriptedBridge {
    pub fn push_ok(&self, value: Value) {
        self.responses.lock().expect("lock poisoned").push(Ok(value));
    }

    pub fn push_err(&self, error: BridgeError) {
        self.responses.lock().expect("lock poisoned").push(Err(error));
    }

    /// Requests seen so far, in invocation order.
    pub fn requests(&self) -> Vec<BridgeRequest> {
        self.requests.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl BridgeInvoker for ScriptedBridge {
    async fn invoke(&self, _environment: &Environment, request: BridgeRequest) -> Result<Value, BridgeError> {
        self.requests.lock().expect("lock poisoned").push(request);
        let mut responses = self.responses.lock().expect("lock poisoned");
        if responses.is_empty() {
            return Err(BridgeError::new(
                BridgeErrorCode::UnknownNonRequestError,
                "scripted bridge has no queued response",
            ));
        }
        responses.remove(0)
    }
}
