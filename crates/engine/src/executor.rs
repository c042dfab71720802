//! Remote step execution.
//!
//! The executor composes everything the runtime needs to run one step:
//! the stripped trigger payload, resolved control values, reconstructed
//! prior-step state, and the subscriber. Stateful execution works against a
//! durable workflow and real job lineage; stateless execution targets a
//! caller-supplied URL with caller-supplied controls and no lineage
//! (previews and local development).

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::debug;

use notiflow_transport::{BridgeAction, BridgeRequest, WorkflowHosting};
use notiflow_types::{
    Environment, ExecutionDetail, ExecutionRequest, ExecutionResult, ExecutionStatus, Job, Subscriber, WorkflowOrigin,
};

use crate::bridge::BridgeInvoker;
use crate::error::EngineError;
use crate::sanitize::sanitize_controls;
use crate::state::StepStateBuilder;
use crate::stores::{ControlValuesStore, ExecutionDetailStore, WorkflowStore};

/// Caller-supplied context for stateless execution.
#[derive(Debug, Clone)]
pub struct StatelessContext {
    /// Target runtime; bypasses the environment's stored bridge URL.
    pub bridge_url: String,
    /// Trigger identifier forwarded as the `workflowId` query parameter.
    pub workflow_id: String,
    /// Control values used verbatim; nothing is loaded or sanitized.
    pub controls: Value,
}

/// One step invocation request.
#[derive(Debug, Clone)]
pub struct ExecuteStepCommand {
    pub job: Job,
    pub subscriber: Subscriber,
    /// Use the side-effect-free `preview` action instead of `execute`.
    pub preview: bool,
    /// Present for stateless execution; absent for durable workflows.
    pub stateless: Option<StatelessContext>,
}

/// Invokes individual workflow steps on a bridge runtime.
pub struct BridgeExecutor {
    bridge: Arc<dyn BridgeInvoker>,
    workflows: Arc<dyn WorkflowStore>,
    controls: Arc<dyn ControlValuesStore>,
    details: Arc<dyn ExecutionDetailStore>,
    state: StepStateBuilder,
}

impl BridgeExecutor {
    pub fn new(
        bridge: Arc<dyn BridgeInvoker>,
        workflows: Arc<dyn WorkflowStore>,
        controls: Arc<dyn ControlValuesStore>,
        details: Arc<dyn ExecutionDetailStore>,
        state: StepStateBuilder,
    ) -> Self {
        Self {
            bridge,
            workflows,
            controls,
            details,
            state,
        }
    }

    /// Executes one step remotely, recording an audit entry either way.
    ///
    /// Failures are audit-logged and re-thrown; job-level retry policy is
    /// the caller's responsibility.
    pub async fn execute_step(&self, environment: &Environment, command: ExecuteStepCommand) -> Result<ExecutionResult, EngineError> {
        let job = &command.job;
        let action = if command.preview {
            BridgeAction::Preview
        } else {
            BridgeAction::Execute
        };

        let (workflow_id, controls, state, hosting, url_override) = match &command.stateless {
            Some(context) => (
                context.workflow_id.clone(),
                context.controls.clone(),
                Vec::new(),
                WorkflowHosting::External,
                Some(context.bridge_url.clone()),
            ),
            None => {
                let workflow = self
                    .workflows
                    .by_id(&environment.id, &job.workflow_id)
                    .await?
                    .ok_or_else(|| EngineError::WorkflowNotFound(job.workflow_id.clone()))?;

                let stored = self
                    .controls
                    .find(&environment.id, &workflow.id, &job.step_template_id)
                    .await?
                    .map(|record| record.controls)
                    .unwrap_or_else(|| Value::Object(Map::new()));

                // UI-authored workflows run in the internal runtime and get
                // the sanitation pass; external authors own their schema.
                let internally_hosted = workflow.origin == Some(WorkflowOrigin::ManagementUi);
                let controls = if internally_hosted {
                    sanitize_controls(job.step_type, stored)
                } else {
                    stored
                };
                let hosting = if internally_hosted {
                    WorkflowHosting::Internal
                } else {
                    WorkflowHosting::External
                };

                let state = self.state.build_state(job).await?;
                (workflow.trigger_identifier.clone(), controls, state, hosting, None)
            }
        };

        let body = ExecutionRequest {
            payload: strip_internal_fields(&job.payload),
            controls,
            state,
            subscriber: command.subscriber.clone(),
        };
        let event = serde_json::to_value(&body)
            .map_err(|error| EngineError::MalformedExecutionResult(format!("request body not serializable: {error}")))?;

        let mut request = BridgeRequest::new(action)
            .with_event(event)
            .with_param("workflowId", workflow_id.clone())
            .with_param("stepId", job.step_id.clone())
            .with_hosting(hosting);
        if let Some(url) = url_override {
            request = request.with_url_override(url);
        }

        debug!(
            job_id = %job.id,
            workflow_id = %workflow_id,
            step_id = %job.step_id,
            action = action.as_str(),
            "executing bridge step"
        );

        match self.bridge.invoke(environment, request).await {
            Ok(raw) => {
                let result: ExecutionResult = serde_json::from_value(raw.clone())
                    .map_err(|error| EngineError::MalformedExecutionResult(error.to_string()))?;
                self.details
                    .record(ExecutionDetail {
                        job_id: job.id.clone(),
                        status: ExecutionStatus::Success,
                        detail: format!("step '{}' executed via bridge", job.step_id),
                        raw: Some(raw),
                        timestamp: Utc::now(),
                    })
                    .await?;
                Ok(result)
            }
            Err(bridge_error) => {
                self.details
                    .record(ExecutionDetail {
                        job_id: job.id.clone(),
                        status: ExecutionStatus::Failed,
                        detail: format!("step '{}' failed via bridge: {}", job.step_id, bridge_error.message),
                        raw: Some(bridge_error.to_audit_value()),
                        timestamp: Utc::now(),
                    })
                    .await?;
                Err(bridge_error.into())
            }
        }
    }
}

/// Removes internal-only fields (double-underscore prefixed) from the
/// trigger payload before it crosses the bridge.
fn strip_internal_fields(payload: &Value) -> Value {
    match payload {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| !key.starts_with("__"))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}
