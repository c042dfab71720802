//! Workflow discovery against a bridge runtime.
//!
//! Discovery is read-only and idempotent, so it runs with a retry ceiling of
//! one: a slow or flaky runtime should surface quickly rather than stall a
//! sync behind backoff sleeps. No partial result is ever accepted: any
//! transport failure or unusable payload becomes a single invalid-response
//! error.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use notiflow_transport::{BridgeAction, BridgeRequest};
use notiflow_types::{DiscoveryOutput, Environment, WorkflowDefinition};

use crate::bridge::BridgeInvoker;
use crate::error::EngineError;

/// Attempt ceiling for discovery-style requests.
const DISCOVERY_RETRIES_LIMIT: u32 = 1;

/// Fetches the full workflow/step definition set from a runtime.
pub struct WorkflowDiscoveryClient {
    bridge: Arc<dyn BridgeInvoker>,
}

impl WorkflowDiscoveryClient {
    pub fn new(bridge: Arc<dyn BridgeInvoker>) -> Self {
        Self { bridge }
    }

    /// Enumerates every workflow the runtime exposes.
    ///
    /// `url_override` targets a runtime that is not yet stored on the
    /// environment (the first sync, or a local tunnel during development).
    pub async fn discover(
        &self,
        environment: &Environment,
        url_override: Option<&str>,
    ) -> Result<Vec<WorkflowDefinition>, EngineError> {
        let mut request = BridgeRequest::new(BridgeAction::Discover).with_retries_limit(DISCOVERY_RETRIES_LIMIT);
        if let Some(url) = url_override {
            request = request.with_url_override(url);
        }

        let payload = self
            .bridge
            .invoke(environment, request)
            .await
            .map_err(|error| EngineError::InvalidDiscovery(error.to_string()))?;

        let output = DiscoveryOutput::from_value(payload).map_err(|error| EngineError::InvalidDiscovery(error.to_string()))?;
        debug!(
            environment_id = %environment.id,
            workflows = output.workflows.len(),
            "bridge discovery completed"
        );
        Ok(output.workflows)
    }

    /// Liveness probe against the runtime.
    pub async fn health_check(&self, environment: &Environment, url_override: Option<&str>) -> Result<Value, EngineError> {
        let mut request = BridgeRequest::new(BridgeAction::HealthCheck).with_retries_limit(DISCOVERY_RETRIES_LIMIT);
        if let Some(url) = url_override {
            request = request.with_url_override(url);
        }
        Ok(self.bridge.invoke(environment, request).await?)
    }

    /// Debug introspection: fetches the source snippet of one step.
    pub async fn step_code(&self, environment: &Environment, step_id: &str) -> Result<Value, EngineError> {
        let request = BridgeRequest::new(BridgeAction::Code)
            .with_param("stepId", step_id)
            .with_retries_limit(DISCOVERY_RETRIES_LIMIT);
        Ok(self.bridge.invoke(environment, request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::ScriptedBridge;
    use notiflow_transport::{BridgeError, BridgeErrorCode};
    use serde_json::json;

    fn environment() -> Environment {
        Environment {
            id: "env-1".into(),
            name: "Development".into(),
            bridge_url: Some("https://bridge.example.com/api".into()),
            production: false,
        }
    }

    #[tokio::test]
    async fn returns_typed_definitions() {
        let bridge = Arc::new(ScriptedBridge::default());
        bridge.push_ok(json!({
            "workflows": [{"workflowId": "hello-world", "steps": [{"stepId": "send-email", "type": "email"}]}]
        }));
        let client = WorkflowDiscoveryClient::new(bridge.clone());

        let workflows = client.discover(&environment(), None).await.expect("discovery succeeds");
        assert_eq!(workflows.len(), 1);
        assert_eq!(workflows[0].workflow_id, "hello-world");

        let requests = bridge.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].action, BridgeAction::Discover);
        assert_eq!(requests[0].retries_limit, Some(1));
    }

    #[tokio::test]
    async fn transport_failure_becomes_invalid_discovery() {
        let bridge = Arc::new(ScriptedBridge::default());
        bridge.push_err(BridgeError::new(BridgeErrorCode::BridgeRequestTimeout, "deadline elapsed"));
        let client = WorkflowDiscoveryClient::new(bridge);

        let error = client.discover(&environment(), None).await.expect_err("must fail");
        assert!(matches!(error, EngineError::InvalidDiscovery(_)));
    }

    #[tokio::test]
    async fn missing_workflows_field_is_rejected() {
        let bridge = Arc::new(ScriptedBridge::default());
        bridge.push_ok(json!({"status": "ok"}));
        let client = WorkflowDiscoveryClient::new(bridge);

        let error = client.discover(&environment(), None).await.expect_err("must fail");
        assert!(matches!(error, EngineError::InvalidDiscovery(_)));
    }

    #[tokio::test]
    async fn url_override_is_forwarded() {
        let bridge = Arc::new(ScriptedBridge::default());
        bridge.push_ok(json!({"workflows": []}));
        let client = WorkflowDiscoveryClient::new(bridge.clone());

        client
            .discover(&environment(), Some("https://tunnel.example.com/bridge"))
            .await
            .expect("discovery succeeds");
        assert_eq!(bridge.requests()[0].url_override.as_deref(), Some("https://tunnel.example.com/bridge"));
    }
}
