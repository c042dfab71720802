//! Seam between the engine and the network transport.

use async_trait::async_trait;
use serde_json::Value;

use notiflow_transport::{BridgeError, BridgeRequest, BridgeTransport};
use notiflow_types::Environment;

/// Executes bridge requests. [`BridgeTransport`] is the production
/// implementation; tests and previews use
/// [`crate::memory::ScriptedBridge`].
#[async_trait]
pub trait BridgeInvoker: Send + Sync {
    async fn invoke(&self, environment: &Environment, request: BridgeRequest) -> Result<Value, BridgeError>;
}

#[async_trait]
impl BridgeInvoker for BridgeTransport {
    async fn invoke(&self, environment: &Environment, request: BridgeRequest) -> Result<Value, BridgeError> {
        self.execute(environment, request).await
    }
}
