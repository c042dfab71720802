//! Control-plane engine for bridge-hosted workflows.
//!
//! Three operations make up the engine surface:
//!
//! - [`WorkflowDiscoveryClient`] enumerates the workflows a remote runtime
//!   exposes (plus health-check and step-code introspection),
//! - [`WorkflowReconciler`] folds a discovered set into the durable workflow
//!   records of one environment,
//! - [`BridgeExecutor`] invokes a single step remotely with reconstructed
//!   prior-step state.
//!
//! Persistence is abstracted behind the traits in [`stores`]; the [`memory`]
//! module provides in-memory implementations for embedding and tests.

pub mod bridge;
pub mod discovery;
pub mod error;
pub mod executor;
pub mod memory;
pub mod sanitize;
pub mod state;
pub mod stores;
pub mod sync;

pub use bridge::BridgeInvoker;
pub use discovery::WorkflowDiscoveryClient;
pub use error::EngineError;
pub use executor::{BridgeExecutor, ExecuteStepCommand, StatelessContext};
pub use sanitize::sanitize_controls;
pub use state::StepStateBuilder;
pub use stores::{
    ControlValuesStore, DeliveryRecordStore, EnvironmentStore, ExecutionDetailStore, JobStore, NotificationGroupStore,
    PreferencesService, StoreError, WorkflowDisposer, WorkflowStore,
};
pub use sync::WorkflowReconciler;
