//! Signed, retrying HTTP transport for the notiflow bridge protocol.
//!
//! This crate is the network boundary of the bridge subsystem. It owns:
//!
//! - the stable [`BridgeErrorCode`] taxonomy and failure classification
//! - HMAC-SHA256 request signing (`t=<ms>,v1=<hex>` header)
//! - the transient-failure retry policy with exponential backoff
//! - URL resolution between internal and externally hosted runtimes
//!
//! The primary entry point is [`BridgeTransport::execute`]; everything above
//! it (discovery, sync, execution) composes requests through
//! [`BridgeRequest`].

pub mod client;
pub mod error;
pub mod retry;
pub mod signing;

pub use client::{
    BridgeAction, BridgeRequest, BridgeTransport, CachedSecretProvider, INTERNAL_BRIDGE_BASE_ENV, SecretProvider,
    TUNNEL_BYPASS_HEADER, WorkflowHosting, resolve_bridge_url, validate_bridge_url,
};
pub use error::{BridgeError, BridgeErrorCode, classify_request_error, classify_response};
pub use retry::{RETRYABLE_NETWORK_CODES, RETRYABLE_STATUSES, RetryPolicy, is_retryable, run_with_retry};
pub use signing::{SIGNATURE_HEADER, sign_payload, signature_header};
