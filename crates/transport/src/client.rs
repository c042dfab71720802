//! Signed HTTP client for the bridge protocol.
//!
//! [`BridgeTransport`] is the single network boundary between the control
//! plane and remotely hosted workflow code. It resolves the target URL,
//! signs the body with the environment secret, applies the retry policy,
//! and classifies every failure before it leaves the crate.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use std::env;

use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use reqwest::{Client, Method, header};
use serde_json::Value;
use tracing::debug;
use url::Url;

use notiflow_types::Environment;

use crate::error::{BridgeError, BridgeErrorCode, classify_request_error, classify_response};
use crate::retry::{RetryPolicy, run_with_retry};
use crate::signing::{SIGNATURE_HEADER, signature_header};

/// Marker header telling local tunnel providers to skip their interstitial.
pub const TUNNEL_BYPASS_HEADER: &str = "Bypass-Tunnel-Reminder";

/// Environment variable overriding the internally hosted bridge base URL.
pub const INTERNAL_BRIDGE_BASE_ENV: &str = "NOTIFLOW_INTERNAL_BRIDGE_BASE";

/// Default base for internally hosted workflow runtimes.
const DEFAULT_INTERNAL_BRIDGE_BASE: &str = "http://localhost:3000/v1/environments";

/// Per-call deadline applied to every bridge request.
const REQUEST_DEADLINE: Duration = Duration::from_secs(5);

/// Action selector of the bridge wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeAction {
    Discover,
    HealthCheck,
    /// Debug introspection of a step's source snippet.
    Code,
    Execute,
    /// Same shape as `Execute` but with no persistence side effects.
    Preview,
}

impl BridgeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discover => "discover",
            Self::HealthCheck => "health-check",
            Self::Code => "code",
            Self::Execute => "execute",
            Self::Preview => "preview",
        }
    }

    /// Discovery-style actions are GETs; execution actions POST a body.
    pub fn method(&self) -> Method {
        match self {
            Self::Discover | Self::HealthCheck | Self::Code => Method::GET,
            Self::Execute | Self::Preview => Method::POST,
        }
    }
}

/// Where the workflow code for a request is hosted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WorkflowHosting {
    /// Runs inside the control plane's own runtime; resolves to the fixed
    /// internal endpoint.
    Internal,
    /// Runs in author-controlled code; requires a stored or explicit URL.
    #[default]
    External,
}

/// One logical bridge request.
#[derive(Debug, Clone)]
pub struct BridgeRequest {
    pub action: BridgeAction,
    /// JSON body for POST actions; GET actions sign an empty object.
    pub event: Option<Value>,
    /// Extra query parameters (`workflowId`, `stepId`, ...).
    pub search_params: IndexMap<String, String>,
    /// Caller-supplied URL; wins over every other resolution source.
    pub url_override: Option<String>,
    pub hosting: WorkflowHosting,
    /// Per-request attempt ceiling; defaults to the transport's policy.
    pub retries_limit: Option<u32>,
}

impl BridgeRequest {
    pub fn new(action: BridgeAction) -> Self {
        Self {
            action,
            event: None,
            search_params: IndexMap::new(),
            url_override: None,
            hosting: WorkflowHosting::External,
            retries_limit: None,
        }
    }

    pub fn with_event(mut self, event: Value) -> Self {
        self.event = Some(event);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.search_params.insert(key.into(), value.into());
        self
    }

    pub fn with_url_override(mut self, url: impl Into<String>) -> Self {
        self.url_override = Some(url.into());
        self
    }

    pub fn with_hosting(mut self, hosting: WorkflowHosting) -> Self {
        self.hosting = hosting;
        self
    }

    pub fn with_retries_limit(mut self, limit: u32) -> Self {
        self.retries_limit = Some(limit);
        self
    }
}

/// Source of decrypted signing secrets, fetched per request.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    async fn secret_for(&self, environment_id: &str) -> Result<String, BridgeError>;
}

/// Memoizing [`SecretProvider`] decorator with explicit invalidation for
/// secret rotation.
pub struct CachedSecretProvider<P> {
    inner: P,
    cache: Mutex<HashMap<String, String>>,
}

impl<P: SecretProvider> CachedSecretProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Drops the cached secret for one environment.
    pub fn invalidate(&self, environment_id: &str) {
        self.cache.lock().expect("secret cache lock poisoned").remove(environment_id);
    }
}

#[async_trait]
impl<P: SecretProvider> SecretProvider for CachedSecretProvider<P> {
    async fn secret_for(&self, environment_id: &str) -> Result<String, BridgeError> {
        if let Some(secret) = self.cache.lock().expect("secret cache lock poisoned").get(environment_id) {
            return Ok(secret.clone());
        }
        let secret = self.inner.secret_for(environment_id).await?;
        self.cache
            .lock()
            .expect("secret cache lock poisoned")
            .insert(environment_id.to_string(), secret.clone());
        Ok(secret)
    }
}

/// Signed, retrying HTTP client for bridge endpoints.
pub struct BridgeTransport {
    http: Client,
    secrets: Arc<dyn SecretProvider>,
    policy: RetryPolicy,
}

impl BridgeTransport {
    /// Builds a transport for a deployment tier.
    ///
    /// TLS certificate validation is relaxed only off production, so local
    /// tunnels with self-signed certificates work during development.
    pub fn new(secrets: Arc<dyn SecretProvider>, production: bool) -> Result<Self, BridgeError> {
        let http = Client::builder()
            .timeout(REQUEST_DEADLINE)
            .danger_accept_invalid_certs(!production)
            .build()
            .map_err(|e| {
                BridgeError::new(BridgeErrorCode::UnknownNonRequestError, "failed to build bridge http client").with_cause(e)
            })?;
        Ok(Self {
            http,
            secrets,
            policy: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Executes one bridge action against the environment's runtime.
    ///
    /// The response body is parsed as JSON; any failure is classified into
    /// the [`BridgeErrorCode`] taxonomy before being returned.
    pub async fn execute(&self, environment: &Environment, request: BridgeRequest) -> Result<Value, BridgeError> {
        let url = resolve_bridge_url(environment, &request)?;
        let body = match &request.event {
            Some(event) => serde_json::to_string(event).map_err(|e| {
                BridgeError::new(BridgeErrorCode::UnknownNonRequestError, "failed to encode bridge request body").with_cause(e)
            })?,
            None => "{}".to_string(),
        };
        let secret = self.secrets.secret_for(&environment.id).await?;

        let policy = request
            .retries_limit
            .map(RetryPolicy::new)
            .unwrap_or(self.policy);
        let method = request.action.method();

        debug!(
            url = %url,
            action = request.action.as_str(),
            retries_limit = policy.retries_limit,
            "executing bridge request"
        );

        run_with_retry(policy, |attempt| {
            let url = url.clone();
            let body = body.clone();
            let secret = secret.clone();
            let method = method.clone();
            let request = &request;
            async move {
                let timestamp_ms = Utc::now().timestamp_millis();
                let mut builder = self
                    .http
                    .request(method.clone(), url.clone())
                    .query(&[("action", request.action.as_str())])
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(TUNNEL_BYPASS_HEADER, "true")
                    .header(SIGNATURE_HEADER, signature_header(&secret, timestamp_ms, &body));
                for (key, value) in &request.search_params {
                    builder = builder.query(&[(key.as_str(), value.as_str())]);
                }
                if method == Method::POST {
                    builder = builder.body(body.clone());
                }

                debug!(attempt, url = %url, "sending bridge request");
                let response = builder.send().await.map_err(|e| classify_request_error(&url, e))?;

                let status = response.status();
                let text = response.text().await.map_err(|e| {
                    BridgeError::new(
                        BridgeErrorCode::ResponseReadError,
                        format!("failed to read bridge response from {url}"),
                    )
                    .with_status(status.as_u16())
                    .with_cause(e)
                })?;

                if !status.is_success() {
                    return Err(classify_response(&url, status.as_u16(), &text));
                }

                serde_json::from_str(&text).map_err(|e| {
                    BridgeError::new(
                        BridgeErrorCode::ResponseParseError,
                        format!("bridge response from {url} is not valid JSON"),
                    )
                    .with_status(status.as_u16())
                    .with_cause(e)
                })
            }
        })
        .await
    }
}

/// Resolves the target URL for a request.
///
/// Precedence: explicit override, then the internal endpoint for internally
/// hosted workflows, then the environment's stored bridge URL. Externally
/// hosted workflows without a stored URL fail with `INVALID_BRIDGE_URL`.
pub fn resolve_bridge_url(environment: &Environment, request: &BridgeRequest) -> Result<String, BridgeError> {
    if let Some(explicit) = &request.url_override {
        validate_bridge_url(explicit, environment.production)?;
        return Ok(explicit.clone());
    }

    match request.hosting {
        WorkflowHosting::Internal => Ok(format!("{}/{}/bridge", internal_bridge_base(), environment.id)),
        WorkflowHosting::External => match &environment.bridge_url {
            Some(stored) if !stored.trim().is_empty() => {
                validate_bridge_url(stored, environment.production)?;
                Ok(stored.clone())
            }
            _ => Err(BridgeError::new(
                BridgeErrorCode::InvalidBridgeUrl,
                format!("environment '{}' has no stored bridge URL", environment.id),
            )),
        },
    }
}

fn internal_bridge_base() -> String {
    env::var(INTERNAL_BRIDGE_BASE_ENV).unwrap_or_else(|_| DEFAULT_INTERNAL_BRIDGE_BASE.to_string())
}

/// Hosts allowed any scheme for local development.
const LOCAL_HOSTS: &[&str] = &["localhost", "127.0.0.1", "0.0.0.0"];

/// Validates a bridge URL before it is stored or used.
///
/// Local hosts may use any scheme; remote hosts must be http(s), and https
/// specifically when the environment is production-equivalent.
pub fn validate_bridge_url(candidate: &str, production: bool) -> Result<(), BridgeError> {
    let parsed = Url::parse(candidate).map_err(|e| {
        BridgeError::new(BridgeErrorCode::InvalidBridgeUrl, format!("invalid bridge URL '{candidate}'")).with_cause(e)
    })?;

    let host = parsed.host_str().ok_or_else(|| {
        BridgeError::new(
            BridgeErrorCode::InvalidBridgeUrl,
            format!("bridge URL '{candidate}' has no host"),
        )
    })?;

    if LOCAL_HOSTS.iter().any(|local| host.eq_ignore_ascii_case(local)) {
        return Ok(());
    }

    match parsed.scheme() {
        "https" => Ok(()),
        "http" if !production => Ok(()),
        "http" => Err(BridgeError::new(
            BridgeErrorCode::InvalidBridgeUrl,
            format!("bridge URL '{candidate}' must use https in production"),
        )),
        other => Err(BridgeError::new(
            BridgeErrorCode::UnsupportedProtocol,
            format!("bridge URL '{candidate}' uses unsupported scheme '{other}'"),
        )),
    }
}
