//! Bridge error taxonomy and failure classification.
//!
//! Every failure leaving the transport is a [`BridgeError`] with a stable
//! code from [`BridgeErrorCode`]. Callers branch on the code (and the retry
//! layer consults it); the message and optional data are for humans and
//! audit entries. Raw causes never cross the boundary unclassified.

use serde_json::{Value, json};

use thiserror::Error;

/// Stable error codes of the bridge protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeErrorCode {
    /// No usable bridge URL could be resolved for the request.
    InvalidBridgeUrl,
    /// The per-call deadline elapsed.
    BridgeRequestTimeout,
    /// The resolved URL uses a scheme the client cannot speak.
    UnsupportedProtocol,
    /// The response body could not be read.
    ResponseReadError,
    /// The request body could not be uploaded.
    RequestUploadError,
    /// The HTTP cache layer failed.
    RequestCacheError,
    /// Redirect chain exceeded the client's ceiling.
    MaximumRedirectsExceeded,
    /// The response body was not valid JSON.
    ResponseParseError,
    /// A local tunnel provider reported the tunnel as gone.
    TunnelNotFound,
    /// TLS validation failed on a self-signed certificate.
    SelfSignedCertificate,
    /// The endpoint answered 404.
    BridgeEndpointNotFound,
    /// The endpoint answered but cannot serve bridge traffic right now.
    BridgeEndpointUnavailable,
    /// The endpoint rejected the HTTP method (bridge handler not mounted).
    BridgeMethodNotConfigured,
    /// OS-level network failure, carrying the passthrough errno-style code
    /// (`ECONNREFUSED`, `ETIMEDOUT`, ...).
    Network(String),
    /// Structured error declared by the remote runtime; the remote code is
    /// propagated verbatim.
    Remote(String),
    /// Request failed for a reason outside the taxonomy.
    UnknownRequestError,
    /// Failure before or after the request itself (signing, client setup).
    UnknownNonRequestError,
}

impl BridgeErrorCode {
    /// Stable wire/rendering name of the code.
    pub fn as_str(&self) -> &str {
        match self {
            Self::InvalidBridgeUrl => "INVALID_BRIDGE_URL",
            Self::BridgeRequestTimeout => "BRIDGE_REQUEST_TIMEOUT",
            Self::UnsupportedProtocol => "UNSUPPORTED_PROTOCOL",
            Self::ResponseReadError => "RESPONSE_READ_ERROR",
            Self::RequestUploadError => "REQUEST_UPLOAD_ERROR",
            Self::RequestCacheError => "REQUEST_CACHE_ERROR",
            Self::MaximumRedirectsExceeded => "MAXIMUM_REDIRECTS_EXCEEDED",
            Self::ResponseParseError => "RESPONSE_PARSE_ERROR",
            Self::TunnelNotFound => "TUNNEL_NOT_FOUND",
            Self::SelfSignedCertificate => "SELF_SIGNED_CERTIFICATE",
            Self::BridgeEndpointNotFound => "BRIDGE_ENDPOINT_NOT_FOUND",
            Self::BridgeEndpointUnavailable => "BRIDGE_ENDPOINT_UNAVAILABLE",
            Self::BridgeMethodNotConfigured => "BRIDGE_METHOD_NOT_CONFIGURED",
            Self::Network(code) => code,
            Self::Remote(code) => code,
            Self::UnknownRequestError => "UNKNOWN_BRIDGE_REQUEST_ERROR",
            Self::UnknownNonRequestError => "UNKNOWN_BRIDGE_NON_REQUEST_ERROR",
        }
    }
}

/// Classified failure of a bridge request.
#[derive(Debug, Error)]
#[error("{message} [{}]", self.code.as_str())]
pub struct BridgeError {
    pub code: BridgeErrorCode,
    pub message: String,
    /// HTTP status of the failing response, when one was received.
    pub http_status: Option<u16>,
    /// Contextual data (url, remote error payload) safe to surface.
    pub data: Option<Value>,
    #[source]
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl BridgeError {
    pub fn new(code: BridgeErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            http_status: None,
            data: None,
            cause: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// JSON rendering used for audit entries; never includes the raw cause.
    pub fn to_audit_value(&self) -> Value {
        json!({
            "code": self.code.as_str(),
            "message": self.message,
            "httpStatus": self.http_status,
            "data": self.data,
        })
    }
}

/// Passthrough network codes recognized by the classifier.
pub(crate) const DNS_FAILURE: &str = "ENOTFOUND";
pub(crate) const CONNECTION_REFUSED: &str = "ECONNREFUSED";
pub(crate) const CONNECTION_RESET: &str = "ECONNRESET";
pub(crate) const TIMED_OUT: &str = "ETIMEDOUT";
pub(crate) const HOST_UNREACHABLE: &str = "EHOSTUNREACH";
pub(crate) const NETWORK_UNREACHABLE: &str = "ENETUNREACH";

/// Classifies a non-success HTTP response into the taxonomy.
///
/// Remote runtimes may decline a request with a structured
/// `{code, message, data}` body; when recognizable, that error is
/// propagated verbatim as [`BridgeErrorCode::Remote`].
pub fn classify_response(url: &str, status: u16, body: &str) -> BridgeError {
    if let Some(remote) = remote_declared_error(body) {
        return remote.with_status(status);
    }

    let (code, message) = match status {
        404 if looks_like_missing_tunnel(body) => (
            BridgeErrorCode::TunnelNotFound,
            format!("local tunnel for {url} is no longer reachable"),
        ),
        404 => (
            BridgeErrorCode::BridgeEndpointNotFound,
            format!("bridge endpoint {url} was not found"),
        ),
        405 => (
            BridgeErrorCode::BridgeMethodNotConfigured,
            format!("bridge endpoint {url} does not accept this action; is the bridge handler mounted?"),
        ),
        502 | 503 => (
            BridgeErrorCode::BridgeEndpointUnavailable,
            format!("bridge endpoint {url} is unavailable"),
        ),
        _ => (
            BridgeErrorCode::UnknownRequestError,
            format!("bridge request to {url} failed with status {status}"),
        ),
    };

    BridgeError::new(code, message)
        .with_status(status)
        .with_data(json!({"url": url, "status": status}))
}

/// Classifies a `reqwest` failure into the taxonomy.
pub fn classify_request_error(url: &str, error: reqwest::Error) -> BridgeError {
    let status = error.status().map(|s| s.as_u16());

    let code = if error.is_timeout() {
        BridgeErrorCode::BridgeRequestTimeout
    } else if error.is_redirect() {
        BridgeErrorCode::MaximumRedirectsExceeded
    } else if error.is_decode() {
        BridgeErrorCode::ResponseParseError
    } else if is_certificate_failure(&error) {
        BridgeErrorCode::SelfSignedCertificate
    } else if let Some(network_code) = network_code(&error) {
        BridgeErrorCode::Network(network_code.to_string())
    } else if error.is_body() {
        BridgeErrorCode::RequestUploadError
    } else if error.is_builder() {
        BridgeErrorCode::UnsupportedProtocol
    } else {
        BridgeErrorCode::UnknownRequestError
    };

    let mut classified = BridgeError::new(code, format!("bridge request to {url} failed: {error}"))
        .with_data(json!({"url": url}))
        .with_cause(error);
    if let Some(status) = status {
        classified = classified.with_status(status);
    }
    classified
}

/// Extracts a remote-declared structured error from a response body.
fn remote_declared_error(body: &str) -> Option<BridgeError> {
    let value: Value = serde_json::from_str(body).ok()?;
    let code = value.get("code")?.as_str()?;
    if code.is_empty() {
        return None;
    }
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("bridge runtime declined the request")
        .to_string();
    let mut error = BridgeError::new(BridgeErrorCode::Remote(code.to_string()), message);
    if let Some(data) = value.get("data") {
        error = error.with_data(data.clone());
    }
    Some(error)
}

/// Local tunnel providers answer 404 with an HTML page naming the tunnel.
fn looks_like_missing_tunnel(body: &str) -> bool {
    let lowered = body.to_ascii_lowercase();
    lowered.contains("tunnel") && lowered.contains("not found")
}

fn is_certificate_failure(error: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(error);
    while let Some(inner) = source {
        let rendered = inner.to_string().to_ascii_lowercase();
        if rendered.contains("certificate") || rendered.contains("self-signed") || rendered.contains("self signed") {
            return true;
        }
        source = inner.source();
    }
    false
}

/// Maps the failure's underlying I/O condition to a passthrough code.
fn network_code(error: &reqwest::Error) -> Option<&'static str> {
    if let Some(kind) = io_error_kind(error) {
        let code = match kind {
            std::io::ErrorKind::ConnectionRefused => CONNECTION_REFUSED,
            std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::ConnectionAborted => CONNECTION_RESET,
            std::io::ErrorKind::TimedOut => TIMED_OUT,
            std::io::ErrorKind::HostUnreachable => HOST_UNREACHABLE,
            std::io::ErrorKind::NetworkUnreachable => NETWORK_UNREACHABLE,
            _ => return from_rendered_error(error),
        };
        return Some(code);
    }
    if error.is_connect() {
        return from_rendered_error(error).or(Some(CONNECTION_REFUSED));
    }
    from_rendered_error(error)
}

/// DNS failures surface as hyper resolve errors without an `ErrorKind`;
/// fall back to inspecting the rendered chain.
fn from_rendered_error(error: &reqwest::Error) -> Option<&'static str> {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(inner) = source {
        let rendered = inner.to_string().to_ascii_lowercase();
        if rendered.contains("dns") || rendered.contains("failed to lookup") || rendered.contains("name or service not known") {
            return Some(DNS_FAILURE);
        }
        source = inner.source();
    }
    None
}

fn io_error_kind(error: &reqwest::Error) -> Option<std::io::ErrorKind> {
    let mut source = std::error::Error::source(error);
    while let Some(inner) = source {
        if let Some(io) = inner.downcast_ref::<std::io::Error>() {
            return Some(io.kind());
        }
        source = inner.source();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        let cases = [
            (404, BridgeErrorCode::BridgeEndpointNotFound),
            (405, BridgeErrorCode::BridgeMethodNotConfigured),
            (502, BridgeErrorCode::BridgeEndpointUnavailable),
            (503, BridgeErrorCode::BridgeEndpointUnavailable),
            (418, BridgeErrorCode::UnknownRequestError),
        ];
        for (status, expected) in cases {
            let error = classify_response("https://bridge.test/api", status, "nope");
            assert_eq!(error.code, expected, "status {status}");
            assert_eq!(error.http_status, Some(status));
        }
    }

    #[test]
    fn tunnel_pages_are_recognized() {
        let error = classify_response("https://demo.loca.lt/api", 404, "<html>Tunnel demo not found</html>");
        assert_eq!(error.code, BridgeErrorCode::TunnelNotFound);
    }

    #[test]
    fn remote_declared_errors_pass_through() {
        let body = r#"{"code":"WORKFLOW_NOT_FOUND","message":"no such workflow","data":{"workflowId":"wf"}}"#;
        let error = classify_response("https://bridge.test/api", 400, body);
        assert_eq!(error.code, BridgeErrorCode::Remote("WORKFLOW_NOT_FOUND".into()));
        assert_eq!(error.message, "no such workflow");
        assert_eq!(error.data.as_ref().and_then(|d| d.get("workflowId")).and_then(|v| v.as_str()), Some("wf"));
    }

    #[test]
    fn audit_rendering_is_structured() {
        let error = BridgeError::new(BridgeErrorCode::BridgeRequestTimeout, "deadline elapsed").with_status(408);
        let value = error.to_audit_value();
        assert_eq!(value["code"], "BRIDGE_REQUEST_TIMEOUT");
        assert_eq!(value["httpStatus"], 408);
    }

    #[test]
    fn codes_render_stable_names() {
        assert_eq!(BridgeErrorCode::InvalidBridgeUrl.as_str(), "INVALID_BRIDGE_URL");
        assert_eq!(BridgeErrorCode::Network("ECONNRESET".into()).as_str(), "ECONNRESET");
        assert_eq!(BridgeErrorCode::UnknownNonRequestError.as_str(), "UNKNOWN_BRIDGE_NON_REQUEST_ERROR");
    }
}
