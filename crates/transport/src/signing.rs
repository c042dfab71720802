//! Request signing for the bridge protocol.
//!
//! Each request carries a `t=<unixMillis>,v1=<hex>` header where the hex part
//! is `HMAC-SHA256(secret, "<unixMillis>.<jsonBody>")`. The receiving runtime
//! recomputes the digest to authenticate the control plane and reject stale
//! replays.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the request signature.
pub const SIGNATURE_HEADER: &str = "novu-signature";

/// Computes the hex HMAC-SHA256 of `"<timestamp_ms>.<body>"` keyed by the
/// environment secret.
pub fn sign_payload(secret: &str, timestamp_ms: i64, body: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(timestamp_ms.to_string().as_bytes());
    mac.update(b".");
    mac.update(body.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Renders the full signature header value.
pub fn signature_header(secret: &str, timestamp_ms: i64, body: &str) -> String {
    format!("t={},v1={}", timestamp_ms, sign_payload(secret, timestamp_ms, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_deterministic() {
        let first = sign_payload("whsec_test", 1_700_000_000_000, r#"{"payload":{}}"#);
        let second = sign_payload("whsec_test", 1_700_000_000_000, r#"{"payload":{}}"#);
        assert_eq!(first, second);
        assert_eq!(first.len(), 64, "hex-encoded sha256 digest");
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn signature_varies_with_inputs() {
        let base = sign_payload("whsec_test", 1_700_000_000_000, "{}");
        assert_ne!(base, sign_payload("whsec_other", 1_700_000_000_000, "{}"));
        assert_ne!(base, sign_payload("whsec_test", 1_700_000_000_001, "{}"));
        assert_ne!(base, sign_payload("whsec_test", 1_700_000_000_000, r#"{"a":1}"#));
    }

    #[test]
    fn header_renders_timestamp_and_digest() {
        let header = signature_header("whsec_test", 42, "{}");
        let digest = sign_payload("whsec_test", 42, "{}");
        assert_eq!(header, format!("t=42,v1={digest}"));
    }

    #[test]
    fn digest_matches_known_vector() {
        // HMAC-SHA256("secret", "0.{}")
        assert_eq!(
            sign_payload("secret", 0, "{}"),
            "4bbe8d39de1ffea42cffafb4727e02f761bef8ed2886b51575ce417d542e918f"
        );
    }
}
