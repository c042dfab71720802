//! Retry policy for bridge requests.
//!
//! Only a fixed allow-list of transient HTTP statuses and network failure
//! classes is retried; everything else surfaces immediately. Backoff is
//! exponential (`2^attempt` seconds) and sleeps are local to the request
//! future, so unrelated in-flight requests are never blocked.

use std::time::Duration;

use tracing::debug;

use crate::error::{BridgeError, BridgeErrorCode};

/// HTTP statuses eligible for retry.
pub const RETRYABLE_STATUSES: [u16; 8] = [408, 429, 500, 503, 504, 521, 522, 524];

/// Passthrough network codes eligible for retry.
pub const RETRYABLE_NETWORK_CODES: [&str; 6] = [
    "ENOTFOUND",
    "ECONNREFUSED",
    "ECONNRESET",
    "ETIMEDOUT",
    "EHOSTUNREACH",
    "ENETUNREACH",
];

/// Attempt ceiling and backoff schedule for one logical request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub retries_limit: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { retries_limit: 3 }
    }
}

impl RetryPolicy {
    pub fn new(retries_limit: u32) -> Self {
        Self {
            retries_limit: retries_limit.max(1),
        }
    }

    /// Delay before the attempt following `attempt` (1-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        Duration::from_secs(2u64.saturating_pow(attempt))
    }
}

/// Whether a classified failure is eligible for another attempt.
pub fn is_retryable(error: &BridgeError) -> bool {
    if let Some(status) = error.http_status
        && RETRYABLE_STATUSES.contains(&status)
    {
        return true;
    }
    match &error.code {
        BridgeErrorCode::BridgeRequestTimeout => true,
        BridgeErrorCode::Network(code) => RETRYABLE_NETWORK_CODES.contains(&code.as_str()),
        _ => false,
    }
}

/// Drives `operation` until it succeeds, fails non-retryably, or the attempt
/// ceiling is reached; exhaustion surfaces the last classified error.
pub async fn run_with_retry<T, F, Fut>(policy: RetryPolicy, mut operation: F) -> Result<T, BridgeError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, BridgeError>>,
{
    let mut attempt = 1;
    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) if attempt < policy.retries_limit && is_retryable(&error) => {
                let delay = policy.backoff_delay(attempt);
                debug!(attempt, delay_secs = delay.as_secs(), code = error.code.as_str(), "retrying bridge request");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn status_error(status: u16) -> BridgeError {
        BridgeError::new(BridgeErrorCode::UnknownRequestError, "boom").with_status(status)
    }

    #[test]
    fn allow_listed_statuses_are_retryable() {
        for status in RETRYABLE_STATUSES {
            assert!(is_retryable(&status_error(status)), "status {status}");
        }
        assert!(!is_retryable(&status_error(403)));
        assert!(!is_retryable(&status_error(404)));
    }

    #[test]
    fn network_classes_are_retryable() {
        assert!(is_retryable(&BridgeError::new(BridgeErrorCode::Network("ECONNRESET".into()), "reset")));
        assert!(is_retryable(&BridgeError::new(BridgeErrorCode::BridgeRequestTimeout, "deadline")));
        assert!(!is_retryable(&BridgeError::new(BridgeErrorCode::InvalidBridgeUrl, "no url")));
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_delay(1), Duration::from_secs(2));
        assert_eq!(policy.backoff_delay(2), Duration::from_secs(4));
        assert_eq!(policy.backoff_delay(3), Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn retryable_failure_uses_all_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = run_with_retry(RetryPolicy::new(3), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(status_error(503)) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_failure_is_attempted_once() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = run_with_retry(RetryPolicy::new(3), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(status_error(403)) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = run_with_retry(RetryPolicy::new(3), |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 3 {
                    Err(status_error(429))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result.expect("third attempt succeeds"), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
