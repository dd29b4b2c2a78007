//! Retry logic with exponential backoff for peer HTTP calls.
//!
//! Retries only on transient transport errors (connection failures,
//! timeouts). Non-retryable failures — HTTP error statuses, body
//! deserialization — are the caller's concern and are never retried here.
//! The backoff sleep holds no locks.

use std::time::Duration;

/// Bounded retry policy for transient transport failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first (default: 3).
    pub max_attempts: u32,
    /// Delay before the first retry; doubles each attempt (default: 1s).
    pub base_delay: Duration,
    /// Backoff ceiling (default: 10s).
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}

fn is_transient(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect()
}

/// Send an HTTP request with exponential backoff on transient transport
/// errors.
///
/// The closure `f` is called up to `policy.max_attempts` times. Only
/// timeout and connection failures trigger a retry — the caller is
/// responsible for inspecting the response status code.
pub(crate) async fn retry_send<F, Fut>(
    policy: &RetryPolicy,
    f: F,
) -> Result<reqwest::Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut delay = policy.base_delay;
    for attempt in 1..policy.max_attempts {
        match f().await {
            Ok(resp) => return Ok(resp),
            Err(e) if is_transient(&e) => {
                tracing::warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    "peer request failed, retrying in {delay:?}: {e}"
                );
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(policy.max_delay);
            }
            Err(e) => return Err(e),
        }
    }
    // Final attempt — no more retries.
    f().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
        }
    }

    #[tokio::test]
    async fn retry_exhausts_all_attempts_on_transport_failure() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = call_count.clone();

        let policy = fast_policy();
        let result = retry_send(&policy, || {
            let cc = cc.clone();
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                // Request to a guaranteed-closed port → connection refused.
                reqwest::Client::builder()
                    .timeout(Duration::from_millis(50))
                    .build()
                    .unwrap()
                    .get("http://127.0.0.1:1/")
                    .send()
                    .await
            }
        })
        .await;

        assert!(result.is_err(), "request to closed port must fail");
        assert_eq!(
            call_count.load(Ordering::SeqCst),
            policy.max_attempts,
            "should exhaust all attempts"
        );
    }

    #[tokio::test]
    async fn non_transient_errors_are_not_retried() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = call_count.clone();

        let result = retry_send(&fast_policy(), || {
            let cc = cc.clone();
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                // A request builder error is neither a timeout nor a
                // connection failure.
                reqwest::Client::new().get("ftp://not-http").send().await
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }
}
