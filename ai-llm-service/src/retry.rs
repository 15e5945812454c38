//! Exponential backoff around a single fallible async operation.
//!
//! Attempt `n` (0-based) that fails with a retryable error sleeps
//! `base * 2^n` before the next try. Non-retryable errors and the last
//! attempt's error are returned as-is.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, warn};

use crate::error_handler::{AiLlmError, Result};

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total number of attempts (>= 1).
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay slept after a failed attempt `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Whether a failure of attempt `attempt` (0-based) gets another try.
    pub fn should_retry(&self, err: &AiLlmError, attempt: u32) -> bool {
        err.is_retryable() && attempt + 1 < self.max_attempts
    }

    /// Runs `op` until it succeeds, fails permanently, or attempts run out.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match op(attempt).await {
                Ok(v) => return Ok(v),
                Err(e) if self.should_retry(&e, attempt) => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient LLM failure, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_retryable() {
                        error!(attempts = self.max_attempts, error = %e, "LLM call failed after retries");
                    }
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn delays_double_each_attempt() {
        let p = RetryPolicy::new(3, Duration::from_millis(100));
        assert_eq!(p.delay_for(0), Duration::from_millis(100));
        assert_eq!(p.delay_for(1), Duration::from_millis(200));
        assert_eq!(p.delay_for(2), Duration::from_millis(400));
    }

    #[test]
    fn retry_decision_respects_kind_and_budget() {
        let p = RetryPolicy::new(3, Duration::from_millis(1));
        let timeout = AiLlmError::Timeout(Duration::from_secs(1));
        assert!(p.should_retry(&timeout, 0));
        assert!(p.should_retry(&timeout, 1));
        assert!(!p.should_retry(&timeout, 2));
        let permanent: AiLlmError = crate::error_handler::ConfigError::EmptyModel.into();
        assert!(!p.should_retry(&permanent, 0));
    }

    #[tokio::test]
    async fn stops_after_max_attempts_on_timeouts() {
        let calls = AtomicU32::new(0);
        let p = RetryPolicy::new(3, Duration::from_millis(1));
        let out: Result<()> = p
            .run(|_| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(AiLlmError::Timeout(Duration::from_secs(1)))
            })
            .await;
        assert!(out.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let p = RetryPolicy::new(3, Duration::from_millis(1));
        let out: Result<()> = p
            .run(|_| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(crate::error_handler::ConfigError::EmptyModel.into())
            })
            .await;
        assert!(out.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
