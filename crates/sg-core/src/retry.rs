//! Bounded retry for remote calls
//!
//! Only timeouts and upstream failures are retried.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::classify::{ClassifiedError, DomainErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: u32,
    /// Fixed pause between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Single attempt, no retries
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn should_retry(&self, kind: DomainErrorKind) -> bool {
        matches!(kind, DomainErrorKind::Timeout | DomainErrorKind::UpstreamApi)
    }

    /// Run `call` until it succeeds, fails with a non-retryable kind, or the
    /// retry budget is spent
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, ClassifiedError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ClassifiedError>>,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_retries && self.should_retry(e.kind()) => {
                    attempt += 1;
                    warn!(
                        operation = operation,
                        attempt = attempt,
                        max_retries = self.max_retries,
                        kind = e.kind().as_str(),
                        "Retrying remote call"
                    );
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_secs(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    async fn count_attempts(policy: RetryPolicy, error: ClassifiedError) -> u32 {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = policy
            .run("testing", || {
                calls.fetch_add(1, Ordering::SeqCst);
                let error = error.clone();
                async move { Err(error) }
            })
            .await;
        assert!(result.is_err());
        calls.load(Ordering::SeqCst)
    }

    #[tokio::test]
    async fn test_retries_timeouts_and_upstream() {
        let policy = RetryPolicy::new(2, Duration::ZERO);
        assert_eq!(count_attempts(policy, ClassifiedError::timeout("t")).await, 3);
        assert_eq!(count_attempts(policy, ClassifiedError::upstream("u")).await, 3);
    }

    #[tokio::test]
    async fn test_never_retries_authentication_or_internal() {
        let policy = RetryPolicy::new(2, Duration::ZERO);
        assert_eq!(count_attempts(policy, ClassifiedError::authentication("a")).await, 1);
        assert_eq!(count_attempts(policy, ClassifiedError::internal("i")).await, 1);
    }

    #[tokio::test]
    async fn test_stops_on_success() {
        let calls = AtomicU32::new(0);
        let result = RetryPolicy::new(5, Duration::ZERO)
            .run("testing", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(ClassifiedError::timeout("slow"))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_none_is_single_attempt() {
        assert_eq!(count_attempts(RetryPolicy::none(), ClassifiedError::timeout("t")).await, 1);
    }
}
