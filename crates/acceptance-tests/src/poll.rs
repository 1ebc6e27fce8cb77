//! Fixed-interval polling helpers for timing-dependent checks.
//!
//! This module provides the polling loop used by the env-var probe and the
//! application fixtures: a condition is evaluated at a fixed interval until
//! it holds or a wall-clock timeout elapses. There is deliberately no
//! backoff; the cadence is part of the probe contract.

use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::sleep;

/// Polling errors.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("condition not met within {waited:?}")]
    Timeout { waited: Duration },
}

/// Interval and total window for one polling loop.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Delay between consecutive evaluations.
    pub interval: Duration,

    /// Total wall-clock window before the loop gives up.
    pub timeout: Duration,
}

impl PollConfig {
    pub const fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

/// Evaluate an async condition at a fixed interval until it holds.
///
/// The first evaluation happens immediately. Returns `PollError::Timeout`
/// once the window elapses without the condition holding.
pub async fn poll_until<F, Fut>(config: PollConfig, mut condition: F) -> Result<(), PollError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    poll_for(config, || {
        let fut = condition();
        async move { fut.await.then_some(()) }
    })
    .await
}

/// Evaluate an async attempt at a fixed interval until it produces a value.
///
/// Each attempt returns `Some(value)` to finish the loop or `None` to retry
/// after the configured interval. Returns `PollError::Timeout` once the
/// window elapses without a value.
pub async fn poll_for<T, F, Fut>(config: PollConfig, mut attempt: F) -> Result<T, PollError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let start = Instant::now();

    loop {
        if let Some(value) = attempt().await {
            return Ok(value);
        }

        let elapsed = start.elapsed();
        if elapsed >= config.timeout {
            return Err(PollError::Timeout {
                waited: config.timeout,
            });
        }

        // Cap the sleep at the remaining window
        let remaining = config.timeout.saturating_sub(elapsed);
        sleep(config.interval.min(remaining)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: PollConfig = PollConfig::new(Duration::from_millis(10), Duration::from_millis(200));

    #[tokio::test]
    async fn test_poll_until_succeeds_immediately() {
        let result = poll_until(FAST, || async { true }).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_poll_until_succeeds_after_retry() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_clone = attempts.clone();

        let result = poll_until(FAST, move || {
            let attempts = attempts_clone.clone();
            async move {
                let count = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                count >= 3
            }
        })
        .await;

        assert!(result.is_ok());
        assert!(attempts.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn test_poll_until_fails_on_timeout() {
        let err = poll_until(FAST, || async { false })
            .await
            .expect_err("should time out");
        assert!(err.to_string().contains("not met within"));
    }

    #[tokio::test]
    async fn test_poll_for_returns_first_value() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_clone = attempts.clone();

        let value = poll_for(FAST, move || {
            let attempts = attempts_clone.clone();
            async move {
                let count = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                (count >= 2).then_some(count)
            }
        })
        .await
        .expect("should produce a value");

        assert_eq!(value, 2);
    }

    #[tokio::test]
    async fn test_poll_for_times_out_without_value() {
        let result: Result<(), _> = poll_for(FAST, || async { None }).await;
        assert!(matches!(result, Err(PollError::Timeout { .. })));
    }
}
