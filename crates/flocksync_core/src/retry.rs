//! Retry with exponential backoff.

use crate::error::DataError;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Number of retries after the initial attempt. Zero means try once.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after each failed attempt.
    pub backoff_multiplier: f64,
    /// Upper bound on any single backoff delay.
    pub max_delay: Duration,
}

impl RetryConfig {
    /// Creates a retry configuration with the given retry count and the
    /// default delay curve.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::from_millis(1000),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(30),
        }
    }

    /// A configuration that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            max_delay: Duration::ZERO,
        }
    }

    /// Sets the delay before the first retry.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the backoff multiplier.
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Sets the delay cap.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Delay to wait after `failures` attempts have failed (0-indexed):
    /// `initial_delay * multiplier^failures`, capped at `max_delay`.
    ///
    /// No jitter: backoff is deterministic.
    pub fn delay_after_failure(&self, failures: u32) -> Duration {
        let raw = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(failures as i32);
        Duration::from_secs_f64(raw.min(self.max_delay.as_secs_f64()))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Runs `operation` with exponential backoff between failed attempts.
///
/// After a failure the error is offered to `should_retry`; if it declines,
/// or the retry budget is spent, the last-seen error is returned. The wait
/// between attempts is a plain `tokio::time::sleep`, so dropping the
/// returned future cancels the loop at the next suspension point.
pub async fn execute_with_backoff<T, F, Fut, P>(
    config: &RetryConfig,
    should_retry: P,
    mut operation: F,
) -> Result<T, DataError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DataError>>,
    P: Fn(&DataError) -> bool,
{
    let mut attempt: u32 = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if !should_retry(&error) || attempt >= config.max_retries {
                    return Err(error);
                }
                let delay = config.delay_after_failure(attempt);
                debug!(
                    attempt = attempt + 1,
                    max_retries = config.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    %error,
                    "backing off before retry"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
