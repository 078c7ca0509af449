//! Repository configuration.

use flocksync_core::RetryConfig;

/// Configuration for a [`crate::SyncRepository`].
#[derive(Debug, Clone)]
pub struct RepoConfig {
    /// Retry policy applied to remote fetches and pushes.
    pub retry: RetryConfig,
    /// Buffer size of the per-subscriber stream channels.
    pub channel_capacity: usize,
    /// Buffer size of the change-event bus.
    pub event_capacity: usize,
}

impl RepoConfig {
    /// Creates a configuration with the default retry policy.
    pub fn new() -> Self {
        Self {
            retry: RetryConfig::default(),
            channel_capacity: 16,
            event_capacity: 64,
        }
    }

    /// Sets the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the stream channel capacity.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Sets the event bus capacity.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn builder() {
        let config = RepoConfig::new()
            .with_retry(RetryConfig::no_retry())
            .with_channel_capacity(4)
            .with_event_capacity(8);
        assert_eq!(config.retry.max_retries, 0);
        assert_eq!(config.channel_capacity, 4);
        assert_eq!(config.event_capacity, 8);
    }

    #[test]
    fn default_retry_curve() {
        let config = RepoConfig::default();
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.initial_delay, Duration::from_millis(1000));
    }
}
