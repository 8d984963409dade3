//! Retry configuration for remote fetches.

use std::time::Duration;

/// Configuration for automatic retry behavior.
///
/// `max_retries` is the total number of attempts a fetch may make. The delay
/// after failed attempt `k` (0-indexed) is `initial_delay * 2^k`, capped at
/// `max_delay`.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use gridline_lib::retry::RetryConfig;
///
/// let config = RetryConfig::default();
/// assert_eq!(config.delay_for(0), Duration::from_secs(1));
/// assert_eq!(config.delay_for(1), Duration::from_secs(2));
///
/// let custom = RetryConfig::default()
///     .max_retries(5)
///     .initial_delay(Duration::from_millis(500))
///     .max_delay(Duration::from_secs(60));
///
/// let no_retry = RetryConfig::no_retry();
/// assert_eq!(no_retry.max_retries, 1);
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts.
    pub max_retries: u32,
    /// Delay after the first failed attempt (doubles each attempt).
    pub initial_delay: Duration,
    /// Maximum delay between attempts.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// Creates a config that makes a single attempt.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 1,
            ..Default::default()
        }
    }

    /// Sets the maximum number of attempts.
    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Sets the initial delay between attempts.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay between attempts.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Attempts actually made; a zero setting still makes one.
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Backoff delay after failed attempt `attempt` (0-indexed).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}
