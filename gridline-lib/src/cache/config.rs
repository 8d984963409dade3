//! Cache configuration

use std::time::Duration;

/// Default time-to-live for cached remote responses.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Configuration for the response cache TTL (time-to-live).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use gridline_lib::cache::CacheConfig;
///
/// let config = CacheConfig::default().with_ttl(Duration::from_secs(60));
/// assert_eq!(config.ttl, Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a fetched response is served from cache.
    ///
    /// Default: 5 minutes
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl: DEFAULT_TTL }
    }
}

impl CacheConfig {
    /// Creates a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Creates a config with no caching (zero TTL).
    pub fn no_cache() -> Self {
        Self { ttl: Duration::ZERO }
    }
}
