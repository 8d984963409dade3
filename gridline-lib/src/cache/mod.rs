//! Response caching layer
//!
//! Holds remote responses keyed by their canonical request key, each stamped
//! with the time it was fetched. Staleness is checked lazily on read; nothing
//! sweeps the cache in the background.

mod config;
mod memory;

pub use config::*;
pub use memory::*;

use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;

/// A cached response and when it was fetched.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// Canonical request key.
    pub key: String,
    /// The cached response.
    pub response: T,
    /// When the response was fetched.
    pub fetched_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// Creates a new entry stamped with the current time.
    pub fn new(key: impl Into<String>, response: T) -> Self {
        Self::at(key, response, Utc::now())
    }

    /// Creates a new entry with an explicit fetch time.
    pub fn at(key: impl Into<String>, response: T, fetched_at: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            response,
            fetched_at,
        }
    }

    /// When this entry stops being served, given `ttl`.
    pub fn expires_at(&self, ttl: Duration) -> DateTime<Utc> {
        self.fetched_at + chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::zero())
    }

    /// Returns `true` while `now - fetched_at < ttl`.
    pub fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now < self.expires_at(ttl)
    }
}
