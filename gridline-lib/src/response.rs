//! Fetch responses tagged with where they came from

use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;

use crate::cache::CacheEntry;

/// A fetched value plus how the response cache was involved.
///
/// ```ignore
/// let response = remote.fetch_data(&request).await?;
/// if response.is_cached() {
///     log::debug!("page fetched at {:?}", response.fetched_at());
/// }
/// let result = response.into_inner();
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    data: T,
    /// Cache involvement for this response.
    pub cache: CacheStatus,
}

impl<T> Response<T> {
    /// Fetched with caching disabled; nothing was stored.
    pub fn uncached(data: T) -> Self {
        Self {
            data,
            cache: CacheStatus::Disabled,
        }
    }

    /// Freshly fetched and stored as `entry`.
    pub fn stored(entry: CacheEntry<T>, ttl: Duration) -> Self {
        let expires_at = entry.expires_at(ttl);
        Self {
            cache: CacheStatus::Miss {
                fetched_at: entry.fetched_at,
                expires_at,
            },
            data: entry.response,
        }
    }

    /// Served from the still-fresh `entry`.
    pub fn from_cache(entry: CacheEntry<T>, ttl: Duration) -> Self {
        let expires_at = entry.expires_at(ttl);
        Self {
            cache: CacheStatus::Hit {
                fetched_at: entry.fetched_at,
                expires_at,
            },
            data: entry.response,
        }
    }

    /// `true` when served from the cache without a request.
    pub fn is_cached(&self) -> bool {
        matches!(self.cache, CacheStatus::Hit { .. })
    }

    /// When the data was fetched from the server, if it went through the cache.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        match self.cache {
            CacheStatus::Disabled => None,
            CacheStatus::Miss { fetched_at, .. } | CacheStatus::Hit { fetched_at, .. } => Some(fetched_at),
        }
    }

    /// When the cache stops serving this data.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match self.cache {
            CacheStatus::Disabled => None,
            CacheStatus::Miss { expires_at, .. } | CacheStatus::Hit { expires_at, .. } => Some(expires_at),
        }
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn into_inner(self) -> T {
        self.data
    }
}

/// How the response cache took part in a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Zero TTL: fetched and not stored.
    Disabled,
    /// Fetched from the server and stored.
    Miss {
        fetched_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    },
    /// Served from a fresh entry.
    Hit {
        fetched_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    },
}
