//! In-memory cache implementation using DashMap

use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use dashmap::DashMap;

use super::CacheConfig;
use super::CacheEntry;

/// An in-memory TTL cache backed by a concurrent hash map.
///
/// Data is lost when the process exits.
///
/// # Example
///
/// ```
/// use gridline_lib::cache::{CacheConfig, InMemoryCache};
///
/// let cache: InMemoryCache<String> = InMemoryCache::new(CacheConfig::default());
/// cache.set("key", "value".to_string());
/// assert_eq!(cache.get("key").map(|e| e.response), Some("value".to_string()));
/// ```
#[derive(Debug)]
pub struct InMemoryCache<T> {
    store: DashMap<String, CacheEntry<T>>,
    ttl: Duration,
}

impl<T: Clone> InMemoryCache<T> {
    /// Creates a new empty cache.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            store: DashMap::new(),
            ttl: config.ttl,
        }
    }

    /// The configured TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the number of entries in the cache (including expired ones).
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Retrieves a fresh entry, dropping it if it has gone stale.
    pub fn get(&self, key: &str) -> Option<CacheEntry<T>> {
        self.get_at(key, Utc::now())
    }

    /// Like [`get`](Self::get), judged at `now`.
    pub fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<CacheEntry<T>> {
        let entry = self.store.get(key)?;

        if entry.is_fresh(self.ttl, now) {
            Some(entry.value().clone())
        } else {
            drop(entry);
            self.store.remove(key);
            None
        }
    }

    /// Stores a response fetched now and returns the stored entry.
    pub fn set(&self, key: &str, response: T) -> CacheEntry<T> {
        let entry = CacheEntry::new(key, response);
        self.insert(entry.clone());
        entry
    }

    /// Stores a prepared entry.
    pub fn insert(&self, entry: CacheEntry<T>) {
        self.store.insert(entry.key.clone(), entry);
    }

    /// Clears all entries.
    pub fn clear(&self) {
        self.store.clear();
    }

    /// Removes all stale entries. Returns the number removed.
    pub fn gc(&self) -> usize {
        self.gc_at(Utc::now())
    }

    /// Like [`gc`](Self::gc), judged at `now`.
    pub fn gc_at(&self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        self.store.retain(|_, entry| {
            if entry.is_fresh(self.ttl, now) {
                true
            } else {
                removed += 1;
                false
            }
        });
        removed
    }
}
