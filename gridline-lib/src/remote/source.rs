//! Cached, retrying remote fetch.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use tokio_util::sync::CancellationToken;

use super::FetchRequest;
use super::FetchResult;
use super::HttpTransport;
use super::Transport;
use crate::cache::CacheConfig;
use crate::cache::InMemoryCache;
use crate::error::FetchError;
use crate::model::Row;
use crate::response::Response;
use crate::retry::RetryConfig;

/// Observable outcome of the latest fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchState {
    /// Rows of the last successful fetch; empty after a failure.
    pub rows: Vec<Row>,
    /// Total rows reported by the server; zero after a failure.
    pub total: usize,
    /// Distinct values reported by the server.
    pub distinct_values: BTreeMap<String, Vec<serde_json::Value>>,
    /// `true` while a network fetch is in flight.
    pub loading: bool,
    /// Message of the last terminal failure.
    pub error: Option<String>,
}

/// Fronts a remote endpoint with a TTL cache and retrying fetch.
///
/// # Example
///
/// ```ignore
/// let remote = RemoteDataCache::http("https://example.com/api/rows")?
///     .with_cache_config(CacheConfig::default().with_ttl(Duration::from_secs(60)));
///
/// let response = remote.fetch_data(&FetchRequest::new(1, 10)).await?;
/// println!("{} of {}", response.data().rows.len(), response.data().total);
/// ```
pub struct RemoteDataCache {
    transport: Arc<dyn Transport>,
    cache: InMemoryCache<FetchResult>,
    retry: RetryConfig,
    generation: AtomicU64,
    current: Mutex<CancellationToken>,
    state: Mutex<FetchState>,
}

impl std::fmt::Debug for RemoteDataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteDataCache")
            .field("cache", &self.cache)
            .field("retry", &self.retry)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl RemoteDataCache {
    /// Creates a remote source over `transport` with default cache and retry settings.
    pub fn new<T: Transport + 'static>(transport: T) -> Self {
        Self::from_arc(Arc::new(transport))
    }

    /// Creates a remote source over a shared transport.
    pub fn from_arc(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            cache: InMemoryCache::new(CacheConfig::default()),
            retry: RetryConfig::default(),
            generation: AtomicU64::new(0),
            current: Mutex::new(CancellationToken::new()),
            state: Mutex::new(FetchState::default()),
        }
    }

    /// Creates a remote source posting to an HTTP endpoint.
    pub fn http(endpoint: &str) -> Result<Self, FetchError> {
        Ok(Self::new(HttpTransport::new(endpoint)?))
    }

    /// Replaces the cache configuration. Drops anything already cached.
    pub fn with_cache_config(mut self, config: CacheConfig) -> Self {
        self.cache = InMemoryCache::new(config);
        self
    }

    /// Replaces the retry configuration.
    pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// The retry configuration.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Generation of the most recent fetch (0 before any).
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Snapshot of the observable fetch state.
    pub fn state(&self) -> FetchState {
        lock(&self.state).clone()
    }

    /// Number of cached responses, stale ones included.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Drops every cached response.
    pub fn clear_cache(&self) {
        self.cache.clear();
        log::debug!("[remote] cache cleared");
    }

    /// Drops cached responses whose TTL has elapsed. Returns how many were dropped.
    pub fn cleanup_expired_cache(&self) -> usize {
        let removed = self.cache.gc();
        log::debug!("[remote] dropped {} expired entries", removed);
        removed
    }

    /// Fetches rows for `request`, from cache when fresh.
    ///
    /// Starting a fetch supersedes any fetch still in flight: the older call
    /// returns [`FetchError::Superseded`] and never touches the fetch state.
    /// A terminal failure of the latest fetch clears the rows and records the
    /// message in [`FetchState::error`].
    pub async fn fetch_data(&self, request: &FetchRequest) -> Result<Response<FetchResult>, FetchError> {
        let key = request.cache_key()?;
        let (generation, token) = self.begin();

        if let Some(entry) = self.cache.get(&key) {
            log::debug!("[remote] cache hit for generation {} ({})", generation, short(&key));
            self.apply(&entry.response);
            return Ok(Response::from_cache(entry, self.cache.ttl()));
        }

        log::debug!("[remote] cache miss for generation {} ({})", generation, short(&key));
        lock(&self.state).loading = true;

        match self.fetch_with_retry(request, &token).await {
            Ok(result) => {
                let ttl = self.cache.ttl();
                let response = if ttl.is_zero() {
                    Response::uncached(result)
                } else {
                    Response::stored(self.cache.set(&key, result), ttl)
                };
                if !self.is_current(generation) {
                    log::debug!("[remote] discarding response of superseded generation {}", generation);
                    return Err(self.superseded());
                }
                self.apply(response.data());
                Ok(response)
            }
            Err(e) if e.is_superseded() => Err(e),
            Err(_) if !self.is_current(generation) => Err(self.superseded()),
            Err(e) => {
                let mut state = lock(&self.state);
                state.rows.clear();
                state.total = 0;
                state.distinct_values.clear();
                state.loading = false;
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn begin(&self) -> (u64, CancellationToken) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();
        let previous = std::mem::replace(&mut *lock(&self.current), token.clone());
        previous.cancel();
        (generation, token)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation() == generation
    }

    fn superseded(&self) -> FetchError {
        FetchError::Superseded {
            generation: self.generation(),
        }
    }

    fn apply(&self, result: &FetchResult) {
        let mut state = lock(&self.state);
        state.rows = result.rows.clone();
        state.total = result.total;
        state.distinct_values = result.distinct_values.clone();
        state.loading = false;
        state.error = None;
    }

    async fn fetch_with_retry(&self, request: &FetchRequest, token: &CancellationToken) -> Result<FetchResult, FetchError> {
        let attempts = self.retry.attempts();
        let mut attempt = 0;

        loop {
            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => return Err(self.superseded()),
                outcome = self.transport.send(request) => outcome,
            };

            match outcome {
                Ok(response) => return Ok(response.into()),
                Err(e) if e.is_retryable() && attempt + 1 < attempts => {
                    let delay = self.retry.delay_for(attempt);
                    log::debug!("[remote] attempt {}/{} failed: {}; retrying in {:?}", attempt + 1, attempts, e, delay);
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => return Err(self.superseded()),
                        _ = tokio::time::sleep(delay) => {}
                    }
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_retryable() {
                        log::warn!("[remote] giving up after {} attempts: {}", attempt + 1, e);
                    }
                    return Err(e);
                }
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn short(key: &str) -> &str {
    key.get(..12).unwrap_or(key)
}
