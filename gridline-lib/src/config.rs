//! Table configuration

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::cache::CacheConfig;
use crate::error::ConfigError;
use crate::model::ColumnDescriptor;
use crate::pipeline::page::DEFAULT_MAX_VISIBLE_PAGES;
use crate::pipeline::page::DEFAULT_PER_PAGE;
use crate::retry::RetryConfig;

/// Everything a [`DataTable`](crate::DataTable) needs to know up front.
///
/// Deserializes from camelCase JSON; every field is optional.
///
/// # Example
///
/// ```
/// use gridline_lib::config::TableConfig;
///
/// let config = TableConfig::from_json_str(r#"{
///     "columns": [
///         {"key": "name", "label": "Name"},
///         {"key": "age", "label": "Age", "type": "number"}
///     ],
///     "perPage": 25,
///     "rowKey": "name"
/// }"#).unwrap();
///
/// assert_eq!(config.per_page, 25);
/// assert_eq!(config.debounce_ms, 300);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableConfig {
    /// Column descriptors, in display order.
    pub columns: Vec<ColumnDescriptor>,
    /// Rows per page.
    pub per_page: usize,
    /// Width of the page navigation window.
    pub max_visible_pages: usize,
    /// Search debounce delay in milliseconds.
    pub debounce_ms: u64,
    /// Column holding a stable row identity, used for selection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_key: Option<String>,
    /// Columns consulted by search. `None` means every column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub searchable_columns: Option<Vec<String>>,
    /// Remote response cache TTL in seconds.
    pub cache_ttl_secs: u64,
    /// Attempts per remote fetch.
    pub max_retries: u32,
    /// Backoff delay after the first failed attempt, in milliseconds.
    pub initial_retry_delay_ms: u64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            per_page: DEFAULT_PER_PAGE,
            max_visible_pages: DEFAULT_MAX_VISIBLE_PAGES,
            debounce_ms: 300,
            row_key: None,
            searchable_columns: None,
            cache_ttl_secs: 300,
            max_retries: 3,
            initial_retry_delay_ms: 1000,
        }
    }
}

impl TableConfig {
    /// Creates a config for the given columns with default settings.
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            columns,
            ..Default::default()
        }
    }

    /// Parses and validates a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        log::debug!("[config] loaded {}", path.display());
        Self::from_json_str(&text)
    }

    /// Checks the settings against each other.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.per_page == 0 {
            return Err(ConfigError::invalid("perPage", "must be at least 1"));
        }
        if self.max_visible_pages == 0 {
            return Err(ConfigError::invalid("maxVisiblePages", "must be at least 1"));
        }

        let mut keys = HashSet::new();
        for column in &self.columns {
            if !keys.insert(column.key.as_str()) {
                return Err(ConfigError::invalid("columns", format!("duplicate column key '{}'", column.key)));
            }
        }

        if let Some(row_key) = &self.row_key {
            if !keys.contains(row_key.as_str()) {
                return Err(ConfigError::invalid("rowKey", format!("'{}' is not a declared column", row_key)));
            }
        }
        for column in self.searchable_columns.iter().flatten() {
            if !keys.contains(column.as_str()) {
                return Err(ConfigError::invalid(
                    "searchableColumns",
                    format!("'{}' is not a declared column", column),
                ));
            }
        }
        Ok(())
    }

    /// Columns consulted by search.
    pub fn searchable(&self) -> Vec<String> {
        match &self.searchable_columns {
            Some(columns) => columns.clone(),
            None => self.columns.iter().map(|c| c.key.clone()).collect(),
        }
    }

    /// The search debounce delay.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Cache settings for a remote source.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::default().with_ttl(Duration::from_secs(self.cache_ttl_secs))
    }

    /// Retry settings for a remote source.
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::default()
            .max_retries(self.max_retries)
            .initial_delay(Duration::from_millis(self.initial_retry_delay_ms))
    }

    /// Sets the rows per page.
    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page;
        self
    }

    /// Sets the page navigation window width.
    pub fn with_max_visible_pages(mut self, max: usize) -> Self {
        self.max_visible_pages = max;
        self
    }

    /// Sets the search debounce delay.
    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.debounce_ms = delay.as_millis() as u64;
        self
    }

    /// Sets the row identity column.
    pub fn with_row_key(mut self, key: impl Into<String>) -> Self {
        self.row_key = Some(key.into());
        self
    }

    /// Restricts search to the given columns.
    pub fn with_searchable_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.searchable_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the remote cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_secs = ttl.as_secs();
        self
    }

    /// Sets the attempts per remote fetch.
    pub fn with_max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Sets the initial backoff delay.
    pub fn with_initial_retry_delay(mut self, delay: Duration) -> Self {
        self.initial_retry_delay_ms = delay.as_millis() as u64;
        self
    }
}
