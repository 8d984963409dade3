//! Request and response bodies.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::error::FetchError;
use crate::fingerprint::canonical_json;
use crate::fingerprint::fingerprint_bytes;
use crate::model::Row;
use crate::pipeline::FilterState;
use crate::pipeline::SortState;

/// Query parameters posted to the remote endpoint.
///
/// # Example
///
/// ```
/// use gridline_lib::remote::FetchRequest;
///
/// let a = FetchRequest::new(1, 10).with_custom("tenant", "x").with_custom("region", "eu");
/// let b = FetchRequest::new(1, 10).with_custom("region", "eu").with_custom("tenant", "x");
/// assert_eq!(a.cache_key().unwrap(), b.cache_key().unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    /// Allowed values per column.
    #[serde(default)]
    pub filters: BTreeMap<String, Vec<String>>,
    /// Free-text query.
    #[serde(default)]
    pub search: String,
    /// Sort column and direction.
    #[serde(default)]
    pub sort: SortState,
    /// 1-based page number.
    pub page: usize,
    /// Rows per page.
    pub per_page: usize,
    /// Caller-supplied extra parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_parameters: Option<serde_json::Map<String, serde_json::Value>>,
}

impl FetchRequest {
    /// Creates a request for one page with no filters, search or sort.
    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            filters: BTreeMap::new(),
            search: String::new(),
            sort: SortState::default(),
            page,
            per_page,
            custom_parameters: None,
        }
    }

    /// Sets the filters from a filter state, dropping empty allow-lists.
    pub fn with_filters(mut self, filters: &FilterState) -> Self {
        self.filters = filters
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(column, values)| (column.to_string(), values.to_vec()))
            .collect();
        self
    }

    /// Sets the search query.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Sets the sort.
    pub fn with_sort(mut self, sort: SortState) -> Self {
        self.sort = sort;
        self
    }

    /// Adds a custom parameter.
    pub fn with_custom(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.custom_parameters
            .get_or_insert_with(serde_json::Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Cache key: SHA-256 of the sorted-key JSON encoding of the request.
    pub fn cache_key(&self) -> Result<String, FetchError> {
        let value = serde_json::to_value(self).map_err(|e| FetchError::parse(e.to_string()))?;
        Ok(fingerprint_bytes(canonical_json(&value).as_bytes()).to_string())
    }
}

/// Response body returned by the remote endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResponse {
    /// Rows of the requested page.
    #[serde(default)]
    pub data: Vec<Row>,
    /// Rows across all pages.
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub page: usize,
    #[serde(default)]
    pub per_page: usize,
    #[serde(default)]
    pub total_pages: usize,
    /// Distinct values per column, for filter option lists.
    #[serde(default)]
    pub distinct_values: BTreeMap<String, Vec<serde_json::Value>>,
}

/// What a fetch hands back to the table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchResult {
    pub rows: Vec<Row>,
    pub total: usize,
    pub distinct_values: BTreeMap<String, Vec<serde_json::Value>>,
}

impl From<FetchResponse> for FetchResult {
    fn from(response: FetchResponse) -> Self {
        Self {
            rows: response.data,
            total: response.total,
            distinct_values: response.distinct_values,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::ColumnDescriptor;

    #[test]
    fn test_request_body_shape() {
        let columns = [ColumnDescriptor::new("team", "Team"), ColumnDescriptor::new("city", "City")];
        let mut filters = FilterState::for_columns(&columns);
        filters.set("team", ["web"]);
        let request = FetchRequest::new(2, 25)
            .with_filters(&filters)
            .with_search("ada")
            .with_sort(SortState {
                column: Some("age".into()),
                ascending: false,
            });

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "filters": {"team": ["web"]},
                "search": "ada",
                "sort": {"column": "age", "ascending": false},
                "page": 2,
                "perPage": 25
            })
        );
    }

    #[test]
    fn test_key_ignores_custom_parameter_order() {
        let a = FetchRequest::new(1, 10).with_custom("opts", json!({"b": 1, "a": [2, {"y": 0, "x": 1}]}));
        let b = FetchRequest::new(1, 10).with_custom("opts", json!({"a": [2, {"x": 1, "y": 0}], "b": 1}));
        assert_eq!(a.cache_key().unwrap(), b.cache_key().unwrap());
    }

    #[test]
    fn test_key_differs_by_page() {
        let a = FetchRequest::new(1, 10).cache_key().unwrap();
        let b = FetchRequest::new(2, 10).cache_key().unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_response_defaults_missing_fields() {
        let response: FetchResponse = serde_json::from_value(json!({
            "data": [{"name": "Ada"}],
            "total": 1
        }))
        .unwrap();
        let result = FetchResult::from(response);
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.total, 1);
        assert!(result.distinct_values.is_empty());
    }
}
