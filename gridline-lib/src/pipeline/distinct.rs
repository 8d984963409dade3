//! Distinct values per filterable column, for filter option lists.

use std::collections::BTreeMap;
use std::collections::HashSet;

use super::sort::compare_values;
use crate::fingerprint::Fingerprint;
use crate::fingerprint::fingerprint_rows;
use crate::model::ColumnDescriptor;
use crate::model::Row;
use crate::model::Value;

/// Cached distinct values of every filterable column.
///
/// Values are the canonical string encodings used by filtering, ordered the
/// way an ascending sort would order them (so the empty string of a `null`
/// comes last). The cache is rebuilt only when the row content fingerprint
/// changes.
#[derive(Debug, Clone, Default)]
pub struct DistinctValueIndex {
    fingerprint: Option<Fingerprint>,
    values: BTreeMap<String, Vec<String>>,
}

impl DistinctValueIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the distinct values for `rows`, rebuilding if content changed.
    pub fn values(&mut self, rows: &[Row], columns: &[ColumnDescriptor]) -> &BTreeMap<String, Vec<String>> {
        let fingerprint = fingerprint_rows(rows);
        if self.fingerprint.as_ref() != Some(&fingerprint) {
            self.values = compute(rows, columns);
            self.fingerprint = Some(fingerprint);
            log::trace!("[distinct] rebuilt for {} rows", rows.len());
        }
        &self.values
    }

    /// Returns the cached values of one column (empty if not built or unknown).
    pub fn get(&self, column: &str) -> &[String] {
        self.values.get(column).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replaces the index with values supplied by a server for `rows`.
    ///
    /// The index stays valid until the row content changes.
    pub fn seed(&mut self, rows: &[Row], values: &BTreeMap<String, Vec<serde_json::Value>>) {
        self.values = values
            .iter()
            .map(|(column, items)| {
                let mut seen = HashSet::new();
                let encoded: Vec<String> = items
                    .iter()
                    .map(json_to_filter_string)
                    .filter(|s| seen.insert(s.clone()))
                    .collect();
                (column.clone(), encoded)
            })
            .collect();
        self.fingerprint = Some(fingerprint_rows(rows));
    }

    /// Forces a rebuild on the next call to [`values`](Self::values).
    pub fn invalidate(&mut self) {
        self.fingerprint = None;
    }
}

fn compute(rows: &[Row], columns: &[ColumnDescriptor]) -> BTreeMap<String, Vec<String>> {
    columns
        .iter()
        .filter(|c| c.filterable)
        .map(|column| {
            let mut seen = HashSet::new();
            let mut unique: Vec<&Value> = rows
                .iter()
                .map(|row| row.value(&column.key))
                .filter(|v| seen.insert(v.to_filter_string()))
                .collect();
            unique.sort_by(|a, b| compare_values(a, b, column.column_type));
            let encoded: Vec<String> = unique.into_iter().map(Value::to_filter_string).collect();
            (column.key.clone(), encoded)
        })
        .collect()
}

fn json_to_filter_string(value: &serde_json::Value) -> String {
    match serde_json::from_value::<Value>(value.clone()) {
        Ok(v) => v.to_filter_string(),
        Err(_) => value.to_string(),
    }
}
