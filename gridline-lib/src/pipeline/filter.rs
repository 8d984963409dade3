//! Per-column allow-list filtering.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::collections::HashSet;

use crate::model::ColumnDescriptor;
use crate::model::Row;
use crate::model::find_column;

/// Allowed values per column.
///
/// Every filterable column has an entry; an empty allow-list means the column
/// does not restrict anything. Values are compared against the canonical
/// string encoding of a cell (see [`Value::to_filter_string`]), so `null`
/// cells are matched by `""`.
///
/// [`Value::to_filter_string`]: crate::model::Value::to_filter_string
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    filters: BTreeMap<String, Vec<String>>,
}

impl FilterState {
    /// Creates a state with an empty allow-list for every filterable column.
    pub fn for_columns(columns: &[ColumnDescriptor]) -> Self {
        Self {
            filters: columns
                .iter()
                .filter(|c| c.filterable)
                .map(|c| (c.key.clone(), Vec::new()))
                .collect(),
        }
    }

    /// Replaces the allow-list of a column.
    ///
    /// Duplicates are dropped, first occurrence wins. Returns `false` (and
    /// changes nothing) if the column is unknown or not filterable.
    pub fn set<I, S>(&mut self, column: &str, values: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let Some(allowed) = self.filters.get_mut(column) else {
            log::debug!("[filter] ignoring filter on unknown column '{}'", column);
            return false;
        };
        allowed.clear();
        for value in values {
            let value = value.into();
            if !allowed.contains(&value) {
                allowed.push(value);
            }
        }
        true
    }

    /// Adds a value to a column's allow-list, or removes it if present.
    ///
    /// Returns `false` if the column is unknown or not filterable.
    pub fn toggle(&mut self, column: &str, value: impl Into<String>) -> bool {
        let Some(allowed) = self.filters.get_mut(column) else {
            log::debug!("[filter] ignoring toggle on unknown column '{}'", column);
            return false;
        };
        let value = value.into();
        if let Some(pos) = allowed.iter().position(|v| *v == value) {
            allowed.remove(pos);
        } else {
            allowed.push(value);
        }
        true
    }

    /// Returns the allow-list of a column (empty if unrestricted or unknown).
    pub fn allowed(&self, column: &str) -> &[String] {
        self.filters.get(column).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Clears every allow-list.
    pub fn reset(&mut self) {
        for allowed in self.filters.values_mut() {
            allowed.clear();
        }
    }

    /// Returns `true` if any column restricts rows.
    pub fn is_active(&self) -> bool {
        self.filters.values().any(|v| !v.is_empty())
    }

    /// Returns the number of columns with a non-empty allow-list.
    pub fn active_count(&self) -> usize {
        self.filters.values().filter(|v| !v.is_empty()).count()
    }

    /// Iterates over `(column, allow-list)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.filters.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Returns the full map, as sent in a remote request body.
    pub fn as_map(&self) -> &BTreeMap<String, Vec<String>> {
        &self.filters
    }
}

/// Keeps the rows whose cells appear in every active allow-list.
///
/// Non-filterable columns are skipped whatever their allow-list holds. With
/// no active restriction the input is returned borrowed, untouched. Relative
/// order is preserved.
pub fn apply<'a>(rows: &'a [Row], state: &FilterState, columns: &[ColumnDescriptor]) -> Cow<'a, [Row]> {
    let active: Vec<(&str, HashSet<&str>)> = state
        .iter()
        .filter(|(_, allowed)| !allowed.is_empty())
        .filter(|(key, _)| find_column(columns, key).is_some_and(|c| c.filterable))
        .map(|(key, allowed)| (key, allowed.iter().map(String::as_str).collect()))
        .collect();

    if active.is_empty() {
        return Cow::Borrowed(rows);
    }

    let filtered: Vec<Row> = rows
        .iter()
        .filter(|row| {
            active
                .iter()
                .all(|(key, allowed)| allowed.contains(row.value(key).to_filter_string().as_str()))
        })
        .cloned()
        .collect();

    log::trace!("[filter] {} -> {} rows", rows.len(), filtered.len());
    Cow::Owned(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;

    fn columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::new("name", "Name"),
            ColumnDescriptor::new("team", "Team"),
            ColumnDescriptor::new("id", "ID").not_filterable(),
        ]
    }

    fn rows() -> Vec<Row> {
        vec![
            Row::new().set("id", 1i64).set("name", "a").set("team", "core"),
            Row::new().set("id", 2i64).set("name", "b").set("team", "web"),
            Row::new().set("id", 3i64).set("name", "c").set("team", Value::Null),
            Row::new().set("id", 4i64).set("name", "d").set("team", "core"),
        ]
    }

    fn names(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(|r| r.get_string("name").unwrap().unwrap()).collect()
    }

    #[test]
    fn test_every_filterable_column_initialized() {
        let state = FilterState::for_columns(&columns());
        let keys: Vec<_> = state.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["name", "team"]);
        assert!(!state.is_active());
    }

    #[test]
    fn test_no_active_filter_borrows_input() {
        let rows = rows();
        let state = FilterState::for_columns(&columns());
        assert!(matches!(apply(&rows, &state, &columns()), Cow::Borrowed(_)));
    }

    #[test]
    fn test_allow_list_keeps_order() {
        let rows = rows();
        let mut state = FilterState::for_columns(&columns());
        state.set("team", ["core"]);
        let out = apply(&rows, &state, &columns());
        assert_eq!(names(&out), vec!["a", "d"]);
    }

    #[test]
    fn test_null_matches_empty_string() {
        let rows = rows();
        let mut state = FilterState::for_columns(&columns());
        state.set("team", ["", "web"]);
        let out = apply(&rows, &state, &columns());
        assert_eq!(names(&out), vec!["b", "c"]);
    }

    #[test]
    fn test_constraints_are_conjunctive() {
        let rows = rows();
        let mut state = FilterState::for_columns(&columns());
        state.set("team", ["core"]);
        state.set("name", ["d", "b"]);
        let out = apply(&rows, &state, &columns());
        assert_eq!(names(&out), vec!["d"]);
    }

    #[test]
    fn test_non_filterable_and_unknown_columns_are_ignored() {
        let mut state = FilterState::for_columns(&columns());
        assert!(!state.set("id", ["1"]));
        assert!(!state.set("nope", ["x"]));
        assert!(!state.is_active());
    }

    #[test]
    fn test_toggle_and_reset() {
        let mut state = FilterState::for_columns(&columns());
        state.toggle("team", "core");
        state.toggle("team", "web");
        state.toggle("team", "core");
        assert_eq!(state.allowed("team"), ["web".to_string()]);
        assert_eq!(state.active_count(), 1);

        state.reset();
        assert_eq!(state.active_count(), 0);
        assert_eq!(state.iter().count(), 2);
    }

    #[test]
    fn test_set_dedupes() {
        let mut state = FilterState::for_columns(&columns());
        state.set("team", ["web", "core", "web"]);
        assert_eq!(state.allowed("team"), ["web".to_string(), "core".to_string()]);
    }
}
