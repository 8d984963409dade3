//! Single-column, type-aware sorting with a content-keyed memo.

use std::borrow::Cow;
use std::cmp::Ordering;

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::fingerprint::Fingerprint;
use crate::fingerprint::fingerprint_rows;
use crate::model::ColumnDescriptor;
use crate::model::ColumnType;
use crate::model::Row;
use crate::model::Value;
use crate::model::find_column;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ascending order (A-Z, 0-9), nulls last.
    Asc,
    /// Descending order (Z-A, 9-0), nulls first.
    Desc,
}

/// The active sort column, if any, and its direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortState {
    pub column: Option<String>,
    pub ascending: bool,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: None,
            ascending: true,
        }
    }
}

impl SortState {
    /// Returns the direction as an enum.
    pub fn direction(&self) -> Direction {
        if self.ascending { Direction::Asc } else { Direction::Desc }
    }
}

#[derive(Debug, Clone)]
struct SortMemo {
    column: String,
    ascending: bool,
    fingerprint: Fingerprint,
    rows: Vec<Row>,
}

/// Sort state plus the memoized result of the last sort.
///
/// The memo is keyed by column, direction and a fingerprint of the full input
/// rows, so editing a value in place invalidates it even when the row count
/// stays the same.
#[derive(Debug, Clone, Default)]
pub struct SortEngine {
    state: SortState,
    memo: Option<SortMemo>,
}

impl SortEngine {
    /// Creates an engine with no active sort.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current sort state.
    pub fn state(&self) -> &SortState {
        &self.state
    }

    /// Sorts by `key`, toggling the direction if it is already the sort column.
    ///
    /// A new column starts ascending. Unknown and non-sortable columns are
    /// ignored; returns `false` in that case.
    pub fn sort_by(&mut self, key: &str, columns: &[ColumnDescriptor]) -> bool {
        if !find_column(columns, key).is_some_and(|c| c.sortable) {
            log::debug!("[sort] ignoring sort on non-sortable column '{}'", key);
            return false;
        }
        if self.state.column.as_deref() == Some(key) {
            self.state.ascending = !self.state.ascending;
        } else {
            self.state.column = Some(key.to_string());
            self.state.ascending = true;
        }
        true
    }

    /// Sets column and direction directly.
    ///
    /// `None` clears the sort. Unknown and non-sortable columns are ignored.
    pub fn set_sort(&mut self, column: Option<&str>, ascending: bool, columns: &[ColumnDescriptor]) -> bool {
        match column {
            None => {
                self.state = SortState::default();
                true
            }
            Some(key) if find_column(columns, key).is_some_and(|c| c.sortable) => {
                self.state.column = Some(key.to_string());
                self.state.ascending = ascending;
                true
            }
            Some(key) => {
                log::debug!("[sort] ignoring sort on non-sortable column '{}'", key);
                false
            }
        }
    }

    /// Clears the active sort.
    pub fn clear(&mut self) {
        self.state = SortState::default();
    }

    /// Returns `rows` ordered by the current sort.
    ///
    /// With no active sort the input is returned borrowed. Otherwise the
    /// result is served from the memo when column, direction and content all
    /// match the previous call.
    pub fn sorted<'a>(&'a mut self, rows: &'a [Row], columns: &[ColumnDescriptor]) -> Cow<'a, [Row]> {
        let Some(column) = self.state.column.clone() else {
            return Cow::Borrowed(rows);
        };
        let ascending = self.state.ascending;
        let fingerprint = fingerprint_rows(rows);

        let memo = match self.memo.take() {
            Some(memo)
                if memo.column == column
                    && memo.ascending == ascending
                    && memo.fingerprint == fingerprint =>
            {
                memo
            }
            _ => {
                let column_type = find_column(columns, &column).and_then(|c| c.column_type);
                let sorted = sort_rows(rows, &column, ascending, column_type);
                log::trace!("[sort] sorted {} rows by '{}' asc={}", rows.len(), column, ascending);
                SortMemo {
                    column,
                    ascending,
                    fingerprint,
                    rows: sorted,
                }
            }
        };

        Cow::Borrowed(self.memo.insert(memo).rows.as_slice())
    }
}

/// Returns a stably sorted copy of `rows`.
pub fn sort_rows(rows: &[Row], column: &str, ascending: bool, column_type: Option<ColumnType>) -> Vec<Row> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| {
        let ord = compare_values(a.value(column), b.value(column), column_type);
        if ascending { ord } else { ord.reverse() }
    });
    sorted
}

/// Ascending comparison of two cells, nulls last.
///
/// Numbers compare numerically, instants chronologically, everything else as
/// lowercase strings in ordinal order. A `Number` or `Date` column also parses
/// string cells before falling back to string comparison.
pub fn compare_values(a: &Value, b: &Value, column_type: Option<ColumnType>) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }

    match (a, b) {
        (Value::Int(x), Value::Int(y)) => return x.cmp(y),
        (Value::DateTime(x), Value::DateTime(y)) => return x.cmp(y),
        _ => {}
    }

    if let (Some(x), Some(y)) = (as_number(a, column_type), as_number(b, column_type)) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }

    if column_type == Some(ColumnType::Date) {
        if let (Some(x), Some(y)) = (as_instant(a), as_instant(b)) {
            return x.cmp(&y);
        }
    }

    a.to_filter_string()
        .to_lowercase()
        .cmp(&b.to_filter_string().to_lowercase())
}

fn as_number(value: &Value, column_type: Option<ColumnType>) -> Option<f64> {
    match value {
        Value::Int(_) | Value::Float(_) => value.as_f64(),
        Value::String(s) if column_type == Some(ColumnType::Number) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_instant(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::DateTime(dt) => Some(*dt),
        Value::String(s) => parse_instant(s),
        _ => None,
    }
}

fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
