//! Row selection.
//!
//! Selection is tracked by row id. With a configured row key the id is the
//! type and string encoding of that column, so a selected row stays selected
//! while filters and sorting move it around, and `1` never matches `"1"`.
//! Without a key, or when the key cell is null, the id is the row's position
//! in the processed set and selection follows positions.

use std::collections::HashSet;

use crate::model::Row;

/// Tracks selected rows of the current processed set.
///
/// Every query takes the current processed rows. Selected ids that do not
/// occur in them are carried along but ignored by every count and check.
///
/// # Example
///
/// ```
/// use gridline_lib::model::Row;
/// use gridline_lib::pipeline::SelectionTracker;
///
/// let rows = vec![Row::new().set("id", "a"), Row::new().set("id", "b")];
/// let mut selection = SelectionTracker::with_row_key("id");
///
/// selection.toggle_row(&rows, 1);
/// assert!(selection.is_indeterminate(&rows));
///
/// selection.set_all_selected(&rows, true);
/// assert!(selection.is_all_selected(&rows));
/// assert!(!selection.is_indeterminate(&rows));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SelectionTracker {
    selected: HashSet<String>,
    row_key: Option<String>,
}

impl SelectionTracker {
    /// Creates a positional tracker (no row key).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tracker keyed by the given column.
    pub fn with_row_key(row_key: impl Into<String>) -> Self {
        Self {
            selected: HashSet::new(),
            row_key: Some(row_key.into()),
        }
    }

    /// The column used as row identity, if any.
    pub fn row_key(&self) -> Option<&str> {
        self.row_key.as_deref()
    }

    /// Identity of the row at `index`.
    pub fn row_id(&self, row: &Row, index: usize) -> String {
        match self.row_key.as_deref().map(|key| row.value(key)) {
            Some(value) if !value.is_null() => format!("{}:{}", value.type_name(), value.to_filter_string()),
            _ => format!("#{}", index),
        }
    }

    fn id_at(&self, rows: &[Row], index: usize) -> Option<String> {
        let Some(row) = rows.get(index) else {
            log::debug!("[selection] index {} out of range ({} rows)", index, rows.len());
            return None;
        };
        Some(self.row_id(row, index))
    }

    /// Number of rows in `rows` that are selected.
    pub fn selected_count(&self, rows: &[Row]) -> usize {
        rows.iter()
            .enumerate()
            .filter(|(i, row)| self.selected.contains(&self.row_id(row, *i)))
            .count()
    }

    /// `true` iff `rows` is non-empty and every row is selected.
    pub fn is_all_selected(&self, rows: &[Row]) -> bool {
        !rows.is_empty() && self.selected_count(rows) == rows.len()
    }

    /// Selects every row of `rows` (replacing the selection) or clears it.
    pub fn set_all_selected(&mut self, rows: &[Row], selected: bool) {
        self.selected.clear();
        if selected {
            let ids: Vec<String> = rows.iter().enumerate().map(|(i, row)| self.row_id(row, i)).collect();
            self.selected.extend(ids);
        }
    }

    /// `true` iff some, but not all, rows of `rows` are selected.
    pub fn is_indeterminate(&self, rows: &[Row]) -> bool {
        let count = self.selected_count(rows);
        count > 0 && count < rows.len()
    }

    /// Toggles the row at `index`. Out-of-range indices are ignored.
    pub fn toggle_row(&mut self, rows: &[Row], index: usize) {
        if let Some(id) = self.id_at(rows, index) {
            if !self.selected.remove(&id) {
                self.selected.insert(id);
            }
        }
    }

    /// Selects the row at `index`. Out-of-range indices are ignored.
    pub fn select_row(&mut self, rows: &[Row], index: usize) {
        if let Some(id) = self.id_at(rows, index) {
            self.selected.insert(id);
        }
    }

    /// Deselects the row at `index`. Out-of-range indices are ignored.
    pub fn deselect_row(&mut self, rows: &[Row], index: usize) {
        if let Some(id) = self.id_at(rows, index) {
            self.selected.remove(&id);
        }
    }

    /// `true` if the row at `index` is selected.
    pub fn is_selected(&self, rows: &[Row], index: usize) -> bool {
        rows.get(index)
            .is_some_and(|row| self.selected.contains(&self.row_id(row, index)))
    }

    /// Clears the selection.
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Selected rows of `rows`, in their processed order.
    pub fn selected_rows<'a>(&self, rows: &'a [Row]) -> Vec<&'a Row> {
        rows.iter()
            .enumerate()
            .filter(|(i, row)| self.selected.contains(&self.row_id(row, *i)))
            .map(|(_, row)| row)
            .collect()
    }

    /// All selected ids, sorted, including ones not in the current set.
    pub fn selected_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }
}
