//! Column descriptors.

use serde::Deserialize;
use serde::Serialize;

/// Declared data type of a column.
///
/// Only affects sorting; filtering and search always work on the string
/// encoding of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Number,
    Date,
    Boolean,
}

/// Horizontal alignment for column content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Column configuration.
///
/// Columns are declared once per table and never change afterwards. They are
/// sortable and filterable unless switched off.
///
/// # Examples
///
/// ```
/// use gridline_lib::model::{ColumnDescriptor, ColumnType};
///
/// let columns = vec![
///     ColumnDescriptor::new("id", "ID").not_sortable().not_filterable(),
///     ColumnDescriptor::new("name", "Name"),
///     ColumnDescriptor::new("joined", "Joined").typed(ColumnType::Date),
/// ];
/// assert!(columns[1].sortable);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    /// Row field key
    pub key: String,
    /// Header text
    pub label: String,
    /// Whether sorting by this column is allowed
    #[serde(default = "default_true")]
    pub sortable: bool,
    /// Whether this column takes part in filtering
    #[serde(default = "default_true")]
    pub filterable: bool,
    /// Declared data type
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub column_type: Option<ColumnType>,
    /// Display width hint, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    /// Horizontal alignment
    #[serde(default)]
    pub align: Alignment,
}

fn default_true() -> bool {
    true
}

impl ColumnDescriptor {
    /// Create a sortable, filterable column.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            sortable: true,
            filterable: true,
            column_type: None,
            width: None,
            align: Alignment::Left,
        }
    }

    /// Set the declared type.
    pub fn typed(mut self, column_type: ColumnType) -> Self {
        self.column_type = Some(column_type);
        self
    }

    /// Disable sorting on this column.
    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Exclude this column from filtering.
    pub fn not_filterable(mut self) -> Self {
        self.filterable = false;
        self
    }

    /// Set the column alignment.
    pub fn align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }
}

/// Find a column by key.
pub fn find_column<'a>(columns: &'a [ColumnDescriptor], key: &str) -> Option<&'a ColumnDescriptor> {
    columns.iter().find(|c| c.key == key)
}
