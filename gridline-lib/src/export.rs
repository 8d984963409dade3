//! CSV, tab-delimited and JSON export of a processed row set.
//!
//! Only text generation lives here; where the bytes go is up to the caller.

use std::io::Write;

use chrono::Datelike;

use crate::error::ExportError;
use crate::model::ColumnDescriptor;
use crate::model::Row;
use crate::model::Value;

/// Export file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values.
    Csv,
    /// Pretty-printed JSON array of rows.
    Json,
    /// Tab-delimited text for spreadsheets.
    Excel,
}

impl ExportFormat {
    /// File name used when the caller gives none.
    pub fn default_filename(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "export.csv",
            ExportFormat::Json => "export.json",
            ExportFormat::Excel => "export.xlsx",
        }
    }
}

/// Options for delimited exports.
///
/// # Example
///
/// ```
/// use gridline_lib::export::{ExportOptions, to_csv};
/// use gridline_lib::model::{ColumnDescriptor, Row};
///
/// let columns = vec![ColumnDescriptor::new("name", "Name")];
/// let rows = vec![Row::new().set("name", "Ada \"the\" first")];
///
/// let csv = to_csv(&rows, &columns, &ExportOptions::default());
/// assert_eq!(csv, "\"Name\"\n\"Ada \"\"the\"\" first\"\n");
/// ```
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Suggested file name; `None` means the format's default.
    pub filename: Option<String>,
    /// Whether to emit a header line of column labels.
    pub include_headers: bool,
    /// Field separator.
    pub delimiter: char,
    /// Date pattern for date-time cells; `YYYY`, `MM` and `DD` are replaced.
    pub date_format: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            filename: None,
            include_headers: true,
            delimiter: ',',
            date_format: "YYYY-MM-DD".to_string(),
        }
    }
}

impl ExportOptions {
    /// Sets the file name.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Enables or disables the header line.
    pub fn with_headers(mut self, include: bool) -> Self {
        self.include_headers = include;
        self
    }

    /// Sets the field separator.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the date pattern.
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// The file name to use for `format`.
    pub fn filename_for(&self, format: ExportFormat) -> String {
        self.filename
            .clone()
            .unwrap_or_else(|| format.default_filename().to_string())
    }
}

/// Renders rows as delimited text, one line per row in column order.
///
/// Every cell is quoted, with embedded quotes doubled. Null and missing
/// cells are empty, date-times use the date pattern and nested values are
/// written as JSON text.
pub fn to_csv(rows: &[Row], columns: &[ColumnDescriptor], options: &ExportOptions) -> String {
    let delimiter = options.delimiter.to_string();
    let mut output = String::new();

    if options.include_headers {
        let header: Vec<String> = columns.iter().map(|c| quote(&c.label)).collect();
        output.push_str(&header.join(&delimiter));
        output.push('\n');
    }

    for row in rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| quote(&format_cell(row.value(&c.key), &options.date_format)))
            .collect();
        output.push_str(&cells.join(&delimiter));
        output.push('\n');
    }

    log::debug!("[export] {} rows x {} columns", rows.len(), columns.len());
    output
}

/// Tab-delimited rendition of [`to_csv`], for spreadsheet import.
pub fn to_tsv(rows: &[Row], columns: &[ColumnDescriptor], options: &ExportOptions) -> String {
    to_csv(rows, columns, &options.clone().with_delimiter('\t'))
}

/// Renders rows as a pretty-printed JSON array.
pub fn to_json(rows: &[Row]) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(rows)?)
}

/// Writes [`to_csv`] output to `writer`.
pub fn write_csv<W: Write>(
    writer: &mut W,
    rows: &[Row],
    columns: &[ColumnDescriptor],
    options: &ExportOptions,
) -> Result<(), ExportError> {
    writer.write_all(to_csv(rows, columns, options).as_bytes())?;
    Ok(())
}

/// Writes [`to_tsv`] output to `writer`.
pub fn write_tsv<W: Write>(
    writer: &mut W,
    rows: &[Row],
    columns: &[ColumnDescriptor],
    options: &ExportOptions,
) -> Result<(), ExportError> {
    writer.write_all(to_tsv(rows, columns, options).as_bytes())?;
    Ok(())
}

/// Writes [`to_json`] output to `writer`.
pub fn write_json<W: Write>(writer: &mut W, rows: &[Row]) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut *writer, rows)?;
    writer.write_all(b"\n")?;
    Ok(())
}

fn format_cell(value: &Value, date_format: &str) -> String {
    match value {
        Value::DateTime(dt) => date_format
            .replace("YYYY", &dt.year().to_string())
            .replace("MM", &format!("{:02}", dt.month()))
            .replace("DD", &format!("{:02}", dt.day())),
        other => other.to_filter_string(),
    }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}
