//! Tabular file content.
//!
//! A `ContentTable` is an ordered list of column identifiers plus an ordered
//! list of rows. Every cell is raw text; nothing is coerced on load. Each row
//! remembers the position it was loaded at, so edits made through a derived
//! view can be written back to the right place in the source.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A column key, unique within one table.
pub type ColumnId = String;

/// Errors raised while loading or editing content.
///
/// The query path itself never fails; these only come from building a table
/// out of text or from addressing a row/column that does not exist.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content is empty")]
    EmptyInput,

    #[error("header row is empty")]
    EmptyHeader,

    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("row {row} has {found} cells, but the header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON array of objects")]
    NotRecords,

    #[error("row {0} not found")]
    RowNotFound(usize),

    #[error("column '{0}' not found")]
    UnknownColumn(String),
}

/// One row of content: its cells in column order and its original position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub index: usize,
    pub cells: Vec<String>,
}

impl Row {
    pub fn new(index: usize, cells: Vec<String>) -> Self {
        Row { index, cells }
    }

    /// Cell at `column`. Missing trailing cells read as the empty string.
    pub fn cell(&self, column: usize) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }
}

/// Ordered columns plus ordered rows.
///
/// The query engine only ever borrows a table; derived views hold references
/// into it and never modify it.
///
/// # Example
///
/// ```
/// use gridquery::ContentTable;
///
/// let table = ContentTable::from_csv("name,score\na,10\nb,notanumber\nc,30\n").unwrap();
/// assert_eq!(table.columns(), ["name", "score"]);
/// assert_eq!(table.len(), 3);
/// assert_eq!(table.rows()[1].cell(1), "notanumber");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTable {
    columns: Vec<ColumnId>,
    rows: Vec<Row>,
}

impl ContentTable {
    /// Create an empty table with the given columns.
    pub fn new<I, S>(columns: I) -> Result<Self, ContentError>
    where
        I: IntoIterator<Item = S>,
        S: Into<ColumnId>,
    {
        let columns: Vec<ColumnId> = columns.into_iter().map(Into::into).collect();
        for (i, name) in columns.iter().enumerate() {
            if columns[..i].contains(name) {
                return Err(ContentError::DuplicateColumn(name.clone()));
            }
        }
        Ok(ContentTable {
            columns,
            rows: Vec::new(),
        })
    }

    pub fn columns(&self) -> &[ColumnId] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Append a row. Its original index is its position at append time.
    ///
    /// Rows shorter than the column list are accepted (missing cells read as
    /// empty); longer rows are rejected.
    pub fn push_row<I, S>(&mut self, cells: I) -> Result<usize, ContentError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cells: Vec<String> = cells.into_iter().map(Into::into).collect();
        let index = self.rows.len();
        if cells.len() > self.columns.len() {
            return Err(ContentError::RaggedRow {
                row: index,
                expected: self.columns.len(),
                found: cells.len(),
            });
        }
        self.rows.push(Row::new(index, cells));
        Ok(index)
    }

    /// Row with the given original index.
    pub fn row(&self, index: usize) -> Option<&Row> {
        // Rows are only ever appended, so original index == position.
        self.rows.get(index).filter(|r| r.index == index)
    }

    /// Overwrite one cell, addressed by original row index and column id.
    /// Returns the previous value.
    pub fn set_cell(
        &mut self,
        index: usize,
        column: &str,
        value: impl Into<String>,
    ) -> Result<String, ContentError> {
        let col = self
            .column_index(column)
            .ok_or_else(|| ContentError::UnknownColumn(column.to_string()))?;
        let row = self
            .rows
            .get_mut(index)
            .ok_or(ContentError::RowNotFound(index))?;
        if row.cells.len() <= col {
            row.cells.resize(col + 1, String::new());
        }
        Ok(std::mem::replace(&mut row.cells[col], value.into()))
    }

    /// Build a table from CSV text.
    ///
    /// The first record is the header. Quoted fields may contain commas,
    /// doubled quotes and newlines. Blank lines are skipped; a line holding
    /// only separators or `""` is a row of empty cells.
    pub fn from_csv(csv: &str) -> Result<Self, ContentError> {
        let mut records = parse_csv_records(csv).into_iter();
        let header = records.next().ok_or(ContentError::EmptyInput)?;
        if header.iter().all(|h| h.trim().is_empty()) {
            return Err(ContentError::EmptyHeader);
        }

        let mut table = ContentTable::new(header)?;
        for record in records {
            table.push_row(record)?;
        }
        Ok(table)
    }

    /// Build a table from a JSON array of objects.
    ///
    /// Columns appear in the order their keys are first seen. Strings are
    /// taken as-is, `null` becomes the empty string and other scalars are
    /// rendered as JSON text.
    ///
    /// ```
    /// use gridquery::ContentTable;
    ///
    /// let table = ContentTable::from_json(r#"[{"id": 1, "name": "Alice"}, {"id": 2, "extra": true}]"#).unwrap();
    /// assert_eq!(table.columns(), ["id", "name", "extra"]);
    /// assert_eq!(table.rows()[1].cell(2), "true");
    /// assert_eq!(table.rows()[1].cell(1), "");
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        let parsed: serde_json::Value = serde_json::from_str(json)?;
        let records = parsed.as_array().ok_or(ContentError::NotRecords)?;
        if records.is_empty() {
            return Err(ContentError::EmptyInput);
        }

        let mut objects = Vec::with_capacity(records.len());
        let mut columns: Vec<ColumnId> = Vec::new();
        for record in records {
            let obj = record.as_object().ok_or(ContentError::NotRecords)?;
            for key in obj.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
            objects.push(obj);
        }

        let mut table = ContentTable::new(columns)?;
        for obj in objects {
            let cells: Vec<String> = table
                .columns
                .iter()
                .map(|col| obj.get(col).map(json_to_cell).unwrap_or_default())
                .collect();
            table.push_row(cells)?;
        }
        Ok(table)
    }

    /// Export as CSV with a header row.
    ///
    /// Fields containing commas, quotes or newlines are quoted.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        write_csv_record(&mut out, self.columns.iter().map(String::as_str));
        for row in &self.rows {
            write_csv_record(&mut out, (0..self.columns.len()).map(|c| row.cell(c)));
        }
        out
    }
}

fn json_to_cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn write_csv_record<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    let fields: Vec<&str> = fields.collect();
    // An all-empty record would otherwise read back as a blank line.
    let all_empty = fields.iter().all(|f| f.is_empty());
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if all_empty && i == 0 {
            out.push_str("\"\"");
        } else if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
}

/// Split CSV text into records, handling quoted fields with embedded newlines.
/// Physical lines with no characters (other than `\r`) are skipped.
fn parse_csv_records(csv: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line_has_content = false;
    let mut chars = csv.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\r' && !(c == '\n' && !in_quotes) {
            line_has_content = true;
        }
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => {
                in_quotes = true;
            }
            ',' if !in_quotes => {
                record.push(std::mem::take(&mut field));
            }
            '\n' if !in_quotes => {
                if line_has_content {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                line_has_content = false;
            }
            '\r' if !in_quotes => {
                // part of \r\n
            }
            _ => field.push(c),
        }
    }

    if line_has_content {
        record.push(field);
        records.push(record);
    }

    records
}
