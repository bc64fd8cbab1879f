//! In-memory result cursor
//!
//! Serves rows from memory through the [`RowCursor`] interface. Rows can be
//! pushed directly as wire values or loaded from a JSON result document:
//!
//! ```json
//! {
//!   "columns": [{"name": "ts", "type": "TIMESTAMP"}, {"name": "v", "type": "FLOAT8"}],
//!   "rows": [["2024-01-20T12:34:56.789Z", 1.5], ["2024-01-20T12:35:00Z", null]]
//! }
//! ```

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::decoder::{ColumnInfo, RowCursor, ScanTarget};
use super::error::CursorError;
use super::value::WireValue;

/// Result set serialized as JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultDocument {
    pub columns: Vec<ColumnInfo>,
    #[serde(default)]
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl ResultDocument {
    /// Parse a document from JSON text
    pub fn from_json(input: &str) -> Result<Self, CursorError> {
        serde_json::from_str(input).map_err(|e| CursorError::InvalidRow(e.to_string()))
    }
}

/// A [`RowCursor`] over rows held in memory
#[derive(Debug, Clone)]
pub struct MemoryCursor {
    columns: Vec<ColumnInfo>,
    rows: VecDeque<Vec<Option<WireValue>>>,
    fail_after: Option<usize>,
    fetched: usize,
}

impl MemoryCursor {
    /// Create an empty cursor with the given columns
    pub fn new(columns: Vec<ColumnInfo>) -> Self {
        Self {
            columns,
            rows: VecDeque::new(),
            fail_after: None,
            fetched: 0,
        }
    }

    /// Builder method: append a row (`None` is a SQL NULL)
    pub fn with_row(mut self, row: Vec<Option<WireValue>>) -> Self {
        self.rows.push_back(row);
        self
    }

    /// Append a row
    pub fn push_row(&mut self, row: Vec<Option<WireValue>>) {
        self.rows.push_back(row);
    }

    /// Builder method: report a closed connection after `rows` fetches
    pub fn fail_after(mut self, rows: usize) -> Self {
        self.fail_after = Some(rows);
        self
    }

    /// Rows not yet fetched
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }

    /// Build a cursor from a JSON result document
    ///
    /// JSON cells are read according to each column's wire type; columns of
    /// other types are kept as text.
    pub fn from_document(document: ResultDocument) -> Result<Self, CursorError> {
        let mut cursor = Self::new(document.columns);

        for (index, row) in document.rows.into_iter().enumerate() {
            if row.len() != cursor.columns.len() {
                return Err(CursorError::InvalidRow(format!(
                    "row {} has {} cells, expected {}",
                    index,
                    row.len(),
                    cursor.columns.len()
                )));
            }

            let cells = cursor
                .columns
                .iter()
                .zip(&row)
                .map(|(column, cell)| wire_from_json(&column.type_name, cell))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| CursorError::InvalidRow(format!("row {}: {}", index, e)))?;
            cursor.rows.push_back(cells);
        }

        Ok(cursor)
    }
}

impl RowCursor for MemoryCursor {
    fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    fn next_row(&mut self, targets: &mut [ScanTarget]) -> Result<bool, CursorError> {
        if self.fail_after == Some(self.fetched) {
            return Err(CursorError::Closed(format!(
                "connection closed after {} rows",
                self.fetched
            )));
        }

        let Some(row) = self.rows.pop_front() else {
            return Ok(false);
        };

        if row.len() != targets.len() {
            return Err(CursorError::InvalidRow(format!(
                "row has {} cells, expected {}",
                row.len(),
                targets.len()
            )));
        }

        for (target, cell) in targets.iter_mut().zip(row) {
            target.fill(cell);
        }

        self.fetched += 1;
        Ok(true)
    }
}

/// Read one JSON cell as the wire value a driver would produce
fn wire_from_json(type_name: &str, cell: &serde_json::Value) -> Result<Option<WireValue>, String> {
    use serde_json::Value as Json;

    if cell.is_null() {
        return Ok(None);
    }

    let invalid = || format!("invalid {} cell: {}", type_name, cell);

    let wire = match (type_name, cell) {
        ("BOOL", Json::Bool(v)) => WireValue::Bool(*v),
        ("INT2", Json::Number(n)) => n
            .as_i64()
            .and_then(|v| i16::try_from(v).ok())
            .map(WireValue::Int16)
            .ok_or_else(invalid)?,
        ("FLOAT4", Json::Number(n)) => WireValue::Float32(n.as_f64().ok_or_else(invalid)? as f32),
        ("FLOAT8", Json::Number(n)) => WireValue::Float64(n.as_f64().ok_or_else(invalid)?),
        ("TIMESTAMP", Json::String(s)) => WireValue::Timestamp(
            DateTime::parse_from_rfc3339(s).map_err(|e| format!("{}: {}", invalid(), e))?,
        ),
        ("TIMESTAMP", Json::Number(n)) => {
            let micros = n.as_i64().ok_or_else(invalid)?;
            let utc: DateTime<Utc> = DateTime::from_timestamp_micros(micros).ok_or_else(invalid)?;
            WireValue::Timestamp(utc.into())
        }
        ("BOOL" | "INT2" | "FLOAT4" | "FLOAT8" | "TIMESTAMP", _) => return Err(invalid()),
        (_, Json::String(s)) => WireValue::Text(s.clone()),
        (_, other) => WireValue::Text(other.to_string()),
    };

    Ok(Some(wire))
}
