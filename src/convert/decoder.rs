//! Row Decoder
//!
//! Drives a [`RowCursor`] and assembles typed columns:
//!
//! 1. Resolve a converter for every column by its wire type identifier
//! 2. Allocate one scan target per column with the converter's shape
//! 3. Fetch rows one at a time, decoding every column in lockstep
//!
//! ```text
//! cursor → scan targets → converters → Frame
//! ```
//!
//! Decoding is strictly sequential. Cursor failures are returned as-is; the
//! decoder never retries.

use serde::{Deserialize, Serialize};

use super::error::{CursorError, DecodeError, DecodeResult};
use super::registry::{Converter, ConverterRegistry};
use super::value::{FieldType, ScanShape, Scanned, Value, WireValue};

/// Column metadata reported by a cursor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,
    /// Wire type identifier, e.g. `FLOAT8`
    #[serde(rename = "type")]
    pub type_name: String,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// A live result cursor
///
/// Implemented by the connection layer. `next_row` writes one cell into
/// each target, positionally matching [`RowCursor::columns`].
pub trait RowCursor {
    /// Columns of the result set
    fn columns(&self) -> &[ColumnInfo];

    /// Fetch the next row into `targets`; returns `false` once exhausted
    fn next_row(&mut self, targets: &mut [ScanTarget]) -> Result<bool, CursorError>;
}

/// A scan destination shaped for one column's converter
#[derive(Debug, Clone, PartialEq)]
pub struct ScanTarget {
    shape: ScanShape,
    cell: Scanned,
}

impl ScanTarget {
    /// Allocate an empty target
    pub fn new(shape: ScanShape) -> Self {
        Self {
            shape,
            cell: Scanned::Missing,
        }
    }

    /// Write a database cell, wrapping it according to the target shape
    pub fn fill(&mut self, cell: Option<WireValue>) {
        self.cell = Scanned::shaped(self.shape, cell);
    }

    /// Write an already wrapped cell
    pub fn set(&mut self, cell: Scanned) {
        self.cell = cell;
    }

    /// Current content
    pub fn cell(&self) -> &Scanned {
        &self.cell
    }

    fn reset(&mut self) {
        self.cell = Scanned::Missing;
    }
}

/// What to do with a column whose wire type has no converter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownColumnPolicy {
    /// Fail the whole query
    #[default]
    Fail,
    /// Drop the column from the frame
    Skip,
}

/// One decoded column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedColumn {
    /// Column name
    pub name: String,
    /// Wire type identifier the column was decoded from
    pub type_name: String,
    /// Semantic type of every value
    pub field_type: FieldType,
    /// One value per row
    pub values: Vec<Value>,
}

impl DecodedColumn {
    fn for_converter(info: &ColumnInfo, converter: &Converter) -> Self {
        Self {
            name: info.name.clone(),
            type_name: info.type_name.clone(),
            field_type: converter.field_type(),
            values: Vec::new(),
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `row`
    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row)
    }
}

/// Decoded result set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    columns: Vec<DecodedColumn>,
    rows: usize,
}

impl Frame {
    /// Build a frame of `rows` rows, checking every column has that length
    ///
    /// `rows` is kept separately so a frame whose columns were all skipped
    /// still reports how many rows the cursor returned.
    pub fn new(columns: Vec<DecodedColumn>, rows: usize) -> DecodeResult<Self> {
        if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
            return Err(DecodeError::RowCountMismatch {
                column: bad.name.clone(),
                expected: rows,
                actual: bad.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    /// Columns in cursor order
    pub fn columns(&self) -> &[DecodedColumn] {
        &self.columns
    }

    /// Find a column by name
    pub fn column(&self, name: &str) -> Option<&DecodedColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Check if the frame has no rows
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Values of one row in column order
    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        if index >= self.rows {
            return None;
        }
        self.columns.iter().map(|c| c.get(index)).collect()
    }
}

/// Decode every row of `cursor` into a [`Frame`]
pub fn decode_rows<C>(
    cursor: &mut C,
    registry: &ConverterRegistry,
    policy: UnknownColumnPolicy,
) -> DecodeResult<Frame>
where
    C: RowCursor + ?Sized,
{
    let infos = cursor.columns().to_vec();

    let mut converters: Vec<Option<&Converter>> = Vec::with_capacity(infos.len());
    for info in &infos {
        match (registry.get(&info.type_name), policy) {
            (Some(converter), _) => converters.push(Some(converter)),
            (None, UnknownColumnPolicy::Fail) => {
                return Err(DecodeError::UnknownType {
                    column: info.name.clone(),
                    type_name: info.type_name.clone(),
                });
            }
            (None, UnknownColumnPolicy::Skip) => {
                tracing::warn!(
                    column = %info.name,
                    type_name = %info.type_name,
                    "Skipping column with unsupported wire type"
                );
                converters.push(None);
            }
        }
    }

    // Skipped columns still need a target so the cursor can fill positionally.
    let mut targets: Vec<ScanTarget> = converters
        .iter()
        .map(|c| ScanTarget::new(c.map_or(ScanShape::Direct, Converter::scan_shape)))
        .collect();

    let mut columns: Vec<Option<DecodedColumn>> = infos
        .iter()
        .zip(&converters)
        .map(|(info, c)| c.map(|c| DecodedColumn::for_converter(info, c)))
        .collect();

    tracing::debug!(
        columns = infos.len(),
        decoded = columns.iter().flatten().count(),
        "Decoding result rows"
    );

    let mut row = 0usize;
    loop {
        targets.iter_mut().for_each(ScanTarget::reset);
        if !cursor.next_row(&mut targets)? {
            break;
        }

        for ((target, converter), column) in targets.iter().zip(&converters).zip(&mut columns) {
            let (Some(converter), Some(column)) = (converter, column) else {
                continue;
            };
            let value = converter
                .decode(target.cell())
                .map_err(|source| DecodeError::Convert {
                    column: column.name.clone(),
                    row,
                    source,
                })?;
            column.values.push(value);
        }

        row += 1;
    }

    tracing::debug!(rows = row, "Decoded result rows");
    Frame::new(columns.into_iter().flatten().collect(), row)
}
