//! Conversion and decoding error types

use thiserror::Error;

/// Errors raised by a single converter or while building the registry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    /// The scanned cell does not have the shape the converter expects
    #[error("invalid {type_name} value - {value}")]
    ShapeMismatch { type_name: String, value: String },

    /// Two converters were registered for the same wire type
    #[error("converter for wire type '{0}' is already registered")]
    DuplicateType(String),
}

/// Result type for converter operations
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Errors reported by a row cursor
#[derive(Error, Debug)]
pub enum CursorError {
    /// The cursor or its connection was closed mid-scan
    #[error("cursor closed: {0}")]
    Closed(String),

    /// I/O failure while fetching a row
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The fetched row could not be written to the scan targets
    #[error("invalid row: {0}")]
    InvalidRow(String),
}

/// Errors that can occur while decoding a result cursor
#[derive(Error, Debug)]
pub enum DecodeError {
    /// A column reported a wire type with no registered converter
    #[error("no converter registered for column '{column}' of type '{type_name}'")]
    UnknownType { column: String, type_name: String },

    /// A cell could not be converted
    #[error("failed to convert column '{column}' at row {row}")]
    Convert {
        column: String,
        row: usize,
        #[source]
        source: ConvertError,
    },

    /// The cursor failed while fetching rows
    #[error("cursor error: {0}")]
    Cursor(#[from] CursorError),

    /// Decoded columns ended up with different lengths
    #[error("row count mismatch: column '{column}' has {actual} rows, expected {expected}")]
    RowCountMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}

/// Result type for decoding operations
pub type DecodeResult<T> = Result<T, DecodeError>;
