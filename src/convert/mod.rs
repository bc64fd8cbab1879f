//! Typed Result Decoding
//!
//! Turns QuestDB result rows into typed, nullable-aware columns:
//!
//! - **Values**: wire cells, scan shapes and the closed decoded [`Value`] type
//! - **Registry**: wire type identifier → [`Converter`]
//! - **Decoder**: drives a [`RowCursor`] and assembles a [`Frame`]
//! - **Cursor**: an in-memory [`RowCursor`] for fixtures and tests
//!
//! # Nullability
//!
//! Floating point and timestamp columns are scanned into a nullable target
//! with two presence levels: the cell itself may be [`Scanned::Missing`], or
//! present but holding no value ([`Scanned::Nullable`]`(None)`). Both decode
//! to [`Value::Null`]. Boolean and integer columns use a direct target.

mod cursor;
mod decoder;
mod error;
mod registry;
mod value;

pub use cursor::{MemoryCursor, ResultDocument};
pub use decoder::{
    decode_rows, ColumnInfo, DecodedColumn, Frame, RowCursor, ScanTarget, UnknownColumnPolicy,
};
pub use error::{ConvertError, ConvertResult, CursorError, DecodeError, DecodeResult};
pub use registry::{
    default_decode, timestamp_decode, Converter, ConverterRegistry, ConverterRegistryBuilder,
    DecodeFn,
};
pub use value::{FieldType, ScanShape, Scanned, Value, WireValue};
