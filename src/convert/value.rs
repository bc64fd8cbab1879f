//! Wire cells, scan shapes and decoded values

use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

/// A value as physically produced by the database driver
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Bool(bool),
    Int16(i16),
    Float32(f32),
    Float64(f64),
    /// Timestamps may arrive with any offset; converters normalize to UTC
    Timestamp(DateTime<FixedOffset>),
    Text(String),
}

/// How a scan target wraps the wire value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanShape {
    /// One presence level: the cell is either missing or holds a value
    Direct,
    /// Two presence levels: the cell may be missing, or present and empty
    Nullable,
}

/// A filled scan target
#[derive(Debug, Clone, PartialEq)]
pub enum Scanned {
    /// Nothing was written to the target
    Missing,
    /// Direct target holding a value
    Direct(WireValue),
    /// Nullable target; `None` is a SQL NULL
    Nullable(Option<WireValue>),
}

impl Scanned {
    /// Build a scanned cell of the given shape from an optional wire value
    ///
    /// A NULL cell scanned into a direct target stays [`Scanned::Missing`].
    pub fn shaped(shape: ScanShape, cell: Option<WireValue>) -> Self {
        match (shape, cell) {
            (ScanShape::Direct, Some(value)) => Scanned::Direct(value),
            (ScanShape::Direct, None) => Scanned::Missing,
            (ScanShape::Nullable, cell) => Scanned::Nullable(cell),
        }
    }
}

/// Semantic type of a decoded column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Bool,
    Int16,
    NullableFloat32,
    NullableFloat64,
    NullableTime,
}

impl FieldType {
    /// Convert a wire value into this field type, if the kinds agree
    pub fn accept(&self, wire: WireValue) -> Option<Value> {
        match (self, wire) {
            (Self::Bool, WireValue::Bool(v)) => Some(Value::Bool(v)),
            (Self::Int16, WireValue::Int16(v)) => Some(Value::Int16(v)),
            (Self::NullableFloat32, WireValue::Float32(v)) => Some(Value::Float32(v)),
            (Self::NullableFloat64, WireValue::Float64(v)) => Some(Value::Float64(v)),
            (Self::NullableTime, WireValue::Timestamp(v)) => {
                Some(Value::Timestamp(v.with_timezone(&Utc)))
            }
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Int16 => write!(f, "int16"),
            Self::NullableFloat32 => write!(f, "*float32"),
            Self::NullableFloat64 => write!(f, "*float64"),
            Self::NullableTime => write!(f, "*time"),
        }
    }
}

/// A decoded cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int16(i16),
    Float32(f32),
    Float64(f64),
    Timestamp(DateTime<Utc>),
    /// No value
    Null,
}

impl Value {
    /// Check for the no-value marker
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Widen numeric values to `f64`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int16(v) => Some(f64::from(*v)),
            Value::Float32(v) => Some(f64::from(*v)),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Timestamp value, if any
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::Float32(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            Value::Null => write!(f, "null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shaped_cells() {
        let wire = WireValue::Float64(1.5);
        assert_eq!(
            Scanned::shaped(ScanShape::Nullable, Some(wire.clone())),
            Scanned::Nullable(Some(wire.clone()))
        );
        assert_eq!(
            Scanned::shaped(ScanShape::Nullable, None),
            Scanned::Nullable(None)
        );
        assert_eq!(
            Scanned::shaped(ScanShape::Direct, Some(wire.clone())),
            Scanned::Direct(wire)
        );
        assert_eq!(Scanned::shaped(ScanShape::Direct, None), Scanned::Missing);
    }

    #[test]
    fn test_accept_requires_matching_kind() {
        assert_eq!(
            FieldType::Int16.accept(WireValue::Int16(7)),
            Some(Value::Int16(7))
        );
        assert_eq!(FieldType::Int16.accept(WireValue::Float32(7.0)), None);
        assert_eq!(FieldType::NullableTime.accept(WireValue::Text("x".into())), None);
    }

    #[test]
    fn test_timestamp_normalized_to_utc() {
        let ts = DateTime::parse_from_rfc3339("2024-01-20T14:00:00+02:00").unwrap();
        let value = FieldType::NullableTime.accept(WireValue::Timestamp(ts)).unwrap();
        assert_eq!(
            value.as_timestamp().unwrap().to_rfc3339(),
            "2024-01-20T12:00:00+00:00"
        );
    }

    #[test]
    fn test_value_serializes_untagged() {
        let values = vec![Value::Bool(true), Value::Int16(3), Value::Null];
        assert_eq!(serde_json::to_string(&values).unwrap(), "[true,3,null]");
    }
}
