//! Converter registry
//!
//! Maps the wire type identifier a column reports (`BOOL`, `FLOAT8`, ...) to
//! the converter that knows its scan shape, output type and decode logic.
//! Lookups are exact; there is no fallback converter.

use std::collections::BTreeMap;
use std::fmt;

use chrono::Utc;

use super::error::{ConvertError, ConvertResult};
use super::value::{FieldType, ScanShape, Scanned, Value, WireValue};

/// Custom decode logic for one converter
pub type DecodeFn = fn(&Converter, &Scanned) -> ConvertResult<Value>;

/// Decoding rules for one wire type
#[derive(Clone)]
pub struct Converter {
    type_name: String,
    field_type: FieldType,
    scan_shape: ScanShape,
    decode: Option<DecodeFn>,
}

impl Converter {
    /// Create a converter that uses the default decode
    pub fn new(type_name: impl Into<String>, field_type: FieldType, scan_shape: ScanShape) -> Self {
        Self {
            type_name: type_name.into(),
            field_type,
            scan_shape,
            decode: None,
        }
    }

    /// Replace the default decode
    pub fn with_decode(mut self, decode: DecodeFn) -> Self {
        self.decode = Some(decode);
        self
    }

    /// Wire type identifier
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Output field type
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Shape of the scan target the cursor fills
    pub fn scan_shape(&self) -> ScanShape {
        self.scan_shape
    }

    /// Whether a custom decode is registered
    pub fn has_custom_decode(&self) -> bool {
        self.decode.is_some()
    }

    /// Decode a scanned cell
    pub fn decode(&self, cell: &Scanned) -> ConvertResult<Value> {
        match self.decode {
            Some(decode) => decode(self, cell),
            None => default_decode(self, cell),
        }
    }

    /// Error for a cell that does not fit this converter
    pub fn shape_mismatch(&self, cell: &Scanned) -> ConvertError {
        ConvertError::ShapeMismatch {
            type_name: self.type_name.clone(),
            value: format!("{:?}", cell),
        }
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("type_name", &self.type_name)
            .field("field_type", &self.field_type)
            .field("scan_shape", &self.scan_shape)
            .field("custom_decode", &self.decode.is_some())
            .finish()
    }
}

/// Decode used when a converter has no custom logic
///
/// A missing cell or a NULL inside a nullable target becomes [`Value::Null`];
/// a present value is passed through when its shape and kind match.
pub fn default_decode(converter: &Converter, cell: &Scanned) -> ConvertResult<Value> {
    let wire = match (converter.scan_shape, cell) {
        (_, Scanned::Missing) => return Ok(Value::Null),
        (ScanShape::Nullable, Scanned::Nullable(None)) => return Ok(Value::Null),
        (ScanShape::Nullable, Scanned::Nullable(Some(wire))) => wire,
        (ScanShape::Direct, Scanned::Direct(wire)) => wire,
        _ => return Err(converter.shape_mismatch(cell)),
    };

    converter
        .field_type
        .accept(wire.clone())
        .ok_or_else(|| converter.shape_mismatch(cell))
}

/// Nullable timestamp decode; present values are normalized to UTC
pub fn timestamp_decode(converter: &Converter, cell: &Scanned) -> ConvertResult<Value> {
    match cell {
        Scanned::Missing | Scanned::Nullable(None) => Ok(Value::Null),
        Scanned::Nullable(Some(WireValue::Timestamp(ts))) => {
            Ok(Value::Timestamp(ts.with_timezone(&Utc)))
        }
        _ => Err(converter.shape_mismatch(cell)),
    }
}

/// Immutable wire type → converter table
#[derive(Debug, Clone)]
pub struct ConverterRegistry {
    converters: BTreeMap<String, Converter>,
}

impl ConverterRegistry {
    /// Start building a registry
    pub fn builder() -> ConverterRegistryBuilder {
        ConverterRegistryBuilder::default()
    }

    /// Registry with the QuestDB wire types
    pub fn standard() -> Self {
        let converters = standard_converters()
            .into_iter()
            .map(|c| (c.type_name.clone(), c))
            .collect();
        Self { converters }
    }

    /// Look up the converter for a wire type identifier
    pub fn get(&self, type_name: &str) -> Option<&Converter> {
        self.converters.get(type_name)
    }

    /// All converters ordered by wire type identifier
    pub fn iter(&self) -> impl Iterator<Item = &Converter> {
        self.converters.values()
    }

    /// Number of registered wire types
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Builder for [`ConverterRegistry`]
#[derive(Debug, Default)]
pub struct ConverterRegistryBuilder {
    converters: BTreeMap<String, Converter>,
}

impl ConverterRegistryBuilder {
    /// Seed the builder with the QuestDB wire types
    ///
    /// Fails if a standard wire type was already registered.
    pub fn with_standard_converters(self) -> ConvertResult<Self> {
        standard_converters()
            .into_iter()
            .try_fold(self, |builder, converter| builder.register(converter))
    }

    /// Add a converter; a second converter for the same wire type is an error
    pub fn register(mut self, converter: Converter) -> ConvertResult<Self> {
        if self.converters.contains_key(&converter.type_name) {
            return Err(ConvertError::DuplicateType(converter.type_name));
        }
        self.converters.insert(converter.type_name.clone(), converter);
        Ok(self)
    }

    /// Freeze the registry
    pub fn build(self) -> ConverterRegistry {
        tracing::debug!(types = self.converters.len(), "Built converter registry");
        ConverterRegistry {
            converters: self.converters,
        }
    }
}

fn standard_converters() -> Vec<Converter> {
    vec![
        Converter::new("BOOL", FieldType::Bool, ScanShape::Direct),
        Converter::new("INT2", FieldType::Int16, ScanShape::Direct),
        Converter::new("FLOAT4", FieldType::NullableFloat32, ScanShape::Nullable),
        Converter::new("FLOAT8", FieldType::NullableFloat64, ScanShape::Nullable),
        Converter::new("TIMESTAMP", FieldType::NullableTime, ScanShape::Nullable)
            .with_decode(timestamp_decode),
    ]
}
