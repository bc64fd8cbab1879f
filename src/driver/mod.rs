//! QuestDB Driver
//!
//! Ties the macro engine and the converter registry to one datasource:
//!
//! - **Settings**: datasource settings loaded from the host
//! - **Connection**: connection string generation
//! - **Driver**: owns both registries and the per-datasource query settings
//!
//! A driver is built once per datasource and is immutable afterwards; any
//! number of queries may interpolate and decode through it concurrently.
//!
//! # Example
//!
//! ```rust
//! use chrono::Duration;
//! use questframe::convert::{ColumnInfo, MemoryCursor, Value, WireValue};
//! use questframe::driver::Driver;
//! use questframe::macros::QueryContext;
//! use questframe::time::TimeRange;
//!
//! let driver = Driver::standard();
//!
//! let range = TimeRange::parse_rfc3339("2024-01-20T00:00:00Z", "2024-01-21T00:00:00Z")?;
//! let ctx = QueryContext::new(range).with_interval(Duration::hours(1));
//! let sql = driver.interpolate("select avg(v) from t sample by $__sampleByInterval", &ctx)?;
//! assert_eq!(sql, "select avg(v) from t sample by 1h");
//!
//! let mut cursor = MemoryCursor::new(vec![ColumnInfo::new("v", "FLOAT8")])
//!     .with_row(vec![Some(WireValue::Float64(2.5))]);
//! let frame = driver.decode(&mut cursor)?;
//! assert_eq!(frame.column("v").unwrap().values, vec![Value::Float64(2.5)]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod connection;
mod settings;

pub use connection::{client_version, connection_string, ConnectionError, ConnectionResult};
pub use settings::{Settings, SettingsError, SettingsResult, TlsConfigurationMethod, TlsMode};

use std::time::Duration;

use crate::convert::{
    decode_rows, Converter, ConverterRegistry, DecodeResult, Frame, RowCursor,
    UnknownColumnPolicy,
};
use crate::macros::{MacroRegistry, MacroResult, QueryContext};

/// Per-datasource query settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverSettings {
    /// Query timeout enforced by the connection layer
    pub query_timeout: Duration,
    /// Handling of columns with unsupported wire types
    pub unknown_columns: UnknownColumnPolicy,
}

impl DriverSettings {
    /// Derive query settings from datasource settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            query_timeout: Duration::from_secs(settings.query_timeout_secs),
            ..Self::default()
        }
    }

    /// Builder method: set the unknown column policy
    pub fn unknown_columns(mut self, policy: UnknownColumnPolicy) -> Self {
        self.unknown_columns = policy;
        self
    }
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            query_timeout: Duration::from_secs(60),
            unknown_columns: UnknownColumnPolicy::default(),
        }
    }
}

/// Query interpolation and result decoding for one datasource
#[derive(Debug, Clone)]
pub struct Driver {
    macros: MacroRegistry,
    converters: ConverterRegistry,
    settings: DriverSettings,
}

impl Driver {
    /// Driver with the built-in macros and converters
    pub fn new(settings: DriverSettings) -> Self {
        Self::with_registries(MacroRegistry::standard(), ConverterRegistry::standard(), settings)
    }

    /// Driver with default settings
    pub fn standard() -> Self {
        Self::new(DriverSettings::default())
    }

    /// Driver with custom registries
    pub fn with_registries(
        macros: MacroRegistry,
        converters: ConverterRegistry,
        settings: DriverSettings,
    ) -> Self {
        tracing::debug!(
            macros = ?macros.names(),
            converters = converters.len(),
            query_timeout_secs = settings.query_timeout.as_secs(),
            "Created QuestDB driver"
        );
        Self {
            macros,
            converters,
            settings,
        }
    }

    /// Resolve every macro in `raw_sql`
    pub fn interpolate(&self, raw_sql: &str, ctx: &QueryContext) -> MacroResult<String> {
        self.macros.resolve(raw_sql, ctx)
    }

    /// Converter for a wire type identifier, if one is registered
    pub fn converter(&self, type_name: &str) -> Option<&Converter> {
        self.converters.get(type_name)
    }

    /// Decode all rows of `cursor`
    pub fn decode<C>(&self, cursor: &mut C) -> DecodeResult<Frame>
    where
        C: RowCursor + ?Sized,
    {
        decode_rows(cursor, &self.converters, self.settings.unknown_columns)
    }

    /// Macro registry
    pub fn macros(&self) -> &MacroRegistry {
        &self.macros
    }

    /// Converter registry
    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    /// Query settings
    pub fn settings(&self) -> &DriverSettings {
        &self.settings
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::standard()
    }
}
