//! # questframe
//!
//! QuestDB query macros and typed result decoding for tabular data frames.
//!
//! ## Features
//!
//! - **Macro substitution**: `$__timeFilter(col)`, `$__fromTime`, `$__toTime`
//!   and `$__sampleByInterval` expanded against a dashboard time range
//! - **Typed decoding**: QuestDB wire types mapped to frame field types with
//!   nullability preserved
//! - **Datasource settings**: host settings parsing and connection strings
//!
//! ## Modules
//!
//! - [`time`]: Time ranges and sample-by interval formatting
//! - [`macros`]: Macro registry and resolution
//! - [`convert`]: Converter registry and row decoding
//! - [`driver`]: Datasource settings and the driver facade
//! - [`config`]: Application configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use questframe::macros::{MacroRegistry, QueryContext};
//! use questframe::time::TimeRange;
//!
//! let registry = MacroRegistry::standard();
//! let range = TimeRange::parse_rfc3339("2024-01-20T12:34:56.789Z", "2024-02-10T10:01:02.123Z")?;
//! let ctx = QueryContext::new(range);
//!
//! let sql = registry.resolve("select * from tab where $__timeFilter(ts)", &ctx)?;
//! assert_eq!(
//!     sql,
//!     "select * from tab where ts >= cast(1705754096789000 as timestamp) AND ts <= cast(1707559262123000 as timestamp)"
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod convert;
pub mod driver;
pub mod macros;
pub mod time;

// Re-export top-level types for convenience
pub use time::{format_sample_by, TimeError, TimeRange, TimeResult};

pub use macros::{MacroError, MacroHandler, MacroRegistry, MacroResult, QueryContext};

pub use convert::{
    decode_rows, ConvertError, Converter, ConverterRegistry, DecodeError, FieldType, Frame,
    RowCursor, Value,
};

pub use driver::{Driver, DriverSettings, Settings, SettingsError};

pub use config::{Config, ConfigError, LoggingConfig};
