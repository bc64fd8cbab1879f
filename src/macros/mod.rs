//! Query Macro Engine
//!
//! Rewrites templated query text before it is sent to QuestDB:
//!
//! - **Context**: per-query values a macro may read (time range, interval)
//! - **Registry**: immutable name → handler table
//! - **Handlers**: the built-in `fromTime`, `toTime`, `timeFilter` and
//!   `sampleByInterval` macros
//!
//! # Macro Syntax
//!
//! ```text
//! $__name
//! $__name(arg1, arg2, ...)
//! ```
//!
//! Substitution is purely textual: the surrounding SQL is never parsed or
//! validated, and unknown `$__` tokens are left untouched.
//!
//! # Example
//!
//! ```rust
//! use chrono::Duration;
//! use questframe::macros::{MacroRegistry, QueryContext};
//! use questframe::time::TimeRange;
//!
//! let range = TimeRange::parse_rfc3339("2024-01-20T12:34:56.789Z", "2024-02-10T10:01:02.123Z")?;
//! let ctx = QueryContext::new(range).with_interval(Duration::seconds(30));
//!
//! let sql = MacroRegistry::standard()
//!     .resolve("select * from tab sample by $__sampleByInterval", &ctx)?;
//! assert_eq!(sql, "select * from tab sample by 30s");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod context;
mod engine;
mod error;
pub mod handlers;

pub use context::QueryContext;
pub use engine::{MacroHandler, MacroRegistry, MacroRegistryBuilder, MACRO_MARKER};
pub use error::{MacroError, MacroResult};
