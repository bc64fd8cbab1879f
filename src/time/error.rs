//! Time value error types

use thiserror::Error;

/// Errors that can occur while building time values
#[derive(Error, Debug)]
pub enum TimeError {
    /// A timestamp string could not be parsed
    #[error("Invalid timestamp '{input}': {reason}")]
    InvalidTimestamp { input: String, reason: String },

    /// A duration string could not be parsed
    #[error("Invalid interval '{0}'")]
    InvalidInterval(String),
}

/// Result type for time operations
pub type TimeResult<T> = Result<T, TimeError>;
