//! Macro error types

use thiserror::Error;

/// Errors that can occur while registering or expanding macros
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MacroError {
    /// A macro was invoked with the wrong number of arguments
    #[error("unexpected number of arguments for macro '{macro_name}': expected {expected} argument, received {received}")]
    BadArgumentCount {
        macro_name: String,
        expected: usize,
        received: usize,
    },

    /// An argument list was opened but never closed
    #[error("unterminated argument list for macro '{0}'")]
    UnterminatedArguments(String),

    /// Two handlers were registered under the same name
    #[error("macro '{0}' is already registered")]
    DuplicateMacro(String),

    /// A handler could not produce its expansion
    #[error("macro '{macro_name}' failed: {reason}")]
    Expansion { macro_name: String, reason: String },
}

/// Result type for macro operations
pub type MacroResult<T> = Result<T, MacroError>;
