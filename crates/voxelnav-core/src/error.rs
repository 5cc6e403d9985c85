//! Error types for navigation state handling.

use thiserror::Error;

/// Failure to read a numeric value from untrusted JSON input.
///
/// Restore paths catch this locally and fall back to a default, so it never
/// reaches the caller of a `restore_state`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Expected a JSON array
    #[error("expected an array, got {0}")]
    NotAnArray(&'static str),

    /// Array had the wrong number of elements
    #[error("expected {expected} elements, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    /// Element was not a number
    #[error("element {index} is not a number")]
    NotANumber { index: usize },

    /// Element was NaN or infinite
    #[error("element {index} is not finite")]
    NonFinite { index: usize },

    /// Element was zero or negative
    #[error("element {index} is not positive")]
    NonPositive { index: usize },

    /// Expected a single number
    #[error("expected a number, got {0}")]
    NotANumberValue(&'static str),

    /// Number was zero, negative or not finite
    #[error("expected a finite positive number")]
    NotPositive,
}

/// Workspace-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    /// JSON text could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL fragment could not be decoded
    #[error("Fragment error: {0}")]
    Fragment(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Short JSON type name used in error messages.
pub(crate) const fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
