//! Protocol error types.

use thiserror::Error;

/// Errors raised when a request payload is malformed or out of range.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProtocolError {
    #[error("Invalid color {0:?}, expected #RRGGBB")]
    InvalidColor(String),

    #[error("{field} must be between {min} and {max} characters, got {len}")]
    BadLength {
        field: &'static str,
        min: usize,
        max: usize,
        len: usize,
    },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("{0} must be a finite number")]
    NotFinite(&'static str),
}
