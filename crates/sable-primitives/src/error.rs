//! Common error types for primitives

use thiserror::Error;

/// Primitive parsing error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrimitiveError {
    /// Invalid hex string
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    /// Invalid length
    #[error("invalid length: expected {expected} bytes, got {got}")]
    InvalidLength {
        /// Expected byte length
        expected: usize,
        /// Actual byte length
        got: usize,
    },

    /// Invalid number literal
    #[error("invalid number: {0}")]
    InvalidNumber(String),
}
