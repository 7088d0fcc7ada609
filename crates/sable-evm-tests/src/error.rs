//! Error types for the VM test harness

use sable_primitives::PrimitiveError;
use sable_state::StateError;
use thiserror::Error;

/// Test harness error
#[derive(Error, Debug)]
pub enum TestError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Hex or number decoding error
    #[error("Parse error: {0}")]
    Parse(#[from] PrimitiveError),

    /// State database failure
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// Fixture names a fork this harness does not know
    #[error("Unknown fork: {0}")]
    UnknownFork(String),

    /// Expectation not met
    #[error("Assertion failed: {0}")]
    Assertion(String),
}

/// Test result type
pub type TestResult<T> = Result<T, TestError>;
