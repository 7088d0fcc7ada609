//! State transition error types

use sable_primitives::U256;
use sable_state::StateError;
use thiserror::Error;

/// Reasons a message is rejected before or around execution.
///
/// Failures inside the interpreter are not errors at this level; they are
/// reported through [`crate::ExecutionResult::failed`].
#[derive(Debug, Error)]
pub enum TransitionError {
    /// Message nonce is behind the account
    #[error("nonce too low: account has {state}, message has {message}")]
    NonceTooLow {
        /// Account nonce
        state: u64,
        /// Message nonce
        message: u64,
    },

    /// Message nonce is ahead of the account
    #[error("nonce too high: account has {state}, message has {message}")]
    NonceTooHigh {
        /// Account nonce
        state: u64,
        /// Message nonce
        message: u64,
    },

    /// Sender cannot pay for gas and value
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Gas limit times price, plus value
        required: U256,
        /// Sender balance
        available: U256,
    },

    /// Block gas pool exhausted
    #[error("gas limit reached: requested {requested}, available {available}")]
    GasLimitReached {
        /// Gas requested
        requested: u64,
        /// Gas left in the pool
        available: u64,
    },

    /// Gas limit below the intrinsic cost
    #[error("intrinsic gas too low: required {required}, provided {provided}")]
    IntrinsicGas {
        /// Intrinsic cost
        required: u64,
        /// Message gas limit
        provided: u64,
    },

    /// State backing store failure
    #[error("state error: {0}")]
    State(#[from] StateError),
}

/// Result type for state transitions
pub type TransitionResult<T> = Result<T, TransitionError>;
