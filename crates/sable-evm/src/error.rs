//! EVM error types

use thiserror::Error;

/// Reasons a call frame stops short of a normal STOP/RETURN
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvmError {
    /// Out of gas
    #[error("out of gas")]
    OutOfGas,

    /// Stack underflow
    #[error("stack underflow")]
    StackUnderflow,

    /// Stack overflow
    #[error("stack overflow (max 1024)")]
    StackOverflow,

    /// Invalid jump destination
    #[error("invalid jump destination")]
    InvalidJump,

    /// Invalid or fork-disabled opcode
    #[error("invalid opcode: 0x{0:02x}")]
    InvalidOpcode(u8),

    /// State modification attempted in a read-only frame
    #[error("write protection")]
    WriteProtection,

    /// RETURNDATACOPY past the end of the return buffer
    #[error("return data out of bounds")]
    ReturnDataOutOfBounds,

    /// Call depth exceeded
    #[error("max call depth exceeded")]
    CallDepthExceeded,

    /// Insufficient balance for transfer
    #[error("insufficient balance for transfer")]
    InsufficientBalance,

    /// Contract creation collided with an existing account
    #[error("contract address collision")]
    ContractAddressCollision,

    /// Deployed code exceeds the size limit
    #[error("max code size exceeded")]
    MaxCodeSizeExceeded,

    /// Not enough gas left to pay for the deployed code
    #[error("contract creation code storage out of gas")]
    CodeStoreOutOfGas,

    /// REVERT opcode
    #[error("execution reverted")]
    Revert,
}

impl EvmError {
    /// Whether the frame loses all of its remaining gas.
    ///
    /// Only REVERT hands unused gas back to the caller.
    pub fn consumes_all_gas(&self) -> bool {
        !matches!(self, EvmError::Revert)
    }

    /// Errors raised before a child frame starts executing
    pub fn is_call_failure(&self) -> bool {
        matches!(
            self,
            EvmError::CallDepthExceeded | EvmError::InsufficientBalance
        )
    }
}

/// Result type for EVM operations
pub type EvmResult<T> = Result<T, EvmError>;
