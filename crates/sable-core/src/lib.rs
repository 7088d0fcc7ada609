//! # sable-core
//!
//! State transition for Sable.
//!
//! This crate ties the interpreter to a transaction:
//! - [`Message`]: the sender, recipient, value, gas and data of one transaction
//! - [`GasPool`]: gas still available in the block
//! - [`ChainConfig`]: fork activation blocks
//! - [`apply_message`]: nonce and balance checks, gas purchase, execution,
//!   refunds and the miner payment

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod error;
mod gas_pool;
mod message;
mod transition;

pub use config::ChainConfig;
pub use error::{TransitionError, TransitionResult};
pub use gas_pool::GasPool;
pub use message::Message;
pub use transition::{apply_message, ExecutionResult};
