//! # sable-evm
//!
//! Gas-metered EVM bytecode interpreter.
//!
//! This crate provides:
//! - [`Evm`]: call, create and the nested frame lifecycle
//! - [`Interpreter`]: the per-frame fetch, charge and execute loop
//! - Fork-dependent instruction sets ([`Rules`], [`JumpTable`])
//! - Gas tables, precompiles and execution tracing
//!
//! State is reached through [`StateAccess`], implemented for
//! [`sable_state::StateDb`].

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod context;
mod dynamic_gas;
mod error;
mod evm;
pub mod gas;
mod instructions;
mod interpreter;
mod jump_table;
mod memory;
mod opcode;
pub mod precompiles;
mod rules;
mod stack;
mod state;
pub mod tracer;
pub mod word;

pub use config::VmConfig;
pub use context::{BlockContext, BlockHashProvider, CallContext, TestBlockHashes, TxContext};
pub use error::{EvmError, EvmResult};
pub use evm::{CallResult, Evm};
pub use gas::{intrinsic_gas, GasTable};
pub use interpreter::{FrameOutcome, Interpreter, Status};
pub use jump_table::{JumpTable, Operation};
pub use memory::Memory;
pub use opcode::{JumpDests, OpCode};
pub use rules::{RuleSet, Rules};
pub use stack::{WordStack, STACK_LIMIT};
pub use state::StateAccess;
pub use tracer::{LogConfig, Step, StructLog, StructLogger, TraceResult, Tracer};
