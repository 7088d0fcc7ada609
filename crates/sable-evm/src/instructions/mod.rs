//! Opcode handlers.
//!
//! Every handler runs after the interpreter validated the stack depth and
//! charged gas, so memory accesses are already within bounds.

mod arithmetic;
mod bitwise;
mod control;
mod environment;
mod host;
mod system;

pub(crate) use arithmetic::*;
pub(crate) use bitwise::*;
pub(crate) use control::*;
pub(crate) use environment::*;
pub(crate) use host::*;
pub(crate) use system::*;
