//! # sable-state
//!
//! The per-transaction world-state view used by the interpreter.
//!
//! [`StateDb`] caches [`StateObject`]s loaded from a [`SecureTrie`], records
//! every mutation in a [`Journal`] so nested frames can be rolled back with
//! [`StateDb::snapshot`] / [`StateDb::revert_to_snapshot`], collects logs and
//! the gas refund counter, and writes the result back as a new state root.
//!
//! [`SecureTrie`]: sable_storage::SecureTrie

#![warn(missing_docs)]
#![warn(clippy::all)]

mod account;
mod config;
mod dump;
mod error;
mod journal;
mod log;
mod object;
mod statedb;

pub use account::Account;
pub use config::StateConfig;
pub use dump::{Dump, DumpAccount};
pub use error::{StateError, StateResult};
pub use journal::{Journal, JournalEntry};
pub use log::{logs_hash, Log};
pub use object::StateObject;
pub use statedb::StateDb;
