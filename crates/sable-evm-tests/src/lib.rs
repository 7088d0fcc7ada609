//! # sable-evm-tests
//!
//! Test harness for the Sable EVM.
//!
//! This crate provides:
//! - JSON parsing for the VM-test fixture format
//! - [`VmTestRunner`] for frame-level fixtures with pre/post state checks
//! - [`TestRunner`] for walking fixture directories and aggregating results
//! - [`run_code`] for ad-hoc execution, used by the `sable-vm` binary

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod exec;
mod runner;
mod types;

pub use error::{TestError, TestResult};
pub use exec::{receiver, run_code, sender, ExecConfig, ExecOutcome};
pub use runner::{TestRunner, TestStats};
pub use types::*;
pub use vm_test::{fork_rules, VmTestResults, VmTestRunner, SUPPORTED_FORKS};
