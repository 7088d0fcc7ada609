//! CLI argument parsing for sable-vm

use clap::{Parser, Subcommand};
use sable_primitives::{parse_u256, U256};
use std::path::PathBuf;

/// Sable EVM runner
#[derive(Parser, Debug)]
#[command(name = "sable-vm")]
#[command(about = "Run EVM bytecode and JSON VM tests")]
#[command(version)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Fork rules to execute under
    #[arg(long, global = true, default_value = "Constantinople")]
    pub fork: String,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// sable-vm subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute bytecode against an empty state
    Run {
        /// Code to execute (hex)
        #[arg(long)]
        code: String,

        /// Call data (hex)
        #[arg(long, default_value = "")]
        input: String,

        /// Gas limit
        #[arg(long, default_value = "10000000")]
        gas: u64,

        /// Value sent with the call (decimal or 0x-hex)
        #[arg(long, default_value = "0", value_parser = parse_value)]
        value: U256,

        /// Print every executed instruction as a JSON line
        #[arg(long)]
        trace: bool,

        /// Persist the post-state to a RocksDB directory
        #[arg(long)]
        datadir: Option<PathBuf>,
    },
    /// Run JSON VM test files or directories
    Test {
        /// Fixture files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Report every case
        #[arg(long, short)]
        verbose: bool,
    },
}

fn parse_value(s: &str) -> Result<U256, String> {
    parse_u256(s).map_err(|e| e.to_string())
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
