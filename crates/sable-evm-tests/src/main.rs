//! sable-vm binary
//!
//! Runs bytecode or JSON VM test fixtures against the Sable EVM.

mod cli;

use anyhow::{bail, Context, Result};
use bytes::Bytes;
use cli::{Cli, Command};
use sable_evm_tests::{fork_rules, run_code, ExecConfig, TestRunner};
use sable_primitives::{parse_bytes, to_hex};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let rules = fork_rules(&cli.fork)?;

    match cli.command {
        Command::Run {
            code,
            input,
            gas,
            value,
            trace,
            datadir,
        } => {
            let config = ExecConfig {
                code: Bytes::from(parse_bytes(&code).context("invalid --code")?),
                input: Bytes::from(parse_bytes(&input).context("invalid --input")?),
                gas,
                value,
                rules,
                trace,
                datadir,
            };
            let outcome = run_code(&config)?;

            for log in &outcome.trace {
                println!("{}", serde_json::to_string(log)?);
            }
            println!("output: {}", to_hex(&outcome.output));
            println!("gas used: {}", outcome.gas_used);
            println!("state root: {:?}", outcome.state_root);
            if let Some(error) = &outcome.error {
                println!("error: {error}");
            }
        }
        Command::Test { paths, verbose } => {
            tracing::info!(fork = %cli.fork, files = paths.len(), "running VM tests");
            let stats = TestRunner::new(rules, verbose).run_paths(&paths)?;
            stats.print_summary();
            if !stats.all_passed() {
                bail!("{} of {} tests failed", stats.failed, stats.total);
            }
        }
    }
    Ok(())
}
