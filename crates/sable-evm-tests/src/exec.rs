//! Ad-hoc execution of bytecode against an empty state, kept in memory or
//! persisted to a RocksDB directory

use crate::error::TestResult;
use bytes::Bytes;
use sable_evm::{
    BlockContext, Evm, LogConfig, Rules, StructLog, StructLogger, TestBlockHashes, TxContext,
    VmConfig,
};
use sable_primitives::{Address, H256, U256};
use sable_state::{StateConfig, StateDb, StateError};
use sable_storage::{Database, DbConfig, KeyValueStore, MemoryDatabase};
use std::path::PathBuf;
use std::sync::Arc;

/// Left-pad an ASCII name into an address
fn named_address(name: &[u8]) -> Address {
    let mut bytes = [0u8; 20];
    bytes[20 - name.len()..].copy_from_slice(name);
    Address::from(bytes)
}

/// Account the code is called from
pub fn sender() -> Address {
    named_address(b"sender")
}

/// Account the code is installed at
pub fn receiver() -> Address {
    named_address(b"receiver")
}

/// Parameters of a single run
#[derive(Clone, Debug)]
pub struct ExecConfig {
    /// Code installed at [`receiver`]
    pub code: Bytes,
    /// Call data
    pub input: Bytes,
    /// Gas provided
    pub gas: u64,
    /// Value sent from [`sender`], which is funded with exactly this much
    pub value: U256,
    /// Fork rules
    pub rules: Rules,
    /// Record a struct log
    pub trace: bool,
    /// Commit the post-state to a RocksDB store here instead of memory
    pub datadir: Option<PathBuf>,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            code: Bytes::new(),
            input: Bytes::new(),
            gas: 10_000_000,
            value: U256::zero(),
            rules: Rules::all_enabled(),
            trace: false,
            datadir: None,
        }
    }
}

/// What a run produced
#[derive(Debug)]
pub struct ExecOutcome {
    /// Return data or revert reason
    pub output: Vec<u8>,
    /// Gas consumed
    pub gas_used: u64,
    /// Failure, if any
    pub error: Option<String>,
    /// Recorded steps, empty unless tracing
    pub trace: Vec<StructLog>,
    /// Root of the committed post-state
    pub state_root: H256,
}

fn open_store(config: &ExecConfig) -> TestResult<Arc<dyn KeyValueStore>> {
    let Some(dir) = &config.datadir else {
        return Ok(Arc::new(MemoryDatabase::new()));
    };
    let db = Database::new(dir);
    db.open_with_config(DbConfig::default())
        .map_err(StateError::from)?;
    tracing::info!(path = %dir.display(), "opened state store");
    Ok(Arc::new(db))
}

/// Run `config.code` in a fresh state and commit the result
pub fn run_code(config: &ExecConfig) -> TestResult<ExecOutcome> {
    let mut state = StateDb::empty(open_store(config)?, StateConfig::default());
    state.set_code(receiver(), config.code.clone());
    state.set_balance(sender(), config.value);
    state.commit()?;

    let block = BlockContext {
        coinbase: Address::zero(),
        number: 0,
        timestamp: 0,
        difficulty: U256::zero(),
        gas_limit: config.gas,
        block_hashes: Arc::new(TestBlockHashes),
    };
    let tx = TxContext {
        origin: sender(),
        gas_price: U256::zero(),
    };
    let vm_config = VmConfig {
        no_recursion: false,
        debug: config.trace,
    };

    let mut logger = StructLogger::new(LogConfig::default());
    let result = {
        let mut evm = Evm::new(&mut state, block, tx, config.rules, vm_config);
        if config.trace {
            evm = evm.with_tracer(&mut logger);
        }
        evm.call(sender(), receiver(), config.input.clone(), config.gas, config.value)
    };
    if let Some(err) = state.error() {
        tracing::warn!(error = %err, "state database reported an error");
    }
    let state_root = state.commit()?;

    Ok(ExecOutcome {
        state_root,
        gas_used: config.gas - result.gas_left,
        error: result.error.map(|e| e.to_string()),
        output: result.output,
        trace: logger.logs().to_vec(),
    })
}
