//! Execution context for EVM

use crate::opcode::JumpDests;
use bytes::Bytes;
use sable_crypto::keccak256;
use sable_primitives::{Address, BlockNumber, H256, U256};
use std::fmt;
use std::sync::Arc;

/// The running code and who it runs on behalf of
#[derive(Clone, Debug)]
pub struct CallContext {
    /// Account whose storage and balance the code acts on
    pub address: Address,
    /// Immediate caller
    pub caller: Address,
    /// Account the code was loaded from (differs for CALLCODE/DELEGATECALL)
    pub code_address: Address,
    /// Bytecode
    pub code: Bytes,
    /// Call data
    pub input: Bytes,
    /// Value visible to CALLVALUE
    pub value: U256,
    /// Gas remaining
    pub gas: u64,
    jump_dests: JumpDests,
}

impl CallContext {
    /// Create a new call context
    pub fn new(
        caller: Address,
        address: Address,
        code_address: Address,
        code: Bytes,
        input: Bytes,
        value: U256,
        gas: u64,
    ) -> Self {
        let jump_dests = JumpDests::analyze(&code);
        Self {
            address,
            caller,
            code_address,
            code,
            input,
            value,
            gas,
            jump_dests,
        }
    }

    /// Opcode byte at `pc`; past the end reads as STOP
    pub fn op_at(&self, pc: usize) -> u8 {
        self.code.get(pc).copied().unwrap_or(0)
    }

    /// Whether `dest` is a JUMPDEST outside of PUSH data
    pub fn valid_jump(&self, dest: &U256) -> bool {
        if dest.bits() > 63 {
            return false;
        }
        self.jump_dests.is_valid(dest.low_u64() as usize)
    }

    /// Deduct `amount`, returning false if not enough is left
    pub fn use_gas(&mut self, amount: u64) -> bool {
        if self.gas < amount {
            return false;
        }
        self.gas -= amount;
        true
    }
}

/// Lookup of historical block hashes for BLOCKHASH
pub trait BlockHashProvider: Send + Sync {
    /// Hash of block `number`
    fn block_hash(&self, number: BlockNumber) -> H256;
}

impl<F> BlockHashProvider for F
where
    F: Fn(BlockNumber) -> H256 + Send + Sync,
{
    fn block_hash(&self, number: BlockNumber) -> H256 {
        self(number)
    }
}

/// Hashes VM test fixtures expect: keccak of the decimal block number
#[derive(Clone, Copy, Debug, Default)]
pub struct TestBlockHashes;

impl BlockHashProvider for TestBlockHashes {
    fn block_hash(&self, number: BlockNumber) -> H256 {
        keccak256(number.to_string().as_bytes())
    }
}

/// Block environment information
#[derive(Clone)]
pub struct BlockContext {
    /// Block coinbase
    pub coinbase: Address,
    /// Block number
    pub number: BlockNumber,
    /// Block timestamp
    pub timestamp: u64,
    /// Block difficulty
    pub difficulty: U256,
    /// Block gas limit
    pub gas_limit: u64,
    /// Source for BLOCKHASH
    pub block_hashes: Arc<dyn BlockHashProvider>,
}

impl BlockContext {
    /// Hash of `number` if it lies within the last 256 blocks, zero otherwise
    pub fn block_hash(&self, number: &U256) -> H256 {
        if number.bits() > 64 {
            return H256::zero();
        }
        let n = number.low_u64();
        if n < self.number && n.saturating_add(256) >= self.number {
            self.block_hashes.block_hash(n)
        } else {
            H256::zero()
        }
    }
}

impl Default for BlockContext {
    fn default() -> Self {
        Self {
            coinbase: Address::zero(),
            number: 0,
            timestamp: 0,
            difficulty: U256::zero(),
            gas_limit: 0,
            block_hashes: Arc::new(|_: BlockNumber| H256::zero()),
        }
    }
}

impl fmt::Debug for BlockContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockContext")
            .field("coinbase", &self.coinbase)
            .field("number", &self.number)
            .field("timestamp", &self.timestamp)
            .field("difficulty", &self.difficulty)
            .field("gas_limit", &self.gas_limit)
            .finish_non_exhaustive()
    }
}

/// Transaction environment information
#[derive(Clone, Debug, Default)]
pub struct TxContext {
    /// Transaction origin (original sender)
    pub origin: Address,
    /// Gas price
    pub gas_price: U256,
}
