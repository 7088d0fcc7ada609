//! State access used by the interpreter

use bytes::Bytes;
use sable_primitives::{Address, H256, U256};
use sable_state::{Log, StateDb, StateResult};

/// The subset of the world state that opcodes read and write.
///
/// Every mutator is expected to be journaled so that
/// [`StateAccess::revert_to_snapshot`] can undo it.
pub trait StateAccess {
    /// Create (or reset) an account, keeping its balance
    fn create_account(&mut self, address: Address);
    /// Whether the account is known, including self-destructed ones
    fn exists(&mut self, address: &Address) -> bool;
    /// Whether the account is missing or has zero nonce, balance and code
    fn is_empty_account(&mut self, address: &Address) -> bool;

    /// Balance
    fn get_balance(&mut self, address: &Address) -> U256;
    /// Credit an account
    fn add_balance(&mut self, address: Address, amount: U256);
    /// Debit an account
    fn sub_balance(&mut self, address: Address, amount: U256);

    /// Nonce
    fn get_nonce(&mut self, address: &Address) -> u64;
    /// Set the nonce
    fn set_nonce(&mut self, address: Address, nonce: u64);
    /// Nonce of freshly created accounts
    fn starting_nonce(&self) -> u64;

    /// Code
    fn get_code(&mut self, address: &Address) -> Bytes;
    /// Code length
    fn get_code_size(&mut self, address: &Address) -> usize;
    /// Code hash, zero for missing accounts
    fn get_code_hash(&mut self, address: &Address) -> H256;
    /// Install code
    fn set_code(&mut self, address: Address, code: Bytes);

    /// Current storage value
    fn get_state(&mut self, address: &Address, key: &H256) -> H256;
    /// Storage value at the start of the transaction
    fn get_committed_state(&mut self, address: &Address, key: &H256) -> H256;
    /// Write storage
    fn set_state(&mut self, address: Address, key: H256, value: H256);

    /// Mark for deletion and zero the balance
    fn suicide(&mut self, address: &Address) -> bool;
    /// Whether already self-destructed in this transaction
    fn has_suicided(&mut self, address: &Address) -> bool;

    /// Add to the refund counter
    fn add_refund(&mut self, gas: u64);
    /// Subtract from the refund counter
    fn sub_refund(&mut self, gas: u64);
    /// Refund counter
    fn get_refund(&self) -> u64;

    /// Record a log
    fn add_log(&mut self, log: Log);

    /// Open a revision
    fn snapshot(&mut self) -> usize;
    /// Undo everything after `id`
    fn revert_to_snapshot(&mut self, id: usize) -> StateResult<()>;
}

impl StateAccess for StateDb {
    fn create_account(&mut self, address: Address) {
        StateDb::create_account(self, address)
    }

    fn exists(&mut self, address: &Address) -> bool {
        StateDb::exists(self, address)
    }

    fn is_empty_account(&mut self, address: &Address) -> bool {
        StateDb::is_empty_account(self, address)
    }

    fn get_balance(&mut self, address: &Address) -> U256 {
        StateDb::get_balance(self, address)
    }

    fn add_balance(&mut self, address: Address, amount: U256) {
        StateDb::add_balance(self, address, amount)
    }

    fn sub_balance(&mut self, address: Address, amount: U256) {
        StateDb::sub_balance(self, address, amount)
    }

    fn get_nonce(&mut self, address: &Address) -> u64 {
        StateDb::get_nonce(self, address)
    }

    fn set_nonce(&mut self, address: Address, nonce: u64) {
        StateDb::set_nonce(self, address, nonce)
    }

    fn starting_nonce(&self) -> u64 {
        self.config().starting_nonce
    }

    fn get_code(&mut self, address: &Address) -> Bytes {
        StateDb::get_code(self, address)
    }

    fn get_code_size(&mut self, address: &Address) -> usize {
        StateDb::get_code_size(self, address)
    }

    fn get_code_hash(&mut self, address: &Address) -> H256 {
        StateDb::get_code_hash(self, address)
    }

    fn set_code(&mut self, address: Address, code: Bytes) {
        StateDb::set_code(self, address, code)
    }

    fn get_state(&mut self, address: &Address, key: &H256) -> H256 {
        StateDb::get_state(self, address, key)
    }

    fn get_committed_state(&mut self, address: &Address, key: &H256) -> H256 {
        StateDb::get_committed_state(self, address, key)
    }

    fn set_state(&mut self, address: Address, key: H256, value: H256) {
        StateDb::set_state(self, address, key, value)
    }

    fn suicide(&mut self, address: &Address) -> bool {
        StateDb::suicide(self, address)
    }

    fn has_suicided(&mut self, address: &Address) -> bool {
        StateDb::has_suicided(self, address)
    }

    fn add_refund(&mut self, gas: u64) {
        StateDb::add_refund(self, gas)
    }

    fn sub_refund(&mut self, gas: u64) {
        StateDb::sub_refund(self, gas)
    }

    fn get_refund(&self) -> u64 {
        StateDb::get_refund(self)
    }

    fn add_log(&mut self, log: Log) {
        StateDb::add_log(self, log)
    }

    fn snapshot(&mut self) -> usize {
        StateDb::snapshot(self)
    }

    fn revert_to_snapshot(&mut self, id: usize) -> StateResult<()> {
        StateDb::revert_to_snapshot(self, id)
    }
}
