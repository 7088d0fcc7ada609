//! A single live account

use crate::account::Account;
use crate::error::StateResult;
use bytes::Bytes;
use rlp::Rlp;
use sable_crypto::KECCAK_EMPTY;
use sable_primitives::{h256_to_word, word_to_h256, Address, H256, U256};
use sable_storage::{code_key, KeyValueStore, SecureTrie, WriteBatch};
use std::collections::HashMap;
use std::sync::Arc;

/// In-memory account with lazily loaded code and storage.
///
/// `origin_storage` caches committed slot values; `dirty_storage` holds
/// writes made since the last trie update.
#[derive(Clone, Debug)]
pub struct StateObject {
    address: Address,
    data: Account,
    code: Option<Bytes>,
    trie: Option<SecureTrie>,
    origin_storage: HashMap<H256, H256>,
    dirty_storage: HashMap<H256, H256>,
    dirty_code: bool,
    suicided: bool,
    deleted: bool,
}

impl StateObject {
    /// Wrap an account record
    pub fn new(address: Address, data: Account) -> Self {
        Self {
            address,
            data,
            code: None,
            trie: None,
            origin_storage: HashMap::new(),
            dirty_storage: HashMap::new(),
            dirty_code: false,
            suicided: false,
            deleted: false,
        }
    }

    /// Account address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Account record as last written
    pub fn account(&self) -> &Account {
        &self.data
    }

    /// Balance
    pub fn balance(&self) -> U256 {
        self.data.balance
    }

    /// Nonce
    pub fn nonce(&self) -> u64 {
        self.data.nonce
    }

    /// Code hash
    pub fn code_hash(&self) -> H256 {
        self.data.code_hash
    }

    /// Zero nonce, zero balance and no code
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether SELFDESTRUCT ran on this account in the current transaction
    pub fn suicided(&self) -> bool {
        self.suicided
    }

    /// Whether the object was pruned and should no longer be visible
    pub fn deleted(&self) -> bool {
        self.deleted
    }

    pub(crate) fn set_balance(&mut self, balance: U256) {
        self.data.balance = balance;
    }

    pub(crate) fn set_nonce(&mut self, nonce: u64) {
        self.data.nonce = nonce;
    }

    pub(crate) fn set_code(&mut self, code_hash: H256, code: Bytes) {
        self.data.code_hash = code_hash;
        self.code = Some(code);
        self.dirty_code = true;
    }

    pub(crate) fn set_suicided(&mut self, suicided: bool) {
        self.suicided = suicided;
    }

    pub(crate) fn mark_deleted(&mut self) {
        self.deleted = true;
    }

    pub(crate) fn set_state(&mut self, key: H256, value: H256) {
        self.dirty_storage.insert(key, value);
    }

    /// Loaded code, if already in memory
    pub fn cached_code(&self) -> Option<&Bytes> {
        self.code.as_ref()
    }

    /// Contract code, loading it from the store on first access
    pub fn code(&mut self, db: &Arc<dyn KeyValueStore>) -> StateResult<Bytes> {
        if let Some(code) = &self.code {
            return Ok(code.clone());
        }
        if self.data.code_hash == KECCAK_EMPTY {
            return Ok(Bytes::new());
        }
        let code = Bytes::from(db.get(&code_key(&self.data.code_hash))?.unwrap_or_default());
        self.code = Some(code.clone());
        Ok(code)
    }

    fn open_trie(&mut self, db: &Arc<dyn KeyValueStore>) -> StateResult<&mut SecureTrie> {
        let trie = match self.trie.take() {
            Some(trie) => trie,
            None => SecureTrie::open(Arc::clone(db), self.data.storage_root)?,
        };
        Ok(self.trie.insert(trie))
    }

    /// Current value of a slot, including uncommitted writes
    pub fn get_state(&mut self, db: &Arc<dyn KeyValueStore>, key: &H256) -> StateResult<H256> {
        if let Some(value) = self.dirty_storage.get(key) {
            return Ok(*value);
        }
        self.get_committed_state(db, key)
    }

    /// Value of a slot as of the last trie update
    pub fn get_committed_state(&mut self, db: &Arc<dyn KeyValueStore>, key: &H256) -> StateResult<H256> {
        if let Some(value) = self.origin_storage.get(key) {
            return Ok(*value);
        }
        let value = match self.open_trie(db)?.get(key.as_bytes()) {
            Some(raw) => {
                let word: U256 = Rlp::new(raw).as_val()?;
                word_to_h256(&word)
            }
            None => H256::zero(),
        };
        tracing::trace!(address = ?self.address, ?key, ?value, "storage slot loaded");
        self.origin_storage.insert(*key, value);
        Ok(value)
    }

    /// Whether there are uncommitted storage writes
    pub fn has_dirty_storage(&self) -> bool {
        !self.dirty_storage.is_empty()
    }

    /// Move dirty slots into the storage trie
    pub fn update_trie(&mut self, db: &Arc<dyn KeyValueStore>) -> StateResult<()> {
        if self.dirty_storage.is_empty() {
            return Ok(());
        }
        let dirty: Vec<(H256, H256)> = self.dirty_storage.drain().collect();
        let trie = self.open_trie(db)?;
        for (key, value) in &dirty {
            if value.is_zero() {
                trie.delete(key.as_bytes());
            } else {
                trie.update(key.as_bytes(), &rlp::encode(&h256_to_word(value)));
            }
        }
        self.origin_storage.extend(dirty);
        Ok(())
    }

    /// Apply dirty slots and refresh `storage_root`
    pub fn update_root(&mut self, db: &Arc<dyn KeyValueStore>) -> StateResult<()> {
        self.update_trie(db)?;
        if let Some(trie) = self.trie.as_mut() {
            self.data.storage_root = trie.root();
        }
        Ok(())
    }

    /// Queue storage nodes and dirty code into `batch`
    pub fn commit(&mut self, db: &Arc<dyn KeyValueStore>, batch: &mut WriteBatch) -> StateResult<()> {
        self.update_trie(db)?;
        if let Some(trie) = self.trie.as_mut() {
            self.data.storage_root = trie.commit_to(batch);
        }
        if self.dirty_code {
            if let Some(code) = &self.code {
                batch.put(&code_key(&self.data.code_hash), code);
            }
            self.dirty_code = false;
        }
        Ok(())
    }

    /// Committed slots overlaid with dirty writes, in key order
    pub fn storage_entries(&mut self, db: &Arc<dyn KeyValueStore>) -> StateResult<Vec<(H256, H256)>> {
        let mut entries: Vec<(H256, H256)> = Vec::new();
        for (key, raw) in self.open_trie(db)?.iter() {
            let word: U256 = Rlp::new(raw).as_val()?;
            entries.push((H256::from_slice(key), word_to_h256(&word)));
        }
        for (key, value) in entries.iter_mut() {
            if let Some(dirty) = self.dirty_storage.get(key) {
                *value = *dirty;
            }
        }
        Ok(entries)
    }
}
