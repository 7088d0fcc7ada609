//! Journaled state database

use crate::account::Account;
use crate::config::StateConfig;
use crate::dump::{build_dump, Dump};
use crate::error::{StateError, StateResult};
use crate::journal::{Journal, JournalEntry};
use crate::log::Log;
use crate::object::StateObject;
use bytes::Bytes;
use lru::LruCache;
use parking_lot::Mutex;
use sable_crypto::{keccak256, KECCAK_EMPTY};
use sable_primitives::{Address, H256, U256};
use sable_storage::{code_key, KeyValueStore, SecureTrie, WriteBatch};
use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::sync::Arc;

#[derive(Clone, Copy, Debug)]
struct Revision {
    id: usize,
    journal_index: usize,
}

/// World state for the transaction being executed.
///
/// Reads that hit a backing-store failure return zero/empty values; the
/// first such failure is kept and returned by the next [`StateDb::commit`].
pub struct StateDb {
    db: Arc<dyn KeyValueStore>,
    trie: SecureTrie,
    config: StateConfig,

    objects: HashMap<Address, StateObject>,
    dirty: HashSet<Address>,

    journal: Journal,
    valid_revisions: Vec<Revision>,
    next_revision_id: usize,

    refund: u64,

    tx_hash: H256,
    block_hash: H256,
    tx_index: usize,
    logs: Vec<Log>,
    log_size: usize,

    db_err: Option<StateError>,
    code_size_cache: Arc<Mutex<LruCache<H256, usize>>>,
}

impl StateDb {
    /// Open the state committed under `root`
    pub fn new(root: H256, db: Arc<dyn KeyValueStore>, config: StateConfig) -> StateResult<Self> {
        let trie = SecureTrie::open(Arc::clone(&db), root)?;
        Ok(Self::with_trie(trie, db, config))
    }

    /// Empty state on top of `db`
    pub fn empty(db: Arc<dyn KeyValueStore>, config: StateConfig) -> Self {
        let trie = SecureTrie::new(Arc::clone(&db));
        Self::with_trie(trie, db, config)
    }

    fn with_trie(trie: SecureTrie, db: Arc<dyn KeyValueStore>, config: StateConfig) -> Self {
        let capacity = NonZeroUsize::new(config.code_size_cache).unwrap_or(NonZeroUsize::MIN);
        Self {
            db,
            trie,
            config,
            objects: HashMap::new(),
            dirty: HashSet::new(),
            journal: Journal::new(),
            valid_revisions: Vec::new(),
            next_revision_id: 0,
            refund: 0,
            tx_hash: H256::zero(),
            block_hash: H256::zero(),
            tx_index: 0,
            logs: Vec::new(),
            log_size: 0,
            db_err: None,
            code_size_cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    /// Drop every cached object and reopen at `root`
    pub fn reset(&mut self, root: H256) -> StateResult<()> {
        self.trie = SecureTrie::open(Arc::clone(&self.db), root)?;
        self.objects.clear();
        self.dirty.clear();
        self.journal.clear();
        self.valid_revisions.clear();
        self.refund = 0;
        self.tx_hash = H256::zero();
        self.block_hash = H256::zero();
        self.tx_index = 0;
        self.logs.clear();
        self.log_size = 0;
        self.db_err = None;
        Ok(())
    }

    /// Configuration this state was built with
    pub fn config(&self) -> &StateConfig {
        &self.config
    }

    /// Backing store
    pub fn database(&self) -> &Arc<dyn KeyValueStore> {
        &self.db
    }

    fn set_error(&mut self, err: StateError) {
        if self.db_err.is_none() {
            tracing::warn!(error = %err, "state read failed, error deferred to commit");
            self.db_err = Some(err);
        }
    }

    /// First storage error seen since the last reset
    pub fn error(&self) -> Option<&StateError> {
        self.db_err.as_ref()
    }

    // ==================== Object access ====================

    fn state_object(&mut self, address: &Address) -> Option<&mut StateObject> {
        if !self.objects.contains_key(address) {
            let decoded = self.trie.get(address.as_bytes()).map(rlp::decode::<Account>);
            let data = match decoded {
                None => return None,
                Some(Ok(data)) => data,
                Some(Err(err)) => {
                    self.set_error(err.into());
                    return None;
                }
            };
            self.objects.insert(*address, StateObject::new(*address, data));
        }
        self.objects.get_mut(address).filter(|obj| !obj.deleted())
    }

    fn get_or_new_object(&mut self, address: Address) -> &mut StateObject {
        if self.state_object(&address).is_none() {
            self.create_object(address);
        }
        let nonce = self.config.starting_nonce;
        self.objects
            .entry(address)
            .or_insert_with(|| StateObject::new(address, Account::new(nonce)))
    }

    /// Replace whatever lives at `address` with a fresh object; returns the
    /// balance of a live predecessor.
    fn create_object(&mut self, address: Address) -> Option<U256> {
        let _ = self.state_object(&address);
        let fresh = StateObject::new(address, Account::new(self.config.starting_nonce));
        let prev = self.objects.insert(address, fresh);
        self.dirty.insert(address);
        match prev {
            Some(prev) => {
                let carried = (!prev.deleted()).then(|| prev.balance());
                self.journal.append(JournalEntry::ResetObject { prev: Box::new(prev) });
                carried
            }
            None => {
                self.journal.append(JournalEntry::CreateObject { address });
                None
            }
        }
    }

    /// Create (or overwrite) the account at `address`, keeping its balance
    pub fn create_account(&mut self, address: Address) {
        if let Some(balance) = self.create_object(address) {
            if let Some(obj) = self.objects.get_mut(&address) {
                obj.set_balance(balance);
            }
        }
    }

    // ==================== Reads ====================

    /// Whether the account exists (self-destructed accounts still do until pruned)
    pub fn exists(&mut self, address: &Address) -> bool {
        self.state_object(address).is_some()
    }

    /// Account record, `None` if missing. The storage root is only current
    /// after the next root computation.
    pub fn get_account(&mut self, address: &Address) -> Option<Account> {
        self.state_object(address).map(|obj| obj.account().clone())
    }

    /// Whether the account is missing or has zero nonce, balance and code
    pub fn is_empty_account(&mut self, address: &Address) -> bool {
        self.state_object(address).map_or(true, |obj| obj.is_empty())
    }

    /// Balance, zero for missing accounts
    pub fn get_balance(&mut self, address: &Address) -> U256 {
        self.state_object(address).map_or(U256::zero(), |obj| obj.balance())
    }

    /// Nonce, the starting nonce for missing accounts
    pub fn get_nonce(&mut self, address: &Address) -> u64 {
        let starting = self.config.starting_nonce;
        self.state_object(address).map_or(starting, |obj| obj.nonce())
    }

    /// Code hash, zero for missing accounts
    pub fn get_code_hash(&mut self, address: &Address) -> H256 {
        self.state_object(address).map_or(H256::zero(), |obj| obj.code_hash())
    }

    /// Contract code
    pub fn get_code(&mut self, address: &Address) -> Bytes {
        let db = Arc::clone(&self.db);
        let result = match self.state_object(address) {
            Some(obj) => obj.code(&db),
            None => return Bytes::new(),
        };
        result.unwrap_or_else(|err| {
            self.set_error(err);
            Bytes::new()
        })
    }

    /// Length of the contract code
    pub fn get_code_size(&mut self, address: &Address) -> usize {
        let (hash, cached) = match self.state_object(address) {
            Some(obj) => (obj.code_hash(), obj.cached_code().map(|c| c.len())),
            None => return 0,
        };
        if let Some(len) = cached {
            return len;
        }
        if hash == KECCAK_EMPTY {
            return 0;
        }
        if let Some(len) = self.code_size_cache.lock().get(&hash) {
            return *len;
        }
        match self.db.get(&code_key(&hash)) {
            Ok(code) => {
                let len = code.map_or(0, |c| c.len());
                self.code_size_cache.lock().put(hash, len);
                len
            }
            Err(err) => {
                self.set_error(err.into());
                0
            }
        }
    }

    /// Current value of a storage slot
    pub fn get_state(&mut self, address: &Address, key: &H256) -> H256 {
        let db = Arc::clone(&self.db);
        let result = match self.state_object(address) {
            Some(obj) => obj.get_state(&db, key),
            None => return H256::zero(),
        };
        result.unwrap_or_else(|err| {
            self.set_error(err);
            H256::zero()
        })
    }

    /// Value of a storage slot at the start of the transaction
    pub fn get_committed_state(&mut self, address: &Address, key: &H256) -> H256 {
        let db = Arc::clone(&self.db);
        let result = match self.state_object(address) {
            Some(obj) => obj.get_committed_state(&db, key),
            None => return H256::zero(),
        };
        result.unwrap_or_else(|err| {
            self.set_error(err);
            H256::zero()
        })
    }

    /// Whether SELFDESTRUCT ran on the account in this transaction
    pub fn has_suicided(&mut self, address: &Address) -> bool {
        self.state_object(address).map_or(false, |obj| obj.suicided())
    }

    /// Visit the account's storage until `f` returns false
    pub fn for_each_storage<F>(&mut self, address: &Address, mut f: F)
    where
        F: FnMut(H256, H256) -> bool,
    {
        let db = Arc::clone(&self.db);
        let result = match self.state_object(address) {
            Some(obj) => obj.storage_entries(&db),
            None => return,
        };
        match result {
            Ok(entries) => {
                for (key, value) in entries {
                    if !f(key, value) {
                        break;
                    }
                }
            }
            Err(err) => self.set_error(err),
        }
    }

    // ==================== Writes ====================

    fn update_balance<F: FnOnce(U256) -> U256>(&mut self, address: Address, f: F) {
        let prev = self.get_or_new_object(address).balance();
        self.journal.append(JournalEntry::BalanceChange { address, prev });
        self.dirty.insert(address);
        self.get_or_new_object(address).set_balance(f(prev));
    }

    /// Credit `amount`
    pub fn add_balance(&mut self, address: Address, amount: U256) {
        self.update_balance(address, |prev| prev.saturating_add(amount));
    }

    /// Debit `amount`; callers check sufficiency first
    pub fn sub_balance(&mut self, address: Address, amount: U256) {
        self.update_balance(address, |prev| prev.saturating_sub(amount));
    }

    /// Overwrite the balance
    pub fn set_balance(&mut self, address: Address, amount: U256) {
        self.update_balance(address, |_| amount);
    }

    /// Overwrite the nonce
    pub fn set_nonce(&mut self, address: Address, nonce: u64) {
        let prev = self.get_or_new_object(address).nonce();
        self.journal.append(JournalEntry::NonceChange { address, prev });
        self.dirty.insert(address);
        self.get_or_new_object(address).set_nonce(nonce);
    }

    /// Replace the account's code
    pub fn set_code(&mut self, address: Address, code: Bytes) {
        let db = Arc::clone(&self.db);
        let obj = self.get_or_new_object(address);
        let prev_hash = obj.code_hash();
        let prev_code = obj.code(&db);
        let prev_code = prev_code.unwrap_or_else(|err| {
            self.set_error(err);
            Bytes::new()
        });
        self.journal.append(JournalEntry::CodeChange {
            address,
            prev_code,
            prev_hash,
        });
        self.dirty.insert(address);
        let hash = keccak256(&code);
        self.get_or_new_object(address).set_code(hash, code);
    }

    /// Write a storage slot
    pub fn set_state(&mut self, address: Address, key: H256, value: H256) {
        let prev = self.get_state(&address, &key);
        self.journal.append(JournalEntry::StorageChange { address, key, prev });
        self.dirty.insert(address);
        self.get_or_new_object(address).set_state(key, value);
    }

    /// Mark the account self-destructed and zero its balance.
    ///
    /// Returns false if the account does not exist.
    pub fn suicide(&mut self, address: &Address) -> bool {
        let (prev, prev_balance) = match self.state_object(address) {
            Some(obj) => (obj.suicided(), obj.balance()),
            None => return false,
        };
        self.journal.append(JournalEntry::Suicide {
            address: *address,
            prev,
            prev_balance,
        });
        self.dirty.insert(*address);
        if let Some(obj) = self.objects.get_mut(address) {
            obj.set_suicided(true);
            obj.set_balance(U256::zero());
        }
        true
    }

    // ==================== Refunds and logs ====================

    /// Increase the refund counter
    pub fn add_refund(&mut self, gas: u64) {
        self.journal.append(JournalEntry::RefundChange { prev: self.refund });
        self.refund = self.refund.saturating_add(gas);
    }

    /// Decrease the refund counter
    pub fn sub_refund(&mut self, gas: u64) {
        self.journal.append(JournalEntry::RefundChange { prev: self.refund });
        if gas > self.refund {
            tracing::warn!(gas, refund = self.refund, "refund counter below zero");
        }
        self.refund = self.refund.saturating_sub(gas);
    }

    /// Current refund counter
    pub fn get_refund(&self) -> u64 {
        self.refund
    }

    /// Set the transaction context attached to subsequently emitted logs
    pub fn prepare(&mut self, tx_hash: H256, block_hash: H256, tx_index: usize) {
        self.tx_hash = tx_hash;
        self.block_hash = block_hash;
        self.tx_index = tx_index;
    }

    /// Record a log, stamping it with the current transaction context
    pub fn add_log(&mut self, mut log: Log) {
        self.journal.append(JournalEntry::AddLog { tx_hash: self.tx_hash });
        log.tx_hash = self.tx_hash;
        log.block_hash = self.block_hash;
        log.tx_index = self.tx_index;
        log.index = self.log_size;
        self.logs.push(log);
        self.log_size += 1;
    }

    /// Logs emitted by transaction `tx_hash`
    pub fn get_logs(&self, tx_hash: &H256) -> Vec<Log> {
        self.logs.iter().filter(|l| l.tx_hash == *tx_hash).cloned().collect()
    }

    /// Every log recorded, in emission order
    pub fn logs(&self) -> &[Log] {
        &self.logs
    }

    // ==================== Snapshots ====================

    /// Mark the current journal position
    pub fn snapshot(&mut self) -> usize {
        let id = self.next_revision_id;
        self.next_revision_id += 1;
        self.valid_revisions.push(Revision {
            id,
            journal_index: self.journal.len(),
        });
        id
    }

    /// Undo every change made since snapshot `id`.
    ///
    /// Snapshots taken after `id` become invalid.
    pub fn revert_to_snapshot(&mut self, id: usize) -> StateResult<()> {
        let idx = self
            .valid_revisions
            .binary_search_by_key(&id, |r| r.id)
            .map_err(|_| StateError::UnknownRevision(id))?;
        let journal_index = self.valid_revisions[idx].journal_index;

        let undone = self.journal.rewind_to(journal_index);
        tracing::debug!(id, entries = undone.len(), "reverting to snapshot");
        for entry in undone {
            self.undo(entry);
        }
        self.valid_revisions.truncate(idx);
        Ok(())
    }

    fn undo(&mut self, entry: JournalEntry) {
        match entry {
            JournalEntry::CreateObject { address } => {
                self.objects.remove(&address);
                self.dirty.remove(&address);
            }
            JournalEntry::ResetObject { prev } => {
                self.objects.insert(prev.address(), *prev);
            }
            JournalEntry::Suicide {
                address,
                prev,
                prev_balance,
            } => {
                if let Some(obj) = self.objects.get_mut(&address) {
                    obj.set_suicided(prev);
                    obj.set_balance(prev_balance);
                }
            }
            JournalEntry::BalanceChange { address, prev } => {
                if let Some(obj) = self.objects.get_mut(&address) {
                    obj.set_balance(prev);
                }
            }
            JournalEntry::NonceChange { address, prev } => {
                if let Some(obj) = self.objects.get_mut(&address) {
                    obj.set_nonce(prev);
                }
            }
            JournalEntry::StorageChange { address, key, prev } => {
                if let Some(obj) = self.objects.get_mut(&address) {
                    obj.set_state(key, prev);
                }
            }
            JournalEntry::CodeChange {
                address,
                prev_code,
                prev_hash,
            } => {
                if let Some(obj) = self.objects.get_mut(&address) {
                    obj.set_code(prev_hash, prev_code);
                }
            }
            JournalEntry::RefundChange { prev } => {
                self.refund = prev;
            }
            JournalEntry::AddLog { .. } => {
                self.logs.pop();
                self.log_size = self.log_size.saturating_sub(1);
            }
        }
    }

    fn clear_journal_and_refund(&mut self) {
        self.journal.clear();
        self.valid_revisions.clear();
        self.refund = 0;
    }

    // ==================== Finalisation ====================

    /// Fold dirty objects into the account trie and return its root.
    ///
    /// Self-destructed accounts are removed. This closes the transaction:
    /// earlier snapshots can no longer be reverted.
    pub fn intermediate_root(&mut self) -> H256 {
        let mut addresses: Vec<Address> = self.dirty.iter().copied().collect();
        addresses.sort();

        let mut first_err = None;
        for address in addresses {
            let Some(obj) = self.objects.get_mut(&address) else {
                continue;
            };
            if obj.suicided() || obj.deleted() {
                obj.mark_deleted();
                self.trie.delete(address.as_bytes());
                continue;
            }
            if let Err(err) = obj.update_root(&self.db) {
                if first_err.is_none() {
                    first_err = Some(err);
                }
            }
            self.trie.update(address.as_bytes(), &rlp::encode(obj.account()));
        }
        if let Some(err) = first_err {
            self.set_error(err);
        }
        self.clear_journal_and_refund();
        self.trie.root()
    }

    /// Hide self-destructed accounts from further queries
    pub fn delete_suicides(&mut self) {
        for obj in self.objects.values_mut() {
            if obj.suicided() {
                obj.mark_deleted();
            }
        }
    }

    /// Write all changes to the backing store and return the new root
    pub fn commit(&mut self) -> StateResult<H256> {
        let (root, batch) = self.commit_batch()?;
        self.db.write_batch(batch)?;
        Ok(root)
    }

    /// Compute the new root and collect the writes without applying them.
    /// A deferred read error fails every commit until the state is reset.
    pub fn commit_batch(&mut self) -> StateResult<(H256, WriteBatch)> {
        if let Some(err) = &self.db_err {
            return Err(err.replay());
        }

        let mut batch = WriteBatch::new();
        let mut removed = Vec::new();
        for (address, obj) in self.objects.iter_mut() {
            if obj.suicided() || obj.deleted() {
                self.trie.delete(address.as_bytes());
                removed.push(*address);
            } else if self.dirty.contains(address) {
                obj.commit(&self.db, &mut batch)?;
                self.trie.update(address.as_bytes(), &rlp::encode(obj.account()));
            }
        }
        for address in &removed {
            self.objects.remove(address);
        }

        let dirty = self.dirty.len();
        self.dirty.clear();
        self.clear_journal_and_refund();

        let root = self.trie.commit_to(&mut batch);
        tracing::debug!(?root, dirty, removed = removed.len(), "state committed");
        Ok((root, batch))
    }

    /// Independent copy sharing the backing store and committed trie data
    pub fn copy(&self) -> StateDb {
        let objects = self
            .dirty
            .iter()
            .filter_map(|addr| self.objects.get(addr).map(|obj| (*addr, obj.clone())))
            .collect();
        StateDb {
            db: Arc::clone(&self.db),
            trie: self.trie.clone(),
            config: self.config.clone(),
            objects,
            dirty: self.dirty.clone(),
            journal: Journal::new(),
            valid_revisions: Vec::new(),
            next_revision_id: 0,
            refund: self.refund,
            tx_hash: self.tx_hash,
            block_hash: self.block_hash,
            tx_index: self.tx_index,
            logs: self.logs.clone(),
            log_size: self.log_size,
            db_err: None,
            code_size_cache: Arc::clone(&self.code_size_cache),
        }
    }

    /// Dump the committed state
    pub fn dump(&mut self) -> StateResult<Dump> {
        let root = self.trie.root();
        build_dump(root, &self.trie, &self.db)
    }
}
