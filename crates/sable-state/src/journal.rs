//! Change journal backing snapshot/revert

use crate::object::StateObject;
use bytes::Bytes;
use sable_primitives::{Address, H256, U256};

/// One reversible state change, holding the value it replaced
#[derive(Clone, Debug)]
pub enum JournalEntry {
    /// A new object was created where none existed
    CreateObject {
        /// Address of the created object
        address: Address,
    },
    /// An existing object was replaced by a fresh one
    ResetObject {
        /// The replaced object
        prev: Box<StateObject>,
    },
    /// Account self-destructed
    Suicide {
        /// Account
        address: Address,
        /// Suicide flag before
        prev: bool,
        /// Balance before
        prev_balance: U256,
    },
    /// Balance changed
    BalanceChange {
        /// Account
        address: Address,
        /// Balance before
        prev: U256,
    },
    /// Nonce changed
    NonceChange {
        /// Account
        address: Address,
        /// Nonce before
        prev: u64,
    },
    /// Storage slot written
    StorageChange {
        /// Account
        address: Address,
        /// Slot
        key: H256,
        /// Value before
        prev: H256,
    },
    /// Code replaced
    CodeChange {
        /// Account
        address: Address,
        /// Code before
        prev_code: Bytes,
        /// Code hash before
        prev_hash: H256,
    },
    /// Refund counter changed
    RefundChange {
        /// Counter before
        prev: u64,
    },
    /// Log appended
    AddLog {
        /// Transaction the log belongs to
        tx_hash: H256,
    },
}

impl JournalEntry {
    /// Account touched by this entry, if any
    pub fn address(&self) -> Option<Address> {
        match self {
            JournalEntry::CreateObject { address }
            | JournalEntry::Suicide { address, .. }
            | JournalEntry::BalanceChange { address, .. }
            | JournalEntry::NonceChange { address, .. }
            | JournalEntry::StorageChange { address, .. }
            | JournalEntry::CodeChange { address, .. } => Some(*address),
            JournalEntry::ResetObject { prev } => Some(prev.address()),
            JournalEntry::RefundChange { .. } | JournalEntry::AddLog { .. } => None,
        }
    }
}

/// Ordered list of [`JournalEntry`]
#[derive(Clone, Debug, Default)]
pub struct Journal {
    entries: Vec<JournalEntry>,
}

impl Journal {
    /// Empty journal
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change
    pub fn append(&mut self, entry: JournalEntry) {
        self.entries.push(entry);
    }

    /// Number of recorded changes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return every entry from `index` on, newest first
    pub fn rewind_to(&mut self, index: usize) -> Vec<JournalEntry> {
        let mut undone = self.entries.split_off(index.min(self.entries.len()));
        undone.reverse();
        undone
    }

    /// Drop all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
