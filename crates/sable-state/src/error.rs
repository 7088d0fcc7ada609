//! State error types

use sable_storage::StorageError;
use thiserror::Error;

/// State database errors
#[derive(Debug, Error)]
pub enum StateError {
    /// Backing store or trie failure
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A stored account record could not be decoded
    #[error("rlp decode error: {0}")]
    Decode(#[from] rlp::DecoderError),

    /// Revert to a snapshot id that was never taken or is already superseded
    #[error("revision id {0} cannot be reverted")]
    UnknownRevision(usize),
}

impl StateError {
    /// Owned copy of a deferred error, so it can be reported on every commit
    pub(crate) fn replay(&self) -> StateError {
        match self {
            StateError::Storage(StorageError::Backend(msg)) => {
                StateError::Storage(StorageError::Backend(msg.clone()))
            }
            StateError::Storage(StorageError::MissingTrieNode(root)) => {
                StateError::Storage(StorageError::MissingTrieNode(*root))
            }
            StateError::Decode(err) => StateError::Decode(err.clone()),
            StateError::UnknownRevision(id) => StateError::UnknownRevision(*id),
            other => StateError::Storage(StorageError::Backend(other.to_string())),
        }
    }
}

/// Result type for state operations
pub type StateResult<T> = Result<T, StateError>;
