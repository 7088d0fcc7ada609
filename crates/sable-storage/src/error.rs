//! Storage error types

use sable_primitives::H256;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// RocksDB error
    #[error("rocksdb error: {0}")]
    RocksDb(#[from] rocksdb::Error),

    /// A trie root was requested that the store does not hold
    #[error("missing trie node: {0:?}")]
    MissingTrieNode(H256),

    /// Stored bytes could not be decoded
    #[error("decode error: {0}")]
    Decode(#[from] rlp::DecoderError),

    /// Database not open
    #[error("database not open")]
    NotOpen,

    /// Database already open
    #[error("database already open")]
    AlreadyOpen,

    /// Injected or backend-specific failure
    #[error("backend error: {0}")]
    Backend(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
