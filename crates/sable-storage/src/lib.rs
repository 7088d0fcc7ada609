//! # sable-storage
//!
//! Persistence layer underneath the Sable state database.
//!
//! - [`KeyValueStore`]: byte-keyed get/put/delete with atomic batches
//! - [`MemoryDatabase`]: in-process store for tests and ephemeral runs
//! - [`Database`]: RocksDB-backed store
//! - [`SecureTrie`]: keccak-keyed trie producing Merkle-Patricia roots

#![warn(missing_docs)]
#![warn(clippy::all)]

mod db;
mod error;
mod memory;
mod traits;
mod trie;

pub use db::{Database, DbConfig};
pub use error::{StorageError, StorageResult};
pub use memory::MemoryDatabase;
pub use traits::{BatchOp, KeyValueStore, WriteBatch};
pub use trie::{code_key, KeccakHasher, SecureTrie};

/// Key prefixes used inside a [`KeyValueStore`]
pub mod prefix {
    /// Trie node sets, followed by the 32-byte root
    pub const TRIE: &[u8] = b"t";
    /// Contract code, followed by the 32-byte code hash
    pub const CODE: &[u8] = b"c";
}
