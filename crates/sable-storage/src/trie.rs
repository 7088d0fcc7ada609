//! Secure (keccak-keyed) trie
//!
//! Entries are kept as a sorted map of raw key to value. The Merkle-Patricia
//! root is computed over `keccak256(key) -> value` with `triehash`, and a
//! committed trie is persisted as a single node set under `t ++ root` so it
//! can be reopened from its root alone.

use crate::error::{StorageError, StorageResult};
use crate::prefix;
use crate::traits::{KeyValueStore, WriteBatch};
use plain_hasher::PlainHasher;
use rlp::{Rlp, RlpStream};
use sable_crypto::{keccak256, KECCAK_NULL_RLP};
use sable_primitives::H256;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Keccak-256 hasher for `triehash`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeccakHasher;

impl hash_db::Hasher for KeccakHasher {
    type Out = H256;
    type StdHasher = PlainHasher;
    const LENGTH: usize = 32;

    fn hash(x: &[u8]) -> H256 {
        keccak256(x)
    }
}

fn node_set_key(root: &H256) -> Vec<u8> {
    [prefix::TRIE, root.as_bytes()].concat()
}

/// Store key of the code blob with hash `code_hash`
pub fn code_key(code_hash: &H256) -> Vec<u8> {
    [prefix::CODE, code_hash.as_bytes()].concat()
}

/// Keccak-keyed trie over a [`KeyValueStore`]
#[derive(Clone)]
pub struct SecureTrie {
    db: Arc<dyn KeyValueStore>,
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
    cached_root: Option<H256>,
}

impl fmt::Debug for SecureTrie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureTrie")
            .field("entries", &self.entries.len())
            .field("cached_root", &self.cached_root)
            .finish()
    }
}

impl SecureTrie {
    /// Empty trie
    pub fn new(db: Arc<dyn KeyValueStore>) -> Self {
        Self {
            db,
            entries: BTreeMap::new(),
            cached_root: Some(KECCAK_NULL_RLP),
        }
    }

    /// Open the trie committed under `root`.
    ///
    /// The empty root (and the zero hash) always opens as an empty trie.
    pub fn open(db: Arc<dyn KeyValueStore>, root: H256) -> StorageResult<Self> {
        if root == KECCAK_NULL_RLP || root.is_zero() {
            return Ok(Self::new(db));
        }
        let encoded = db
            .get(&node_set_key(&root))?
            .ok_or(StorageError::MissingTrieNode(root))?;

        let mut entries = BTreeMap::new();
        for item in Rlp::new(&encoded).iter() {
            let key: Vec<u8> = item.val_at(0)?;
            let value: Vec<u8> = item.val_at(1)?;
            entries.insert(key, value);
        }
        tracing::trace!(?root, entries = entries.len(), "trie opened");

        Ok(Self {
            db,
            entries,
            cached_root: Some(root),
        })
    }

    /// Value stored under `key`
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Insert or overwrite; an empty value deletes the key
    pub fn update(&mut self, key: &[u8], value: &[u8]) {
        if value.is_empty() {
            self.delete(key);
            return;
        }
        self.entries.insert(key.to_vec(), value.to_vec());
        self.cached_root = None;
    }

    /// Remove `key`
    pub fn delete(&mut self, key: &[u8]) {
        if self.entries.remove(key).is_some() {
            self.cached_root = None;
        }
    }

    /// Current root hash
    pub fn root(&mut self) -> H256 {
        if let Some(root) = self.cached_root {
            return root;
        }
        let root = triehash::sec_trie_root::<KeccakHasher, _, _, _>(
            self.entries.iter().map(|(k, v)| (k.as_slice(), v.as_slice())),
        );
        self.cached_root = Some(root);
        root
    }

    /// Queue this trie's node set into `batch` and return its root
    pub fn commit_to(&mut self, batch: &mut WriteBatch) -> H256 {
        let root = self.root();
        if root != KECCAK_NULL_RLP {
            let mut stream = RlpStream::new_list(self.entries.len());
            for (key, value) in &self.entries {
                stream.begin_list(2);
                stream.append(key);
                stream.append(value);
            }
            batch.put(&node_set_key(&root), &stream.out());
            tracing::trace!(?root, entries = self.entries.len(), "trie committed");
        }
        root
    }

    /// Iterate raw keys and values in key order
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.entries.iter().map(|(k, v)| (k.as_slice(), v.as_slice()))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the trie holds nothing
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Backing store
    pub fn db(&self) -> &Arc<dyn KeyValueStore> {
        &self.db
    }
}
