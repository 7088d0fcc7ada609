//! In-memory key-value store

use crate::error::StorageResult;
use crate::traits::{BatchOp, KeyValueStore, WriteBatch};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Thread-safe in-memory store
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    data: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryDatabase {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Sorted snapshot of all keys
    pub fn keys(&self) -> Vec<Vec<u8>> {
        let mut keys: Vec<_> = self.data.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl KeyValueStore for MemoryDatabase {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.data.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> StorageResult<()> {
        self.data.write().remove(key);
        Ok(())
    }

    fn write_batch(&self, batch: WriteBatch) -> StorageResult<()> {
        let mut data = self.data.write();
        for op in batch.into_ops() {
            match op {
                BatchOp::Put { key, value } => {
                    data.insert(key, value);
                }
                BatchOp::Delete { key } => {
                    data.remove(&key);
                }
            }
        }
        Ok(())
    }
}
