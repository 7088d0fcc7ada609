//! Backing store abstraction

use crate::error::StorageResult;

/// Byte-keyed store with atomic batch writes
pub trait KeyValueStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Write a value
    fn put(&self, key: &[u8], value: &[u8]) -> StorageResult<()>;

    /// Remove a value
    fn delete(&self, key: &[u8]) -> StorageResult<()>;

    /// Apply every operation of `batch` atomically
    fn write_batch(&self, batch: WriteBatch) -> StorageResult<()>;

    /// Whether a key is present
    fn contains(&self, key: &[u8]) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Batch operation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchOp {
    /// Insert or overwrite
    Put {
        /// Key
        key: Vec<u8>,
        /// Value
        value: Vec<u8>,
    },
    /// Remove
    Delete {
        /// Key
        key: Vec<u8>,
    },
}

/// Pending writes applied together by [`KeyValueStore::write_batch`]
#[derive(Clone, Debug, Default)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a put
    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        self.ops.push(BatchOp::Put {
            key: key.to_vec(),
            value: value.to_vec(),
        });
    }

    /// Queue a delete
    pub fn delete(&mut self, key: &[u8]) {
        self.ops.push(BatchOp::Delete { key: key.to_vec() });
    }

    /// Append all operations of another batch
    pub fn extend(&mut self, other: WriteBatch) {
        self.ops.extend(other.ops);
    }

    /// Number of queued operations
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Queued operations in insertion order
    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    /// Consume the batch
    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_records_in_order() {
        let mut batch = WriteBatch::new();
        assert!(batch.is_empty());
        batch.put(b"a", b"1");
        batch.delete(b"b");
        assert_eq!(batch.len(), 2);
        assert_eq!(
            batch.ops()[1],
            BatchOp::Delete { key: b"b".to_vec() }
        );
    }

    #[test]
    fn test_batch_extend() {
        let mut a = WriteBatch::new();
        a.put(b"a", b"1");
        let mut b = WriteBatch::new();
        b.put(b"b", b"2");
        b.put(b"c", b"3");
        a.extend(b);
        assert_eq!(a.len(), 3);
    }
}
