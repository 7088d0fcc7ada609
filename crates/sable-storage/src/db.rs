//! RocksDB-backed store

use crate::error::{StorageError, StorageResult};
use crate::traits::{BatchOp, KeyValueStore, WriteBatch};
use parking_lot::RwLock;
use rocksdb::{DBWithThreadMode, MultiThreaded, Options};
use std::path::Path;
use std::sync::Arc;

type RocksDB = DBWithThreadMode<MultiThreaded>;

/// Database configuration
#[derive(Clone, Debug)]
pub struct DbConfig {
    /// Create database if missing
    pub create_if_missing: bool,
    /// Maximum number of open files
    pub max_open_files: i32,
    /// Write buffer size
    pub write_buffer_size: usize,
    /// Maximum write buffers
    pub max_write_buffer_number: i32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            max_open_files: 512,
            write_buffer_size: 64 * 1024 * 1024, // 64MB
            max_write_buffer_number: 3,
        }
    }
}

/// RocksDB store. Cloning shares the underlying handle.
pub struct Database {
    db: Arc<RwLock<Option<RocksDB>>>,
    path: String,
}

impl Database {
    /// Create a database handle (not yet opened)
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            db: Arc::new(RwLock::new(None)),
            path: path.as_ref().to_string_lossy().to_string(),
        }
    }

    /// Open with default config
    pub fn open(&self) -> StorageResult<()> {
        self.open_with_config(DbConfig::default())
    }

    /// Open with custom config
    pub fn open_with_config(&self, config: DbConfig) -> StorageResult<()> {
        let mut guard = self.db.write();
        if guard.is_some() {
            return Err(StorageError::AlreadyOpen);
        }

        let mut opts = Options::default();
        opts.create_if_missing(config.create_if_missing);
        opts.set_max_open_files(config.max_open_files);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_max_write_buffer_number(config.max_write_buffer_number);

        *guard = Some(RocksDB::open(&opts, &self.path)?);
        tracing::debug!(path = %self.path, "database opened");
        Ok(())
    }

    /// Close the database
    pub fn close(&self) {
        *self.db.write() = None;
    }

    /// Check if database is open
    pub fn is_open(&self) -> bool {
        self.db.read().is_some()
    }

    /// Database path
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            path: self.path.clone(),
        }
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        let guard = self.db.read();
        let db = guard.as_ref().ok_or(StorageError::NotOpen)?;
        Ok(db.get(key)?)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        let guard = self.db.read();
        let db = guard.as_ref().ok_or(StorageError::NotOpen)?;
        db.put(key, value)?;
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> StorageResult<()> {
        let guard = self.db.read();
        let db = guard.as_ref().ok_or(StorageError::NotOpen)?;
        db.delete(key)?;
        Ok(())
    }

    fn write_batch(&self, batch: WriteBatch) -> StorageResult<()> {
        let guard = self.db.read();
        let db = guard.as_ref().ok_or(StorageError::NotOpen)?;

        let mut rocks_batch = rocksdb::WriteBatch::default();
        for op in batch.into_ops() {
            match op {
                BatchOp::Put { key, value } => rocks_batch.put(&key, &value),
                BatchOp::Delete { key } => rocks_batch.delete(&key),
            }
        }
        db.write(rocks_batch)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let db = Database::new(dir.path());
        db.open().unwrap();
        (dir, db)
    }

    #[test]
    fn test_open_close() {
        let dir = TempDir::new().unwrap();
        let db = Database::new(dir.path());

        assert!(!db.is_open());
        db.open().unwrap();
        assert!(db.is_open());
        db.close();
        assert!(!db.is_open());
    }

    #[test]
    fn test_put_get_delete() {
        let (_dir, db) = open_temp();

        db.put(b"key1", b"value1").unwrap();
        assert_eq!(db.get(b"key1").unwrap(), Some(b"value1".to_vec()));
        assert_eq!(db.get(b"missing").unwrap(), None);

        db.delete(b"key1").unwrap();
        assert!(db.get(b"key1").unwrap().is_none());
    }

    #[test]
    fn test_write_batch() {
        let (_dir, db) = open_temp();

        let mut batch = WriteBatch::new();
        batch.put(b"acc1", b"data1");
        batch.put(b"acc2", b"data2");
        batch.delete(b"acc1");
        db.write_batch(batch).unwrap();

        assert_eq!(db.get(b"acc1").unwrap(), None);
        assert_eq!(db.get(b"acc2").unwrap(), Some(b"data2".to_vec()));
    }

    #[test]
    fn test_not_open_error() {
        let db = Database::new("/tmp/sable_not_opened");
        assert!(matches!(db.get(b"key"), Err(StorageError::NotOpen)));
        assert!(matches!(db.put(b"key", b"v"), Err(StorageError::NotOpen)));
        assert!(matches!(db.write_batch(WriteBatch::new()), Err(StorageError::NotOpen)));
    }

    #[test]
    fn test_already_open_error() {
        let (_dir, db) = open_temp();
        assert!(matches!(db.open(), Err(StorageError::AlreadyOpen)));
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = TempDir::new().unwrap();
        let db = Database::new(dir.path());
        db.open().unwrap();
        db.put(b"key1", b"value1").unwrap();
        db.close();

        db.open().unwrap();
        assert_eq!(db.get(b"key1").unwrap(), Some(b"value1".to_vec()));
    }

    #[test]
    fn test_clone_shares_handle() {
        let (_dir, db) = open_temp();
        let other = db.clone();
        other.put(b"shared", b"yes").unwrap();
        assert_eq!(db.get(b"shared").unwrap(), Some(b"yes".to_vec()));
        other.close();
        assert!(!db.is_open());
    }
}
