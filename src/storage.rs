//! Storage layer using RocksDB.

use crate::errors::{CasinoResult, StorageError};
use rocksdb::{Direction, IteratorMode, Options, WriteBatch, DB};
use std::path::Path;
use std::sync::Arc;

#[derive(Clone)]
pub struct Storage {
    db: Arc<DB>,
}

impl Storage {
    pub fn open<P: AsRef<Path>>(path: P) -> CasinoResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);

        let db = DB::open(&opts, path)
            .map_err(|e| StorageError::OpenFailed(e.to_string()))?;
        Ok(Self { db: Arc::new(db) })
    }

    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.db.get(key).ok().flatten()
    }

    pub fn put(&self, key: &[u8], value: &[u8]) -> CasinoResult<()> {
        self.db
            .put(key, value)
            .map_err(|e| StorageError::WriteFailed(e.to_string()).into())
    }

    pub fn delete(&self, key: &[u8]) -> CasinoResult<()> {
        self.db
            .delete(key)
            .map_err(|e| StorageError::WriteFailed(e.to_string()).into())
    }

    /// Write all items in one atomic batch.
    pub fn batch_write(&self, items: &[(Vec<u8>, Vec<u8>)]) -> CasinoResult<()> {
        let mut batch = WriteBatch::default();
        for (key, value) in items {
            batch.put(key, value);
        }
        self.db
            .write(batch)
            .map_err(|e| StorageError::WriteFailed(e.to_string()).into())
    }

    /// Scan key/value pairs under a prefix in key order, up to `limit`.
    pub fn scan_prefix(&self, prefix: &[u8], limit: usize) -> Vec<(Vec<u8>, Vec<u8>)> {
        let mut rows = Vec::new();
        let iter = self
            .db
            .iterator(IteratorMode::From(prefix, Direction::Forward));

        for item in iter {
            let Ok((key, value)) = item else { break };
            if !key.starts_with(prefix) || rows.len() >= limit {
                break;
            }
            rows.push((key.to_vec(), value.to_vec()));
        }

        rows
    }
}
