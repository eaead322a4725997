//! In-memory blob store.

use std::collections::HashMap;

use super::{BlobStore, DbResult};

/// Non-durable blob store, useful for tests and previews.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: HashMap<String, Vec<u8>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> DbResult<Option<Vec<u8>>> {
        Ok(self.blobs.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &[u8]) -> DbResult<()> {
        self.blobs.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> DbResult<bool> {
        Ok(self.blobs.remove(key).is_some())
    }
}
