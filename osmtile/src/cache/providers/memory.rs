//! In-memory artifact store.
//!
//! Keeps artifacts in a `HashMap` behind a `parking_lot::RwLock`. Contents
//! live as long as the store; useful for tests and for sessions that should
//! not touch the disk.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::cache::traits::{ArtifactStore, StorageError};

/// Artifact store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Sorted list of stored keys.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.entries.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn contains(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.entries.read().contains_key(key))
    }

    fn delete(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.entries.write().remove(key).is_some())
    }
}
