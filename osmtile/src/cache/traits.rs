//! Core traits for persisted tile artifacts.
//!
//! The `ArtifactStore` trait provides a domain-agnostic key-value interface
//! for cached artifacts. Stores implement this trait, allowing the tile store
//! to use any backend (files, memory, an embedded database) through a
//! consistent interface.
//!
//! # Design Principles
//!
//! - **String keys**: Human-readable for debugging, mapped from `TileKey`
//! - **Vec<u8> values**: Raw bytes, serialization is done by the caller
//! - **Minimal interface**: Only the operations the tile store needs
//! - **Errors are fatal**: A store that cannot read or write surfaces it

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during cache storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error reading or writing a cache entry.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An artifact could not be serialized.
    #[error("Failed to encode {key}: {reason}")]
    Encode { key: String, reason: String },

    /// A stored artifact could not be deserialized.
    #[error("Failed to decode {key}: {reason}")]
    Decode { key: String, reason: String },

    /// Key contains characters that cannot name a cache entry.
    #[error("Invalid cache key: {0}")]
    InvalidKey(String),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Key-value storage for serialized tile artifacts.
///
/// Single-writer semantics: the store does not coordinate concurrent
/// writers of the same key beyond what its backend guarantees.
pub trait ArtifactStore {
    /// Store a value, replacing any existing value for the key.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Retrieve a value by key.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(data))` if the key exists
    /// - `Ok(None)` if the key is not found
    /// - `Err(_)` if the entry exists but cannot be read
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Check if a key exists without retrieving the value.
    fn contains(&self, key: &str) -> Result<bool, StorageError>;

    /// Delete a value by key.
    ///
    /// Returns `Ok(true)` if the key existed.
    fn delete(&self, key: &str) -> Result<bool, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_io_error_display_has_path() {
        let err = StorageError::io(
            "/tmp/tiles/z18N_graph_1_2.bin",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("z18N_graph_1_2.bin"));
        assert!(msg.contains("denied"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_decode_error_display() {
        let err = StorageError::Decode {
            key: "z18N_water_1_2".to_string(),
            reason: "unexpected end of file".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to decode z18N_water_1_2: unexpected end of file"
        );
    }
}
