//! On-disk artifact store.
//!
//! One file per key under a root directory: `{root}/{key}.bin`. The root is
//! created on first write. Writes go to a temporary file that is renamed
//! into place, so an entry is either absent or complete.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cache::traits::{ArtifactStore, StorageError};

/// File extension of stored artifacts.
const ARTIFACT_EXTENSION: &str = "bin";

/// File extension of in-progress writes.
const TEMP_EXTENSION: &str = "tmp";

/// Result of clearing a disk store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearResult {
    pub files_deleted: usize,
    pub bytes_freed: u64,
}

/// File count and total size of a disk store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiskStats {
    pub files: usize,
    pub bytes: u64,
}

/// Artifact store backed by one file per key.
#[derive(Debug, Clone)]
pub struct DiskArtifactStore {
    root: PathBuf,
}

impl DiskArtifactStore {
    /// Creates a store rooted at `root`. Nothing is touched until the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{}.{}", key, ARTIFACT_EXTENSION)))
    }

    /// Counts stored artifacts and their total size.
    ///
    /// A missing root counts as an empty store.
    pub fn stats(&self) -> Result<DiskStats, StorageError> {
        let mut stats = DiskStats::default();
        for (path, len) in self.entries(&[ARTIFACT_EXTENSION])? {
            debug!(path = %path.display(), bytes = len, "Counted cache entry");
            stats.files += 1;
            stats.bytes += len;
        }
        Ok(stats)
    }

    /// Deletes every stored artifact and leftover temporary file.
    pub fn clear(&self) -> Result<ClearResult, StorageError> {
        let mut result = ClearResult::default();
        for (path, len) in self.entries(&[ARTIFACT_EXTENSION, TEMP_EXTENSION])? {
            fs::remove_file(&path).map_err(|e| StorageError::io(&path, e))?;
            result.files_deleted += 1;
            result.bytes_freed += len;
        }
        Ok(result)
    }

    fn entries(&self, extensions: &[&str]) -> Result<Vec<(PathBuf, u64)>, StorageError> {
        let dir = match fs::read_dir(&self.root) {
            Ok(dir) => dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(&self.root, e)),
        };

        let mut entries = Vec::new();
        for entry in dir {
            let entry = entry.map_err(|e| StorageError::io(&self.root, e))?;
            let path = entry.path();
            let matches = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.contains(&ext));
            if !matches {
                continue;
            }
            let metadata = entry.metadata().map_err(|e| StorageError::io(&path, e))?;
            if metadata.is_file() {
                entries.push((path, metadata.len()));
            }
        }
        Ok(entries)
    }
}

impl ArtifactStore for DiskArtifactStore {
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root).map_err(|e| StorageError::io(&self.root, e))?;

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension(TEMP_EXTENSION);
        let mut file = fs::File::create(&temp_path).map_err(|e| StorageError::io(&temp_path, e))?;
        file.write_all(value)
            .and_then(|_| file.sync_all())
            .map_err(|e| StorageError::io(&temp_path, e))?;
        fs::rename(&temp_path, &path).map_err(|e| StorageError::io(&path, e))?;

        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(&path, e)),
        }
    }

    fn contains(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.path_for(key)?;
        path.try_exists().map_err(|e| StorageError::io(&path, e))
    }

    fn delete(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::io(&path, e)),
        }
    }
}
