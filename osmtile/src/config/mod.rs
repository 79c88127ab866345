//! Configuration for the tile cache.
//!
//! [`TileCacheConfig`] is the runtime configuration handed to
//! [`TileCache`](crate::TileCache); [`ConfigFile`] is its on-disk INI form at
//! `~/.osmtile/config.ini`.
//!
//! # Example
//!
//! ```
//! use osmtile::config::TileCacheConfig;
//!
//! let config = TileCacheConfig::new("/tmp/osm-tiles")
//!     .with_tile_size_m(500)
//!     .with_timeout_secs(60);
//! assert!(config.validate().is_ok());
//! assert!(config.tile_root().ends_with("500m"));
//! ```

mod file;
mod parser;

pub use file::{
    config_directory, config_file_path, CacheSettings, ConfigFile, ConfigFileError,
    OverpassSettings,
};

use std::path::{Path, PathBuf};

use crate::error::TileCacheError;
use crate::provider::{DEFAULT_OVERPASS_URLS, DEFAULT_TIMEOUT_SECS};
use crate::tile::DEFAULT_TILE_SIZE_M;

/// Default cache directory (`~/.osmtile/tiles`).
pub fn default_cache_dir() -> PathBuf {
    config_directory().join("tiles")
}

/// Runtime configuration of a tile cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileCacheConfig {
    /// Base directory of the tile cache
    cache_dir: PathBuf,
    /// Tile edge length in metres
    tile_size_m: u32,
    /// Overpass interpreter endpoints, tried in order
    overpass_urls: Vec<String>,
    /// HTTP and Overpass query timeout in seconds
    timeout_secs: u64,
}

impl Default for TileCacheConfig {
    fn default() -> Self {
        Self::new(default_cache_dir())
    }
}

impl TileCacheConfig {
    /// Create a configuration with defaults and the given cache directory.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            tile_size_m: DEFAULT_TILE_SIZE_M,
            overpass_urls: DEFAULT_OVERPASS_URLS.iter().map(|s| s.to_string()).collect(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Set the tile edge length. Default: 1000 metres.
    pub fn with_tile_size_m(mut self, size: u32) -> Self {
        self.tile_size_m = size;
        self
    }

    /// Replace the Overpass endpoint list.
    pub fn with_overpass_urls<S: Into<String>>(
        mut self,
        urls: impl IntoIterator<Item = S>,
    ) -> Self {
        self.overpass_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    /// Set the request timeout. Default: 180 seconds.
    pub fn with_timeout_secs(mut self, timeout: u64) -> Self {
        self.timeout_secs = timeout;
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn tile_size_m(&self) -> u32 {
        self.tile_size_m
    }

    pub fn overpass_urls(&self) -> &[String] {
        &self.overpass_urls
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Directory holding the artifacts for the configured tile size.
    ///
    /// Each tile size gets its own subdirectory, so a key never maps to two
    /// different bounding boxes.
    pub fn tile_root(&self) -> PathBuf {
        self.cache_dir.join(format!("{}m", self.tile_size_m))
    }

    /// Check that the configuration can drive a tile cache.
    pub fn validate(&self) -> Result<(), TileCacheError> {
        if self.tile_size_m == 0 {
            return Err(TileCacheError::Config("tile size must be greater than 0".into()));
        }
        if self.overpass_urls.is_empty() {
            return Err(TileCacheError::Config("at least one Overpass URL is required".into()));
        }
        if self.timeout_secs == 0 {
            return Err(TileCacheError::Config("timeout must be greater than 0".into()));
        }
        Ok(())
    }
}
