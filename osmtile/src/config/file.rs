//! Configuration file handling for ~/.osmtile/config.ini.
//!
//! Loads and saves user configuration with sensible defaults. Parsing lives
//! in [`super::parser`].

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use super::TileCacheConfig;
use crate::provider::{DEFAULT_OVERPASS_URLS, DEFAULT_TIMEOUT_SECS};
use crate::tile::DEFAULT_TILE_SIZE_M;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    pub directory: PathBuf,
    pub tile_size: u32,
}

/// `[overpass]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverpassSettings {
    pub urls: Vec<String>,
    pub timeout: u64,
}

/// Contents of `config.ini`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub cache: CacheSettings,
    pub overpass: OverpassSettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            cache: CacheSettings {
                directory: super::default_cache_dir(),
                tile_size: DEFAULT_TILE_SIZE_M,
            },
            overpass: OverpassSettings {
                urls: DEFAULT_OVERPASS_URLS.iter().map(|s| s.to_string()).collect(),
                timeout: DEFAULT_TIMEOUT_SECS,
            },
        }
    }
}

impl ConfigFile {
    /// Load configuration from the default path (~/.osmtile/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        std::fs::write(path, self.to_config_string())
            .map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Runtime configuration described by this file.
    pub fn to_config(&self) -> TileCacheConfig {
        TileCacheConfig::new(&self.cache.directory)
            .with_tile_size_m(self.cache.tile_size)
            .with_overpass_urls(self.overpass.urls.iter().cloned())
            .with_timeout_secs(self.overpass.timeout)
    }

    fn to_config_string(&self) -> String {
        format!(
            r#"[cache]
; Base directory for cached tiles (one subdirectory per tile size)
directory = {}
; Tile edge length in metres
tile_size = {}

[overpass]
; Overpass interpreter endpoints, comma separated, tried in order
urls = {}
; Request timeout in seconds
timeout = {}
"#,
            self.cache.directory.display(),
            self.cache.tile_size,
            self.overpass.urls.join(", "),
            self.overpass.timeout,
        )
    }
}

/// Get the path to the config directory (~/.osmtile).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".osmtile")
}

/// Get the path to the config file (~/.osmtile/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
