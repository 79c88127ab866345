//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use osmtile::config::ConfigFileError;
use osmtile::TileCacheError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration file could not be loaded
    ConfigFile(ConfigFileError),
    /// Failed to create the tile cache
    CacheCreation(TileCacheError),
    /// A region query failed
    Query(TileCacheError),
    /// Failed to read cache statistics
    CacheStats(String),
    /// Failed to clear the cache
    CacheClear(String),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Query(TileCacheError::Storage(_)) => {
                eprintln!();
                eprintln!("The tile cache may be corrupt. Remove it with:");
                eprintln!("  osmtile cache clear");
            }
            CliError::ConfigFile(_) => {
                eprintln!();
                eprintln!("Check ~/.osmtile/config.ini or pass --config <path>.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::CacheCreation(e) => write!(f, "Failed to create tile cache: {}", e),
            CliError::Query(e) => write!(f, "Query failed: {}", e),
            CliError::CacheStats(msg) => write!(f, "Failed to read cache statistics: {}", msg),
            CliError::CacheClear(msg) => write!(f, "Failed to clear cache: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::CacheCreation(e) | CliError::Query(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}
