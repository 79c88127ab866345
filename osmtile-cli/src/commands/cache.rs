//! Cache management CLI commands.

use std::path::PathBuf;

use clap::Subcommand;
use osmtile::cache::DiskArtifactStore;

use super::common::{resolve_config, CacheArgs};
use crate::error::CliError;

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Clear the disk cache for the configured tile size
    Clear {
        #[command(flatten)]
        cache: CacheArgs,
    },
    /// Show disk cache statistics
    Stats {
        #[command(flatten)]
        cache: CacheArgs,
    },
}

/// Run a cache subcommand.
pub fn run(config_path: Option<&PathBuf>, action: CacheAction) -> Result<(), CliError> {
    match action {
        CacheAction::Clear { cache } => {
            let store = DiskArtifactStore::new(resolve_config(config_path, &cache)?.tile_root());
            println!("Clearing disk cache at: {}", store.root().display());

            let result = store
                .clear()
                .map_err(|e| CliError::CacheClear(e.to_string()))?;
            println!(
                "Deleted {} files, freed {}",
                result.files_deleted,
                format_size(result.bytes_freed)
            );
            Ok(())
        }
        CacheAction::Stats { cache } => {
            let store = DiskArtifactStore::new(resolve_config(config_path, &cache)?.tile_root());
            println!("Disk cache: {}", store.root().display());

            let stats = store
                .stats()
                .map_err(|e| CliError::CacheStats(e.to_string()))?;
            println!("  Files: {}", stats.files);
            println!("  Size:  {}", format_size(stats.bytes));
            Ok(())
        }
    }
}

/// Format a byte count with a binary unit suffix.
fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}
