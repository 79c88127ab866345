//! Arguments and config resolution shared across CLI commands.

use std::path::PathBuf;

use clap::Args;
use osmtile::config::{config_file_path, ConfigFile};
use osmtile::TileCacheConfig;

use crate::error::CliError;

/// Cache location overrides accepted by every cache-backed command.
#[derive(Debug, Clone, Default, Args)]
pub struct CacheArgs {
    /// Cache base directory [default: from config.ini, else ~/.osmtile/tiles]
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Tile edge length in metres [default: from config.ini, else 1000]
    #[arg(long)]
    pub tile_size: Option<u32>,
}

/// Center point and radius of a region query.
#[derive(Debug, Clone, Args)]
pub struct RegionArgs {
    /// Latitude of the center in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude of the center in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,

    /// Radius in metres
    #[arg(long)]
    pub radius: f64,
}

/// Resolve the tile cache configuration.
///
/// CLI flags take precedence, then the config file, then built-in defaults.
pub fn resolve_config(
    config_path: Option<&PathBuf>,
    args: &CacheArgs,
) -> Result<TileCacheConfig, CliError> {
    let path = config_path.cloned().unwrap_or_else(config_file_path);
    let mut config = ConfigFile::load_from(&path)?.to_config();

    if let Some(dir) = &args.cache_dir {
        config = config.with_cache_dir(dir);
    }
    if let Some(size) = args.tile_size {
        config = config.with_tile_size_m(size);
    }
    Ok(config)
}
