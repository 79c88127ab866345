//! Tile coverage command.
//!
//! Lists the tiles a query would use, with their cache state and bounding
//! boxes, without contacting the map-data service.

use std::path::PathBuf;

use clap::Args;
use osmtile::TileCache;

use super::common::{resolve_config, CacheArgs, RegionArgs};
use crate::error::CliError;

/// Arguments for `osmtile tiles`.
#[derive(Debug, Args)]
pub struct TilesArgs {
    #[command(flatten)]
    pub region: RegionArgs,

    #[command(flatten)]
    pub cache: CacheArgs,
}

pub fn run(config_path: Option<&PathBuf>, args: TilesArgs) -> Result<(), CliError> {
    let config = resolve_config(config_path, &args.cache)?;
    let cache = TileCache::new(config).map_err(CliError::CacheCreation)?;

    let RegionArgs { lat, lon, radius } = args.region;
    let coverage = cache
        .covering_tiles(lat, lon, radius)
        .map_err(CliError::Query)?;
    let zone = coverage.ctx.zone();

    println!("Zone {}: {} tiles", zone, coverage.tiles.len());
    for tile in &coverage.tiles {
        let cached = cache
            .is_cached(*tile, &coverage.ctx)
            .map_err(CliError::Query)?;
        let bbox = cache.indexer().tile_to_bbox(*tile, &coverage.ctx);
        println!(
            "  {:>8} {:<8} {}",
            tile.to_string(),
            if cached { "cached" } else { "missing" },
            bbox
        );
    }
    Ok(())
}
