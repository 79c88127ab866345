//! Ready-to-use tile cache backed by Overpass and the local disk.
//!
//! # Example
//!
//! ```ignore
//! use osmtile::{TileCache, TileCacheConfig};
//!
//! let cache = TileCache::new(TileCacheConfig::default())?;
//! let region = cache.get_merged_data(40.0, -74.0, 1500.0)?;
//! println!("{} nodes", region.graph.node_count());
//! ```

use tracing::info;

use crate::cache::DiskArtifactStore;
use crate::config::TileCacheConfig;
use crate::coord::ProjectionContext;
use crate::error::{Result, TileCacheError};
use crate::provider::{OverpassProvider, ReqwestClient};
use crate::region::{Coverage, RegionAssembler, RegionResult};
use crate::store::{CachingTileStore, TileStore};
use crate::tile::{TileIndex, TileIndexer};

type OverpassTileStore =
    CachingTileStore<OverpassProvider<ReqwestClient>, DiskArtifactStore>;

/// Region queries served from a per-tile disk cache filled from Overpass.
pub struct TileCache {
    config: TileCacheConfig,
    assembler: RegionAssembler<OverpassTileStore>,
}

impl TileCache {
    /// Builds the cache described by `config`.
    ///
    /// Nothing is fetched or written until the first query.
    pub fn new(config: TileCacheConfig) -> Result<Self> {
        config.validate()?;

        let http_client =
            ReqwestClient::with_timeout(config.timeout_secs()).map_err(TileCacheError::HttpClient)?;
        let provider = OverpassProvider::new(
            http_client,
            config.overpass_urls().to_vec(),
            config.timeout_secs(),
        );
        let store = CachingTileStore::new(
            provider,
            DiskArtifactStore::new(config.tile_root()),
            TileIndexer::new(config.tile_size_m()),
        );

        info!(
            root = %config.tile_root().display(),
            tile_size_m = config.tile_size_m(),
            "Tile cache ready"
        );

        Ok(Self {
            assembler: RegionAssembler::new(store),
            config,
        })
    }

    /// Returns the merged road graph, water and parks within `dist` metres
    /// of `(lat, lon)`, fetching only tiles not yet cached.
    pub fn get_merged_data(&self, lat: f64, lon: f64, dist: f64) -> Result<RegionResult> {
        self.assembler.query(lat, lon, dist)
    }

    /// The tiles a query would resolve, without fetching.
    pub fn covering_tiles(&self, lat: f64, lon: f64, dist: f64) -> Result<Coverage> {
        self.assembler.covering_tiles(lat, lon, dist)
    }

    pub fn indexer(&self) -> &TileIndexer {
        self.assembler.indexer()
    }

    /// Whether every dataset of a tile is already on disk.
    pub fn is_cached(&self, tile: TileIndex, ctx: &ProjectionContext) -> Result<bool> {
        self.assembler.store().is_cached(tile, ctx)
    }

    /// Backing disk store, for cache statistics and maintenance.
    pub fn disk_store(&self) -> &DiskArtifactStore {
        self.assembler.store().store()
    }

    pub fn config(&self) -> &TileCacheConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    use crate::cache::{ArtifactStore, DataKind, TileKey};

    #[test]
    fn test_new_rejects_invalid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = TileCacheConfig::new(temp_dir.path()).with_tile_size_m(0);
        assert!(matches!(TileCache::new(config), Err(TileCacheError::Config(_))));
    }

    #[test]
    fn test_new_does_not_touch_disk() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("tiles");
        let cache = TileCache::new(TileCacheConfig::new(&root)).unwrap();

        assert!(!root.exists());
        assert_eq!(cache.disk_store().root(), root.join("1000m"));
        assert_eq!(cache.disk_store().stats().unwrap().files, 0);
    }

    #[test]
    fn test_covering_tiles_uses_configured_size() {
        let temp_dir = TempDir::new().unwrap();
        let config = TileCacheConfig::new(temp_dir.path()).with_tile_size_m(2000);
        let cache = TileCache::new(config).unwrap();

        let coverage = cache.covering_tiles(40.0, -74.0, 100.0).unwrap();
        assert_eq!(coverage.tiles.len(), 1);
        assert!(coverage.tiles.contains(&crate::tile::TileIndex::new(292, 2214)));
    }

    #[test]
    fn test_is_cached_needs_every_dataset() {
        let temp_dir = TempDir::new().unwrap();
        let cache = TileCache::new(TileCacheConfig::new(temp_dir.path())).unwrap();
        let ctx = ProjectionContext::build(40.0, -74.0).unwrap();
        let tile = TileIndex::new(585, 4428);
        assert!(!cache.is_cached(tile, &ctx).unwrap());

        let keys = TileKey::all_for(ctx.zone(), tile);
        for key in &keys[..2] {
            cache.disk_store().set(&key.cache_key(), b"x").unwrap();
        }
        assert!(!cache.is_cached(tile, &ctx).unwrap());

        let parks = TileKey::new(ctx.zone(), tile, DataKind::Parks);
        cache.disk_store().set(&parks.cache_key(), b"x").unwrap();
        assert!(cache.is_cached(tile, &ctx).unwrap());
    }

    #[test]
    fn test_invalid_radius_fails_before_network() {
        let temp_dir = TempDir::new().unwrap();
        let cache = TileCache::new(TileCacheConfig::new(temp_dir.path())).unwrap();
        assert!(matches!(
            cache.get_merged_data(40.0, -74.0, -10.0),
            Err(TileCacheError::InvalidRadius(_))
        ));
    }
}
