//! Per-tile cache-or-fetch resolution.
//!
//! A tile is resolved from the artifact store when all three of its
//! artifacts are present; otherwise all three datasets are fetched from the
//! map-data provider, persisted (including absences) and returned.
//!
//! # Failure handling
//!
//! - A failed fetch turns into [`Artifact::Absent`] for that dataset only.
//!   The other datasets of the tile are still fetched and stored, and the
//!   absence is cached like data, so it is not retried later.
//! - Store read/write and decode failures abort the resolve.

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::cache::{Artifact, ArtifactStore, DataKind, TileKey};
use crate::coord::ProjectionContext;
use crate::error::Result;
use crate::model::{FeatureCollection, RoadGraph};
use crate::provider::{FetchError, MapDataProvider, TagFilter};
use crate::tile::{TileIndex, TileIndexer};

/// The three datasets of one tile.
#[derive(Debug, Clone, PartialEq)]
pub struct TileBundle {
    pub graph: Artifact<RoadGraph>,
    pub water: Artifact<FeatureCollection>,
    pub parks: Artifact<FeatureCollection>,
}

/// Resolves tiles to their data bundles.
pub trait TileStore {
    /// Returns the bundle of a tile, from cache or freshly fetched.
    fn resolve(&self, tile: TileIndex, ctx: &ProjectionContext) -> Result<TileBundle>;

    /// Whether every artifact of the tile is already stored.
    fn is_cached(&self, tile: TileIndex, ctx: &ProjectionContext) -> Result<bool>;

    /// Tiling the store's entries are keyed by.
    fn indexer(&self) -> &TileIndexer;
}

/// [`TileStore`] caching provider results in an [`ArtifactStore`].
pub struct CachingTileStore<P, S> {
    provider: P,
    store: S,
    indexer: TileIndexer,
    water_filter: TagFilter,
    parks_filter: TagFilter,
}

impl<P: MapDataProvider, S: ArtifactStore> CachingTileStore<P, S> {
    /// Creates a tile store.
    ///
    /// # Arguments
    ///
    /// * `provider` - Source of tile data on cache miss
    /// * `store` - Backend holding serialized artifacts
    /// * `indexer` - Tiling used to derive fetch bounding boxes; the store's
    ///   keys are only meaningful for this tile size
    pub fn new(provider: P, store: S, indexer: TileIndexer) -> Self {
        Self {
            provider,
            store,
            indexer,
            water_filter: TagFilter::water(),
            parks_filter: TagFilter::parks(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads all three artifacts, or `None` unless every one is stored.
    fn load(&self, keys: &[TileKey; 3]) -> Result<Option<TileBundle>> {
        let mut raw: [Option<Vec<u8>>; 3] = [None, None, None];
        for (slot, key) in raw.iter_mut().zip(keys) {
            *slot = self.store.get(&key.cache_key())?;
        }

        match raw {
            [Some(graph), Some(water), Some(parks)] => Ok(Some(TileBundle {
                graph: decode(&keys[0], &graph)?,
                water: decode(&keys[1], &water)?,
                parks: decode(&keys[2], &parks)?,
            })),
            [None, None, None] => Ok(None),
            partial => {
                let found = partial.iter().filter(|r| r.is_some()).count();
                warn!(
                    key = %keys[0],
                    found,
                    "Partial tile cache entry, fetching the whole tile again"
                );
                Ok(None)
            }
        }
    }

    fn fetch(&self, tile: TileIndex, ctx: &ProjectionContext) -> TileBundle {
        let bbox = self.indexer.tile_to_bbox(tile, ctx);
        info!(
            zone = %ctx.zone(),
            tile = %tile,
            bbox = %bbox,
            provider = self.provider.name(),
            "Fetching tile"
        );

        TileBundle {
            graph: record(DataKind::Graph, tile, self.provider.graph_in_bbox(&bbox)),
            water: record(
                DataKind::Water,
                tile,
                self.provider.features_in_bbox(&bbox, &self.water_filter),
            ),
            parks: record(
                DataKind::Parks,
                tile,
                self.provider.features_in_bbox(&bbox, &self.parks_filter),
            ),
        }
    }

    fn persist(&self, keys: &[TileKey; 3], bundle: &TileBundle) -> Result<()> {
        let encoded = [
            bundle.graph.encode(&keys[0].cache_key())?,
            bundle.water.encode(&keys[1].cache_key())?,
            bundle.parks.encode(&keys[2].cache_key())?,
        ];
        for (key, bytes) in keys.iter().zip(encoded) {
            self.store.set(&key.cache_key(), &bytes)?;
        }
        Ok(())
    }
}

impl<P: MapDataProvider, S: ArtifactStore> TileStore for CachingTileStore<P, S> {
    fn resolve(&self, tile: TileIndex, ctx: &ProjectionContext) -> Result<TileBundle> {
        let keys = TileKey::all_for(ctx.zone(), tile);

        if let Some(bundle) = self.load(&keys)? {
            debug!(zone = %ctx.zone(), tile = %tile, "Tile cache hit");
            return Ok(bundle);
        }

        let bundle = self.fetch(tile, ctx);
        self.persist(&keys, &bundle)?;
        Ok(bundle)
    }

    fn is_cached(&self, tile: TileIndex, ctx: &ProjectionContext) -> Result<bool> {
        for key in TileKey::all_for(ctx.zone(), tile) {
            if !self.store.contains(&key.cache_key())? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn indexer(&self) -> &TileIndexer {
        &self.indexer
    }
}

fn decode<T: DeserializeOwned>(key: &TileKey, bytes: &[u8]) -> Result<Artifact<T>> {
    Ok(Artifact::decode(&key.cache_key(), bytes)?)
}

fn record<T>(
    kind: DataKind,
    tile: TileIndex,
    result: std::result::Result<T, FetchError>,
) -> Artifact<T> {
    if let Err(e) = &result {
        warn!(kind = %kind, tile = %tile, error = %e, "Fetch failed, caching as absent");
    }
    result.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use parking_lot::Mutex;

    use std::io;

    use tempfile::TempDir;

    use crate::cache::{DiskArtifactStore, MemoryArtifactStore, StorageError};
    use crate::error::TileCacheError;
    use crate::model::GraphNode;
    use crate::tile::BoundingBox;

    /// Provider returning a one-node graph and counting every call.
    #[derive(Default)]
    struct CountingProvider {
        calls: Mutex<Vec<(&'static str, BoundingBox)>>,
        fail_water: bool,
    }

    impl CountingProvider {
        fn calls(&self) -> usize {
            self.calls.lock().len()
        }
    }

    impl MapDataProvider for CountingProvider {
        fn graph_in_bbox(
            &self,
            bbox: &BoundingBox,
        ) -> std::result::Result<RoadGraph, FetchError> {
            self.calls.lock().push(("graph", *bbox));
            let mut g = RoadGraph::new();
            g.add_node(GraphNode {
                id: 1,
                lat: bbox.south(),
                lon: bbox.west(),
                tags: BTreeMap::new(),
            });
            Ok(g)
        }

        fn features_in_bbox(
            &self,
            bbox: &BoundingBox,
            filter: &TagFilter,
        ) -> std::result::Result<FeatureCollection, FetchError> {
            let is_water = *filter == TagFilter::water();
            self.calls.lock().push((if is_water { "water" } else { "parks" }, *bbox));
            if is_water && self.fail_water {
                return Err(FetchError::HttpError("connection reset".into()));
            }
            Ok(FeatureCollection::default())
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn ctx() -> ProjectionContext {
        ProjectionContext::build(40.0, -74.0).unwrap()
    }

    fn store(
        provider: CountingProvider,
    ) -> CachingTileStore<CountingProvider, MemoryArtifactStore> {
        CachingTileStore::new(provider, MemoryArtifactStore::new(), TileIndexer::default())
    }

    /// Reads like an empty store; every write fails.
    struct UnwritableStore;

    impl ArtifactStore for UnwritableStore {
        fn set(&self, key: &str, _value: &[u8]) -> std::result::Result<(), StorageError> {
            Err(StorageError::io(
                key,
                io::Error::new(io::ErrorKind::PermissionDenied, "read-only cache"),
            ))
        }

        fn get(&self, _key: &str) -> std::result::Result<Option<Vec<u8>>, StorageError> {
            Ok(None)
        }

        fn contains(&self, _key: &str) -> std::result::Result<bool, StorageError> {
            Ok(false)
        }

        fn delete(&self, _key: &str) -> std::result::Result<bool, StorageError> {
            Ok(false)
        }
    }

    #[test]
    fn test_miss_fetches_three_datasets_with_tile_bbox() {
        let store = store(CountingProvider::default());
        let tile = TileIndex::new(585, 4428);

        let bundle = store.resolve(tile, &ctx()).unwrap();

        let expected = store.indexer().tile_to_bbox(tile, &ctx());
        let calls = store.provider().calls.lock().clone();
        let kinds: Vec<_> = calls.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, vec!["graph", "water", "parks"]);
        assert!(calls.iter().all(|(_, bbox)| *bbox == expected));
        assert_eq!(bundle.graph.as_ref().unwrap().node_count(), 1);
        assert_eq!(store.store().len(), 3);
    }

    #[test]
    fn test_write_failure_aborts_resolve_after_fetch() {
        let store = CachingTileStore::new(
            CountingProvider::default(),
            UnwritableStore,
            TileIndexer::default(),
        );

        let err = store.resolve(TileIndex::new(585, 4428), &ctx()).unwrap_err();
        assert!(matches!(err, TileCacheError::Storage(StorageError::Io { .. })));
        assert_eq!(store.provider().calls(), 3);
    }

    #[test]
    fn test_disk_root_that_is_a_file_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("1000m");
        std::fs::write(&root, b"not a directory").unwrap();
        let store = CachingTileStore::new(
            CountingProvider::default(),
            DiskArtifactStore::new(&root),
            TileIndexer::default(),
        );

        let err = store.resolve(TileIndex::new(585, 4428), &ctx()).unwrap_err();
        assert!(matches!(err, TileCacheError::Storage(StorageError::Io { .. })));
        assert!(root.is_file());
    }

    #[test]
    fn test_second_resolve_is_a_cache_hit() {
        let store = store(CountingProvider::default());
        let tile = TileIndex::new(585, 4428);

        assert!(!store.is_cached(tile, &ctx()).unwrap());
        let first = store.resolve(tile, &ctx()).unwrap();
        assert!(store.is_cached(tile, &ctx()).unwrap());
        let second = store.resolve(tile, &ctx()).unwrap();

        assert_eq!(store.provider().calls(), 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_failed_dataset_is_cached_as_absent() {
        let store = store(CountingProvider {
            fail_water: true,
            ..Default::default()
        });
        let tile = TileIndex::new(1, 1);

        let bundle = store.resolve(tile, &ctx()).unwrap();
        assert!(bundle.graph.is_present());
        assert!(bundle.parks.is_present());
        assert!(matches!(
            &bundle.water,
            Artifact::Absent { reason } if reason.contains("connection reset")
        ));

        let again = store.resolve(tile, &ctx()).unwrap();
        assert_eq!(store.provider().calls(), 3);
        assert!(!again.water.is_present());
    }

    #[test]
    fn test_partial_entry_refetches_everything() {
        let store = store(CountingProvider::default());
        let tile = TileIndex::new(2, 2);
        store.resolve(tile, &ctx()).unwrap();

        let water_key = TileKey::new(ctx().zone(), tile, DataKind::Water).cache_key();
        store.store().delete(&water_key).unwrap();
        assert!(!store.is_cached(tile, &ctx()).unwrap());

        store.resolve(tile, &ctx()).unwrap();
        assert_eq!(store.provider().calls(), 6);
        assert!(store.is_cached(tile, &ctx()).unwrap());
    }

    #[test]
    fn test_corrupt_entry_is_fatal() {
        let store = store(CountingProvider::default());
        let tile = TileIndex::new(3, 3);
        for key in TileKey::all_for(ctx().zone(), tile) {
            store.store().set(&key.cache_key(), &[0xFF]).unwrap();
        }

        let err = store.resolve(tile, &ctx()).unwrap_err();
        assert!(matches!(err, TileCacheError::Storage(_)));
        assert_eq!(store.provider().calls(), 0);
    }

    #[test]
    fn test_zones_are_cached_separately() {
        let store = store(CountingProvider::default());
        let tile = TileIndex::new(500, 5000);
        let north = ProjectionContext::build(45.0, -74.0).unwrap();
        let south = ProjectionContext::build(-45.0, -74.0).unwrap();

        store.resolve(tile, &north).unwrap();
        store.resolve(tile, &south).unwrap();
        assert_eq!(store.provider().calls(), 6);
        assert_eq!(store.store().len(), 6);
    }
}
