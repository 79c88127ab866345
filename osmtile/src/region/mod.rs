//! Region queries over the tile cache.
//!
//! A query point fixes the projection zone; the circle around it is covered
//! by tiles of that zone, each tile is resolved through a [`TileStore`], and
//! the per-tile datasets are merged into one result.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::coord::{ProjectionContext, ZoneId};
use crate::error::{Result, TileCacheError};
use crate::model::{FeatureCollection, RoadGraph};
use crate::store::TileStore;
use crate::tile::{TileIndex, TileIndexer, MAX_COVERING_TILES, MAX_QUERY_RADIUS_M};

/// Merged data of every tile covering a query.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionResult {
    /// Union of the tile graphs; always present, possibly empty.
    pub graph: RoadGraph,
    /// Concatenated water features, `None` when no tile contributed any.
    pub water: Option<FeatureCollection>,
    /// Concatenated park features, `None` when no tile contributed any.
    pub parks: Option<FeatureCollection>,
    /// Zone the query was projected into.
    pub zone: ZoneId,
    /// Tiles that were resolved, in merge order.
    pub tiles: Vec<TileIndex>,
}

/// Tiles covering one query, before any of them is resolved.
#[derive(Debug, Clone)]
pub struct Coverage {
    pub ctx: ProjectionContext,
    pub tiles: BTreeSet<TileIndex>,
}

/// Assembles region results from cached tiles.
///
/// Tiles are computed with the store's own indexer, so coverage and cache
/// keys always agree on the tile size.
pub struct RegionAssembler<S> {
    store: S,
}

impl<S: TileStore> RegionAssembler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn indexer(&self) -> &TileIndexer {
        self.store.indexer()
    }

    /// Computes the projection and tile set for a query without fetching.
    ///
    /// # Errors
    ///
    /// - [`TileCacheError::InvalidRadius`] for a negative or non-finite
    ///   radius, one above [`MAX_QUERY_RADIUS_M`], or one covering more than
    ///   [`MAX_COVERING_TILES`] tiles
    /// - [`TileCacheError::Projection`] for coordinates out of range
    pub fn covering_tiles(&self, lat: f64, lon: f64, radius_m: f64) -> Result<Coverage> {
        if !radius_m.is_finite() || !(0.0..=MAX_QUERY_RADIUS_M).contains(&radius_m) {
            return Err(TileCacheError::InvalidRadius(radius_m));
        }

        let ctx = ProjectionContext::build(lat, lon)?;
        let span = self.indexer().covering_span(lat, lon, radius_m, &ctx);
        if span.len() > MAX_COVERING_TILES {
            warn!(
                radius_m,
                tiles = span.len(),
                tile_size_m = self.indexer().tile_size(),
                "Query covers too many tiles"
            );
            return Err(TileCacheError::InvalidRadius(radius_m));
        }
        Ok(Coverage {
            ctx,
            tiles: span.tiles(),
        })
    }

    /// Returns the merged graph, water and parks within `radius_m` metres.
    ///
    /// Tiles are resolved in ascending `(x, y)` order. A tile whose dataset
    /// is absent contributes nothing for that dataset; the query still
    /// succeeds. The graph of the first tile wins on duplicate node and
    /// edge ids.
    pub fn query(&self, lat: f64, lon: f64, radius_m: f64) -> Result<RegionResult> {
        let Coverage { ctx, tiles } = self.covering_tiles(lat, lon, radius_m)?;

        let mut cached = 0usize;
        for tile in &tiles {
            if self.store.is_cached(*tile, &ctx)? {
                cached += 1;
            }
        }
        info!(
            zone = %ctx.zone(),
            "Need {} tiles for {}m radius ({} cached, {} to fetch)",
            tiles.len(),
            radius_m,
            cached,
            tiles.len() - cached
        );

        let mut graphs = Vec::with_capacity(tiles.len());
        let mut water = Vec::new();
        let mut parks = Vec::new();
        for tile in &tiles {
            let bundle = self.store.resolve(*tile, &ctx)?;
            if let Some(graph) = bundle.graph.into_option() {
                graphs.push(graph);
            }
            water.extend(bundle.water.into_option().filter(|c| !c.is_empty()));
            parks.extend(bundle.parks.into_option().filter(|c| !c.is_empty()));
        }

        let graph = RoadGraph::compose_all(graphs);
        let water = FeatureCollection::concat_dedup(water);
        let parks = FeatureCollection::concat_dedup(parks);
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            water = water.as_ref().map_or(0, FeatureCollection::len),
            parks = parks.as_ref().map_or(0, FeatureCollection::len),
            "Region assembled"
        );

        Ok(RegionResult {
            graph,
            water,
            parks,
            zone: ctx.zone(),
            tiles: tiles.into_iter().collect(),
        })
    }
}
