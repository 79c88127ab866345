//! Tile indexing over the planar grid.
//!
//! Maps geographic points to fixed-size square tiles of a projection zone,
//! maps tiles back to geographic bounding boxes, and computes the tile set
//! covering a circular query.

mod index;

pub use index::{BoundingBox, TileIndex};

use std::collections::BTreeSet;

use crate::coord::{GeoPoint, PlanarPoint, ProjectionContext};

/// Default tile edge length in metres.
pub const DEFAULT_TILE_SIZE_M: u32 = 1000;

/// Largest query radius accepted by a region query, in metres.
///
/// Keeps a query well inside the half-width of a projection zone.
pub const MAX_QUERY_RADIUS_M: f64 = 100_000.0;

/// Largest number of tiles a single region query may cover.
pub const MAX_COVERING_TILES: u64 = 65_536;

/// Inclusive rectangle of tile indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSpan {
    pub min: TileIndex,
    pub max: TileIndex,
}

impl TileSpan {
    /// Number of tiles in the span, computed without enumerating them.
    pub fn len(&self) -> u64 {
        let width = (self.max.x - self.min.x + 1).max(0) as u64;
        let height = (self.max.y - self.min.y + 1).max(0) as u64;
        width.saturating_mul(height)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All tiles of the span in ascending `(x, y)` order.
    pub fn tiles(&self) -> BTreeSet<TileIndex> {
        let (min, max) = (self.min, self.max);
        (min.x..=max.x)
            .flat_map(|x| (min.y..=max.y).map(move |y| TileIndex::new(x, y)))
            .collect()
    }
}

/// Converts between geographic coordinates and tile indices.
#[derive(Debug, Clone, Copy)]
pub struct TileIndexer {
    tile_size: f64,
}

impl Default for TileIndexer {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_SIZE_M)
    }
}

impl TileIndexer {
    /// Creates an indexer for tiles of `tile_size_m` metres.
    ///
    /// The size is expected to be non-zero; `TileCacheConfig::validate`
    /// enforces this for configured sizes.
    pub fn new(tile_size_m: u32) -> Self {
        Self {
            tile_size: f64::from(tile_size_m),
        }
    }

    /// Tile edge length in metres.
    pub fn tile_size(&self) -> f64 {
        self.tile_size
    }

    /// Returns the tile containing a geographic point.
    pub fn point_to_tile(&self, lat: f64, lon: f64, ctx: &ProjectionContext) -> TileIndex {
        let p = ctx.forward(GeoPoint::new(lat, lon));
        self.planar_to_tile(p)
    }

    /// Returns the geographic bounding box of a tile.
    ///
    /// The planar corners are projected back together with the points where
    /// the tile edges cross the zone's central meridian or the equator. Along
    /// a tile edge latitude and longitude only peak at those crossings, so
    /// the box encloses every point of the tile.
    pub fn tile_to_bbox(&self, tile: TileIndex, ctx: &ProjectionContext) -> BoundingBox {
        let x_min = tile.x as f64 * self.tile_size;
        let x_max = (tile.x + 1) as f64 * self.tile_size;
        let y_min = tile.y as f64 * self.tile_size;
        let y_max = (tile.y + 1) as f64 * self.tile_size;

        let origin = ctx.origin();
        let mut xs = vec![x_min, x_max];
        if x_min < origin.x && origin.x < x_max {
            xs.push(origin.x);
        }
        let mut ys = vec![y_min, y_max];
        if y_min < origin.y && origin.y < y_max {
            ys.push(origin.y);
        }

        let points = xs
            .iter()
            .flat_map(|&x| ys.iter().map(move |&y| PlanarPoint { x, y }))
            .map(|p| ctx.inverse(p));
        BoundingBox::enclosing(points).unwrap_or_else(|| {
            let corner = ctx.inverse(PlanarPoint { x: x_min, y: y_min });
            BoundingBox::new(corner.lat, corner.lat, corner.lon, corner.lon)
        })
    }

    /// Returns every tile intersecting the planar square around a circle.
    ///
    /// The square `[cx - r, cx + r] × [cy - r, cy + r]` over-approximates the
    /// circle: corner tiles the circle never reaches are still included.
    /// A radius of zero yields exactly the center tile.
    ///
    /// The set is not bounded; callers taking user input check
    /// [`TileSpan::len`] of [`Self::covering_span`] first.
    pub fn tiles_covering_circle(
        &self,
        lat: f64,
        lon: f64,
        radius: f64,
        ctx: &ProjectionContext,
    ) -> BTreeSet<TileIndex> {
        self.covering_span(lat, lon, radius, ctx).tiles()
    }

    /// The rectangle of tiles [`Self::tiles_covering_circle`] would return.
    pub fn covering_span(
        &self,
        lat: f64,
        lon: f64,
        radius: f64,
        ctx: &ProjectionContext,
    ) -> TileSpan {
        let c = ctx.forward(GeoPoint::new(lat, lon));
        TileSpan {
            min: self.planar_to_tile(PlanarPoint {
                x: c.x - radius,
                y: c.y - radius,
            }),
            max: self.planar_to_tile(PlanarPoint {
                x: c.x + radius,
                y: c.y + radius,
            }),
        }
    }

    fn planar_to_tile(&self, p: PlanarPoint) -> TileIndex {
        TileIndex {
            x: (p.x / self.tile_size).floor() as i64,
            y: (p.y / self.tile_size).floor() as i64,
        }
    }
}
