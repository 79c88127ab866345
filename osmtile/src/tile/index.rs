//! Tile index and bounding box types.

use std::fmt;

use geo::{BoundingRect, Coord, Intersects, MultiPoint, Point, Rect};
use serde::{Deserialize, Serialize};

use crate::coord::GeoPoint;

/// Identifies one square cell of the planar grid.
///
/// Tile `(x, y)` covers the planar range
/// `[x * size, (x + 1) * size) × [y * size, (y + 1) * size)` of its zone.
/// Ordering is row-major by `x` then `y`, which gives the assembler a
/// deterministic merge order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileIndex {
    /// Column, eastward.
    pub x: i64,
    /// Row, northward.
    pub y: i64,
}

impl TileIndex {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for TileIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A geographic rectangle in degrees.
///
/// Stored as a [`Rect`] with `x` as longitude and `y` as latitude. The
/// accessors follow the fetch contract: north, south, east, west.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox(Rect<f64>);

impl BoundingBox {
    /// Box from its four edges; swapped edges are normalized.
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self(Rect::new(
            Coord { x: west, y: south },
            Coord { x: east, y: north },
        ))
    }

    /// Smallest box containing all given points.
    ///
    /// Returns `None` for an empty iterator.
    pub fn enclosing(points: impl IntoIterator<Item = GeoPoint>) -> Option<Self> {
        let points: MultiPoint<f64> = points
            .into_iter()
            .map(|p| Point::new(p.lon, p.lat))
            .collect();
        points.bounding_rect().map(Self)
    }

    pub fn north(&self) -> f64 {
        self.0.max().y
    }

    pub fn south(&self) -> f64 {
        self.0.min().y
    }

    pub fn east(&self) -> f64 {
        self.0.max().x
    }

    pub fn west(&self) -> f64 {
        self.0.min().x
    }

    /// Whether the point lies inside or on the edge of the box.
    pub fn contains(&self, point: GeoPoint) -> bool {
        self.0.intersects(&Coord {
            x: point.lon,
            y: point.lat,
        })
    }

    /// The box as a tuple in `(north, south, east, west)` order.
    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.north(), self.south(), self.east(), self.west())
    }

    pub fn as_rect(&self) -> &Rect<f64> {
        &self.0
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "N{:.6} S{:.6} E{:.6} W{:.6}",
            self.north(),
            self.south(),
            self.east(),
            self.west()
        )
    }
}
