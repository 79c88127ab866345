//! Coordinate types shared by the projection and tiling modules.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum latitude accepted by the projector (exclusive).
pub const MIN_LAT: f64 = -90.0;

/// Maximum latitude accepted by the projector (exclusive).
pub const MAX_LAT: f64 = 90.0;

/// Minimum longitude (inclusive).
pub const MIN_LON: f64 = -180.0;

/// Maximum longitude (exclusive).
pub const MAX_LON: f64 = 180.0;

/// Number of 6° UTM zones around the globe.
pub const ZONE_COUNT: u8 = 60;

/// A WGS84 geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A position on the projected plane, in metres.
///
/// `x` is the easting and `y` the northing, both including the false
/// origin offsets of the zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

/// Hemisphere selecting the false northing of a UTM zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Hemisphere {
    North,
    South,
}

impl Hemisphere {
    /// Hemisphere for a latitude; the equator belongs to the north.
    pub fn of_latitude(lat: f64) -> Self {
        if lat >= 0.0 {
            Hemisphere::North
        } else {
            Hemisphere::South
        }
    }

    fn letter(self) -> char {
        match self {
            Hemisphere::North => 'N',
            Hemisphere::South => 'S',
        }
    }
}

/// Identifies one planar projection band: UTM zone number plus hemisphere.
///
/// Northern and southern grids of the same zone number reuse overlapping
/// northing ranges, so the hemisphere is part of the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoneId {
    pub number: u8,
    pub hemisphere: Hemisphere,
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.number, self.hemisphere.letter())
    }
}

/// Errors raised while building a projection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("Invalid latitude: {0} (must be strictly between {MIN_LAT} and {MAX_LAT})")]
    InvalidLatitude(f64),

    #[error("Invalid longitude: {0} (must be in [{MIN_LON}, {MAX_LON}))")]
    InvalidLongitude(f64),

    #[error("No projection for zone {0} (valid zones are 1..={ZONE_COUNT})")]
    InvalidZone(i32),
}
