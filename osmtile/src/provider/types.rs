//! Map-data provider trait and shared types.

use thiserror::Error;

use crate::model::{FeatureCollection, RoadGraph};
use crate::tile::BoundingBox;

/// Failure of one external fetch.
///
/// Fetch failures never abort a query; the caching layer records the
/// affected dataset as absent and keeps the message for inspection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// The endpoint answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The response body could not be decoded.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The service accepted the request but reported a runtime error.
    #[error("Remote error: {0}")]
    Remote(String),

    /// Every configured endpoint failed.
    #[error("All endpoints failed: {}", .0.join("; "))]
    AllEndpointsFailed(Vec<String>),
}

/// Key/value criteria selecting features; a feature matches any pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilter {
    pairs: Vec<(String, String)>,
}

impl TagFilter {
    pub fn new<K: Into<String>, V: Into<String>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Water bodies: `natural=water`, `waterway=riverbank`.
    pub fn water() -> Self {
        Self::new([("natural", "water"), ("waterway", "riverbank")])
    }

    /// Green space: `leisure=park`, `landuse=grass`.
    pub fn parks() -> Self {
        Self::new([("leisure", "park"), ("landuse", "grass")])
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Source of raw map data for a bounding box.
///
/// Implementations are synchronous; the caller resolves one tile at a time.
pub trait MapDataProvider {
    /// Road/path graph of every way intersecting the box, unrestricted by
    /// travel mode. Ways crossing the boundary keep all their nodes.
    fn graph_in_bbox(&self, bbox: &BoundingBox) -> Result<RoadGraph, FetchError>;

    /// Features intersecting the box that match the tag filter.
    fn features_in_bbox(
        &self,
        bbox: &BoundingBox,
        filter: &TagFilter,
    ) -> Result<FeatureCollection, FetchError>;

    /// Human-readable provider name for logs.
    fn name(&self) -> &str;
}
