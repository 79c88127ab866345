//! Crate-level error type.
//!
//! Only failures that break a precondition of a query surface here. Failed
//! fetches are recorded per dataset as absent artifacts and never abort a
//! query, so `FetchError` has no variant of its own.

use thiserror::Error;

use crate::cache::StorageError;
use crate::coord::ProjectionError;
use crate::provider::FetchError;
use crate::tile::{MAX_COVERING_TILES, MAX_QUERY_RADIUS_M};

/// Result type for tile cache operations.
pub type Result<T> = std::result::Result<T, TileCacheError>;

/// Errors returned by queries and tile resolution.
#[derive(Debug, Error)]
pub enum TileCacheError {
    /// No projection could be built for the query point.
    #[error("Projection error: {0}")]
    Projection(#[from] ProjectionError),

    /// The tile cache could not be read or written.
    #[error("Cache storage error: {0}")]
    Storage(#[from] StorageError),

    /// The query radius is negative, not a number, or too large.
    #[error(
        "Invalid radius: {0} (expected 0 to {} metres, covering at most {} tiles)",
        MAX_QUERY_RADIUS_M,
        MAX_COVERING_TILES
    )]
    InvalidRadius(f64),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The HTTP client for the map-data service could not be created.
    #[error("Failed to create HTTP client: {0}")]
    HttpClient(FetchError),
}
