//! osmtile - tile-based caching of OpenStreetMap data
//!
//! This library answers "road graph, water and parks within `r` metres of a
//! point" queries by covering the circle with fixed-size tiles of a UTM
//! zone, fetching each tile from the Overpass API once, persisting it, and
//! merging the per-tile results.
//!
//! # Components
//!
//! - [`coord`]: UTM zone selection and forward/inverse projection
//! - [`tile`]: planar tile indices, tile bounding boxes, circle coverage
//! - [`provider`]: map-data source trait and its Overpass implementation
//! - [`cache`]: artifact keys, serialization and storage backends
//! - [`store`]: per-tile cache-or-fetch resolution
//! - [`region`]: multi-tile query assembly and merge
//! - [`service`]: [`TileCache`], the assembled disk + Overpass front door

pub mod cache;
pub mod config;
pub mod coord;
pub mod error;
pub mod logging;
pub mod model;
pub mod provider;
pub mod region;
pub mod service;
pub mod store;
pub mod tile;

pub use config::TileCacheConfig;
pub use error::{Result, TileCacheError};
pub use region::{RegionAssembler, RegionResult};
pub use service::TileCache;
pub use store::{CachingTileStore, TileBundle, TileStore};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
