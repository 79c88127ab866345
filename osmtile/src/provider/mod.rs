//! External map-data provider abstraction
//!
//! This module defines the [`MapDataProvider`] trait through which tiles are
//! filled with road graphs and tagged features, and its OpenStreetMap
//! implementation backed by the Overpass API.
//!
//! ```ignore
//! use osmtile::provider::{OverpassProvider, ReqwestClient};
//!
//! let http_client = ReqwestClient::new()?;
//! let provider = OverpassProvider::with_defaults(http_client);
//! let graph = provider.graph_in_bbox(&bbox)?;
//! ```

mod http;
mod overpass;
mod types;

pub use http::{HttpClient, ReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use overpass::{OverpassProvider, DEFAULT_OVERPASS_URLS};
pub use types::{FetchError, MapDataProvider, TagFilter};

#[cfg(test)]
pub use http::tests::MockHttpClient;
