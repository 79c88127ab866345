//! Persisted per-tile artifact cache.
//!
//! - [`ArtifactStore`]: string-keyed byte storage, the backend seam
//! - [`TileKey`]: maps `(zone, tile, kind)` to a store key
//! - [`Artifact`]: the serialized present-or-absent form of one dataset

mod artifact;
mod key;
pub mod providers;
mod traits;

pub use artifact::Artifact;
pub use key::{DataKind, TileKey};
pub use providers::{ClearResult, DiskArtifactStore, DiskStats, MemoryArtifactStore};
pub use traits::{ArtifactStore, StorageError};
