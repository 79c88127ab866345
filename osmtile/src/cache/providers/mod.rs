//! Artifact store implementations.
//!
//! Each store implements the `ArtifactStore` trait.
//!
//! # Available Stores
//!
//! - [`DiskArtifactStore`]: One file per key, atomic writes
//! - [`MemoryArtifactStore`]: In-memory map, for tests and ephemeral sessions

mod disk;
mod memory;

pub use disk::{ClearResult, DiskArtifactStore, DiskStats};
pub use memory::MemoryArtifactStore;
