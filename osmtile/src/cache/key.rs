//! Cache keys for tile artifacts.
//!
//! # Key Format
//!
//! Keys follow the format `z{zone}_{kind}_{x}_{y}` for debuggability.
//! Example: `z18N_graph_585_4428`

use std::fmt;

use crate::coord::ZoneId;
use crate::tile::TileIndex;

/// The dataset an artifact holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataKind {
    Graph,
    Water,
    Parks,
}

impl DataKind {
    /// Every kind, in resolve order.
    pub const ALL: [DataKind; 3] = [DataKind::Graph, DataKind::Water, DataKind::Parks];

    pub fn as_str(self) -> &'static str {
        match self {
            DataKind::Graph => "graph",
            DataKind::Water => "water",
            DataKind::Parks => "parks",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary key of one cached artifact.
///
/// Together with the store's tile size, a key always denotes the same
/// geographic bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey {
    pub zone: ZoneId,
    pub tile: TileIndex,
    pub kind: DataKind,
}

impl TileKey {
    pub fn new(zone: ZoneId, tile: TileIndex, kind: DataKind) -> Self {
        Self { zone, tile, kind }
    }

    /// The three keys of one tile, in [`DataKind::ALL`] order.
    pub fn all_for(zone: ZoneId, tile: TileIndex) -> [TileKey; 3] {
        DataKind::ALL.map(|kind| TileKey::new(zone, tile, kind))
    }

    /// String key used with an `ArtifactStore`.
    pub fn cache_key(&self) -> String {
        format!(
            "z{}_{}_{}_{}",
            self.zone, self.kind, self.tile.x, self.tile.y
        )
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cache_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Hemisphere;

    fn zone(hemisphere: Hemisphere) -> ZoneId {
        ZoneId {
            number: 18,
            hemisphere,
        }
    }

    #[test]
    fn test_cache_key_format() {
        let key = TileKey::new(zone(Hemisphere::North), TileIndex::new(585, 4428), DataKind::Graph);
        assert_eq!(key.cache_key(), "z18N_graph_585_4428");
    }

    #[test]
    fn test_negative_indices() {
        let key = TileKey::new(zone(Hemisphere::South), TileIndex::new(-3, 7), DataKind::Parks);
        assert_eq!(key.to_string(), "z18S_parks_-3_7");
    }

    #[test]
    fn test_hemispheres_do_not_collide() {
        let tile = TileIndex::new(500, 5000);
        let north = TileKey::new(zone(Hemisphere::North), tile, DataKind::Water);
        let south = TileKey::new(zone(Hemisphere::South), tile, DataKind::Water);
        assert_ne!(north.cache_key(), south.cache_key());
    }

    #[test]
    fn test_all_for_covers_every_kind() {
        let keys = TileKey::all_for(zone(Hemisphere::North), TileIndex::new(1, 2));
        let kinds: Vec<_> = keys.iter().map(|k| k.kind).collect();
        assert_eq!(kinds, DataKind::ALL.to_vec());
    }
}
