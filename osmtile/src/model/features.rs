//! Tagged geometry features (water bodies, parks).

use std::collections::{BTreeMap, HashSet};
use std::mem::{self, Discriminant};

use geo::{CoordsIter, Geometry};
use serde::{Deserialize, Serialize};

/// OpenStreetMap element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElementType {
    Node,
    Way,
    Relation,
}

/// Reference to the OpenStreetMap element a feature was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementRef {
    pub kind: ElementType,
    pub id: i64,
}

/// One tagged feature.
///
/// Geometry coordinates are `x` longitude, `y` latitude. Closed ways are
/// polygons; relations keep their member ways as a multi-line-string in
/// member order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub element: ElementRef,
    pub tags: BTreeMap<String, String>,
    pub geometry: Geometry<f64>,
}

/// Declared deduplication key of a feature.
///
/// Element identity, tags and exact geometry together. Coordinates compare
/// by bit pattern, so two fragments of the same element clipped differently
/// are distinct keys.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct FeatureKey<'a> {
    element: ElementRef,
    tags: &'a BTreeMap<String, String>,
    kind: Discriminant<Geometry<f64>>,
    coords: Vec<(u64, u64)>,
}

impl Feature {
    pub fn dedup_key(&self) -> FeatureKey<'_> {
        FeatureKey {
            element: self.element,
            tags: &self.tags,
            kind: mem::discriminant(&self.geometry),
            coords: self
                .geometry
                .coords_iter()
                .map(|c| (c.x.to_bits(), c.y.to_bits()))
                .collect(),
        }
    }
}

/// An ordered collection of features.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    /// Concatenates collections and drops repeated features.
    ///
    /// The first occurrence of each [`FeatureKey`] is kept, in input order.
    /// Returns `None` if no collection was supplied.
    pub fn concat_dedup(
        collections: impl IntoIterator<Item = FeatureCollection>,
    ) -> Option<FeatureCollection> {
        let collections: Vec<_> = collections.into_iter().collect();
        if collections.is_empty() {
            return None;
        }

        let all: Vec<Feature> = collections.into_iter().flat_map(|c| c.features).collect();
        let mut seen = HashSet::with_capacity(all.len());
        let keep: Vec<bool> = all.iter().map(|f| seen.insert(f.dedup_key())).collect();
        drop(seen);

        let features = all
            .into_iter()
            .zip(keep)
            .filter_map(|(f, keep)| keep.then_some(f))
            .collect();
        Some(FeatureCollection { features })
    }
}

impl IntoIterator for FeatureCollection {
    type Item = Feature;
    type IntoIter = std::vec::IntoIter<Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.into_iter()
    }
}
