//! Map data artifacts fetched per tile and merged per region.

mod features;
mod graph;

pub use features::{ElementRef, ElementType, Feature, FeatureCollection, FeatureKey};
pub use graph::{EdgeKey, GraphEdge, GraphNode, NodeId, RoadGraph, WayId};
