//! Road/path graph assembled from OpenStreetMap ways.

use std::collections::BTreeMap;

use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

/// OpenStreetMap node identifier.
pub type NodeId = i64;

/// OpenStreetMap way identifier.
pub type WayId = i64;

/// A graph vertex: one OSM node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub lat: f64,
    pub lon: f64,
    pub tags: BTreeMap<String, String>,
}

impl GraphNode {
    /// Position as a point with `x` longitude and `y` latitude.
    pub fn point(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

/// Identity of a directed edge.
///
/// Parallel edges between the same nodes stay distinct when they come from
/// different ways.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey {
    pub from: NodeId,
    pub to: NodeId,
    pub way_id: WayId,
}

/// A directed edge between two consecutive nodes of a way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub key: EdgeKey,
    /// Haversine length in metres.
    pub length_m: f64,
    /// Tags of the way this edge belongs to.
    pub tags: BTreeMap<String, String>,
}

/// A directed multigraph of road and path segments.
///
/// Nodes and edges are keyed by their OpenStreetMap identifiers, so the same
/// segment fetched by two neighbouring tiles is one entry after a merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoadGraph {
    nodes: BTreeMap<NodeId, GraphNode>,
    edges: BTreeMap<EdgeKey, GraphEdge>,
}

impl RoadGraph {
    /// An empty, traversable graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node, replacing any node with the same id.
    pub fn add_node(&mut self, node: GraphNode) {
        self.nodes.insert(node.id, node);
    }

    /// Inserts an edge, replacing any edge with the same key.
    pub fn add_edge(&mut self, edge: GraphEdge) {
        self.edges.insert(edge.key, edge);
    }

    /// Adds an edge between two existing nodes, deriving its length.
    ///
    /// Returns `false` without inserting anything if either node is unknown.
    pub fn connect(
        &mut self,
        from: NodeId,
        to: NodeId,
        way_id: WayId,
        tags: &BTreeMap<String, String>,
    ) -> bool {
        let (Some(a), Some(b)) = (self.nodes.get(&from), self.nodes.get(&to)) else {
            return false;
        };
        let length_m = Haversine.distance(a.point(), b.point());
        self.add_edge(GraphEdge {
            key: EdgeKey { from, to, way_id },
            length_m,
            tags: tags.clone(),
        });
        true
    }

    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(&id)
    }

    pub fn edge(&self, key: &EdgeKey) -> Option<&GraphEdge> {
        self.edges.get(key)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Keeps only nodes matching `keep`, dropping every edge that touches a
    /// removed node.
    pub fn retain_nodes(&mut self, mut keep: impl FnMut(&GraphNode) -> bool) {
        self.nodes.retain(|_, node| keep(node));
        let nodes = &self.nodes;
        self.edges
            .retain(|key, _| nodes.contains_key(&key.from) && nodes.contains_key(&key.to));
    }

    /// Unions another graph into this one.
    ///
    /// Nodes and edges already present keep their attributes; entries that
    /// only exist in `other` are added.
    pub fn compose(&mut self, other: RoadGraph) {
        for (id, node) in other.nodes {
            self.nodes.entry(id).or_insert(node);
        }
        for (key, edge) in other.edges {
            self.edges.entry(key).or_insert(edge);
        }
    }

    /// Unions all graphs in order; the first graph holding an entry wins.
    ///
    /// Always returns a graph, empty when the input is empty.
    pub fn compose_all(graphs: impl IntoIterator<Item = RoadGraph>) -> RoadGraph {
        graphs.into_iter().fold(RoadGraph::new(), |mut merged, g| {
            merged.compose(g);
            merged
        })
    }
}
