//! OpenStreetMap data via the Overpass API.
//!
//! # Queries
//!
//! - Graph: every `highway` way intersecting the box (no travel-mode
//!   restriction), recursed down to all of its nodes. The graph is then
//!   truncated by edge: an outside node survives only while it shares an
//!   edge with a node inside the box, so a way crossing the boundary keeps
//!   its first outside segment and nothing beyond.
//! - Features: `nwr["key"="value"]` for each pair of the tag filter, with
//!   inline geometry (`out geom`).
//!
//! Overpass expects boxes as `(south, west, north, east)`.
//!
//! # Endpoints
//!
//! Endpoints are tried in order and the first successful answer wins.

use std::collections::{BTreeMap, HashSet};

use geo::{Coord, Geometry, LineString, MultiLineString, Point, Polygon};
use serde::Deserialize;
use tracing::debug;

use super::http::{HttpClient, DEFAULT_TIMEOUT_SECS};
use super::types::{FetchError, MapDataProvider, TagFilter};
use crate::coord::GeoPoint;
use crate::model::{
    ElementRef, ElementType, Feature, FeatureCollection, GraphNode, NodeId, RoadGraph,
};
use crate::tile::BoundingBox;

/// Public Overpass instances used when none are configured.
pub const DEFAULT_OVERPASS_URLS: [&str; 2] = [
    "https://overpass-api.de/api/interpreter",
    "https://overpass.kumi.systems/api/interpreter",
];

/// Highway values that do not describe a usable way.
const EXCLUDED_HIGHWAYS: &str =
    "abandoned|construction|no|planned|platform|proposed|raceway|razed";

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
    remark: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(rename = "type")]
    element_type: String,
    id: i64,
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    nodes: Vec<i64>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
    #[serde(default)]
    geometry: Vec<Option<LatLon>>,
    #[serde(default)]
    members: Vec<OverpassMember>,
}

#[derive(Debug, Deserialize)]
struct OverpassMember {
    #[serde(default)]
    geometry: Vec<Option<LatLon>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct LatLon {
    lat: f64,
    lon: f64,
}

/// Direction(s) in which a way may be traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Oneway {
    Forward,
    Reverse,
    Both,
}

impl Oneway {
    fn of(tags: &BTreeMap<String, String>) -> Self {
        match tags.get("oneway").map(String::as_str) {
            Some("yes" | "true" | "1") => Oneway::Forward,
            Some("-1" | "reverse") => Oneway::Reverse,
            _ => Oneway::Both,
        }
    }
}

/// Overpass-backed map-data provider.
///
/// # Example
///
/// ```no_run
/// use osmtile::provider::{OverpassProvider, ReqwestClient, MapDataProvider};
///
/// let client = ReqwestClient::new().unwrap();
/// let provider = OverpassProvider::with_defaults(client);
/// assert_eq!(provider.name(), "Overpass");
/// ```
pub struct OverpassProvider<C: HttpClient> {
    http_client: C,
    endpoints: Vec<String>,
    timeout_secs: u64,
}

impl<C: HttpClient> OverpassProvider<C> {
    /// Creates a provider querying the given endpoints in order.
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client for making requests
    /// * `endpoints` - Overpass interpreter URLs
    /// * `timeout_secs` - Server-side query timeout
    pub fn new(http_client: C, endpoints: Vec<String>, timeout_secs: u64) -> Self {
        Self {
            http_client,
            endpoints,
            timeout_secs,
        }
    }

    /// Creates a provider using the public endpoints and default timeout.
    pub fn with_defaults(http_client: C) -> Self {
        Self::new(
            http_client,
            DEFAULT_OVERPASS_URLS.iter().map(ToString::to_string).collect(),
            DEFAULT_TIMEOUT_SECS,
        )
    }

    fn graph_query(&self, bbox: &BoundingBox) -> String {
        format!(
            "[out:json][timeout:{}];\
             (way[\"highway\"][\"area\"!~\"yes\"][\"highway\"!~\"{}\"]({});>;);\
             out;",
            self.timeout_secs,
            EXCLUDED_HIGHWAYS,
            bbox_filter(bbox)
        )
    }

    fn features_query(&self, bbox: &BoundingBox, filter: &TagFilter) -> String {
        let area = bbox_filter(bbox);
        let clauses: String = filter
            .pairs()
            .map(|(k, v)| format!("nwr[\"{}\"=\"{}\"]({});", escape(k), escape(v), area))
            .collect();
        format!(
            "[out:json][timeout:{}];({});out geom;",
            self.timeout_secs, clauses
        )
    }

    fn execute(&self, query: &str) -> Result<OverpassResponse, FetchError> {
        let mut errors = Vec::new();

        for url in &self.endpoints {
            match self.execute_at(url, query) {
                Ok(response) => return Ok(response),
                Err(e) => {
                    debug!(url = %url, error = %e, "Overpass endpoint failed");
                    errors.push(format!("{}: {}", url, e));
                }
            }
        }

        Err(FetchError::AllEndpointsFailed(errors))
    }

    fn execute_at(&self, url: &str, query: &str) -> Result<OverpassResponse, FetchError> {
        let body = self.http_client.post_form(url, &[("data", query)])?;
        let response: OverpassResponse = serde_json::from_slice(&body)
            .map_err(|e| FetchError::InvalidResponse(format!("invalid Overpass JSON: {}", e)))?;

        if let Some(remark) = &response.remark {
            if remark.contains("runtime error") {
                return Err(FetchError::Remote(remark.clone()));
            }
        }

        Ok(response)
    }
}

impl<C: HttpClient> MapDataProvider for OverpassProvider<C> {
    fn graph_in_bbox(&self, bbox: &BoundingBox) -> Result<RoadGraph, FetchError> {
        let response = self.execute(&self.graph_query(bbox))?;
        let mut graph = build_graph(response);
        truncate_by_edge(&mut graph, bbox);
        Ok(graph)
    }

    fn features_in_bbox(
        &self,
        bbox: &BoundingBox,
        filter: &TagFilter,
    ) -> Result<FeatureCollection, FetchError> {
        let response = self.execute(&self.features_query(bbox, filter))?;
        Ok(build_features(response))
    }

    fn name(&self) -> &str {
        "Overpass"
    }
}

fn bbox_filter(bbox: &BoundingBox) -> String {
    format!(
        "{:.7},{:.7},{:.7},{:.7}",
        bbox.south(),
        bbox.west(),
        bbox.north(),
        bbox.east()
    )
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn build_graph(response: OverpassResponse) -> RoadGraph {
    let mut graph = RoadGraph::new();
    let mut ways = Vec::new();

    for element in response.elements {
        match element.element_type.as_str() {
            "node" => {
                if let (Some(lat), Some(lon)) = (element.lat, element.lon) {
                    graph.add_node(GraphNode {
                        id: element.id,
                        lat,
                        lon,
                        tags: element.tags,
                    });
                }
            }
            "way" => ways.push(element),
            _ => {}
        }
    }

    for way in ways {
        let oneway = Oneway::of(&way.tags);
        for pair in way.nodes.windows(2) {
            let (u, v) = (pair[0], pair[1]);
            if oneway != Oneway::Reverse {
                graph.connect(u, v, way.id, &way.tags);
            }
            if oneway != Oneway::Forward {
                graph.connect(v, u, way.id, &way.tags);
            }
        }
    }

    graph
}

/// Drops outside nodes with no edge to an inside node, and their edges.
fn truncate_by_edge(graph: &mut RoadGraph, bbox: &BoundingBox) {
    let inside: HashSet<NodeId> = graph
        .nodes()
        .filter(|n| bbox.contains(GeoPoint::new(n.lat, n.lon)))
        .map(|n| n.id)
        .collect();

    let mut keep = inside.clone();
    for edge in graph.edges() {
        if inside.contains(&edge.key.from) || inside.contains(&edge.key.to) {
            keep.insert(edge.key.from);
            keep.insert(edge.key.to);
        }
    }

    let before = graph.node_count();
    graph.retain_nodes(|n| keep.contains(&n.id));
    if graph.node_count() < before {
        debug!(
            dropped = before - graph.node_count(),
            kept = graph.node_count(),
            "Truncated graph at bbox"
        );
    }
}

fn build_features(response: OverpassResponse) -> FeatureCollection {
    let mut features = FeatureCollection::default();

    for element in response.elements {
        let (kind, geometry) = match element.element_type.as_str() {
            "node" => match (element.lat, element.lon) {
                (Some(lat), Some(lon)) => (
                    ElementType::Node,
                    Some(Geometry::Point(Point::new(lon, lat))),
                ),
                _ => (ElementType::Node, None),
            },
            "way" => (ElementType::Way, way_geometry(&element.geometry)),
            "relation" => {
                let members: Vec<LineString<f64>> = element
                    .members
                    .iter()
                    .map(|m| coords(&m.geometry))
                    .filter(|ring| !ring.is_empty())
                    .map(LineString::new)
                    .collect();
                let geometry = (!members.is_empty())
                    .then(|| Geometry::MultiLineString(MultiLineString::new(members)));
                (ElementType::Relation, geometry)
            }
            _ => continue,
        };

        let Some(geometry) = geometry else {
            continue;
        };
        features.push(Feature {
            element: ElementRef {
                kind,
                id: element.id,
            },
            tags: element.tags,
            geometry,
        });
    }

    features
}

fn coords(geometry: &[Option<LatLon>]) -> Vec<Coord<f64>> {
    geometry
        .iter()
        .flatten()
        .map(|p| Coord { x: p.lon, y: p.lat })
        .collect()
}

fn way_geometry(geometry: &[Option<LatLon>]) -> Option<Geometry<f64>> {
    let points = coords(geometry);
    match points.len() {
        0 => None,
        1 => Some(Geometry::Point(Point(points[0]))),
        n if n >= 4 && points[0] == points[n - 1] => Some(Geometry::Polygon(Polygon::new(
            LineString::new(points),
            vec![],
        ))),
        _ => Some(Geometry::LineString(LineString::new(points))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EdgeKey;
    use crate::provider::MockHttpClient;

    const PRIMARY: &str = "https://primary.example/api/interpreter";
    const SECONDARY: &str = "https://secondary.example/api/interpreter";

    fn bbox() -> BoundingBox {
        BoundingBox::new(40.01, 40.0, -73.99, -74.0)
    }

    fn provider(mock: MockHttpClient) -> OverpassProvider<MockHttpClient> {
        OverpassProvider::new(mock, vec![PRIMARY.to_string(), SECONDARY.to_string()], 25)
    }

    const GRAPH_JSON: &str = r#"{
        "version": 0.6,
        "elements": [
            {"type": "node", "id": 1, "lat": 40.001, "lon": -73.999},
            {"type": "node", "id": 2, "lat": 40.002, "lon": -73.998,
             "tags": {"highway": "crossing"}},
            {"type": "node", "id": 3, "lat": 40.003, "lon": -73.997},
            {"type": "way", "id": 100, "nodes": [1, 2, 3], "tags": {"highway": "residential"}}
        ]
    }"#;

    #[test]
    fn test_graph_two_way_street() {
        let mock = MockHttpClient::with_response(PRIMARY, Ok(GRAPH_JSON.as_bytes().to_vec()));
        let graph = provider(mock).graph_in_bbox(&bbox()).unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 4);
        let edge = graph
            .edge(&EdgeKey {
                from: 2,
                to: 1,
                way_id: 100,
            })
            .unwrap();
        assert!(edge.length_m > 100.0 && edge.length_m < 200.0);
        assert_eq!(edge.tags.get("highway").unwrap(), "residential");
        assert_eq!(graph.node(2).unwrap().tags.get("highway").unwrap(), "crossing");
    }

    #[test]
    fn test_graph_oneway() {
        let json = GRAPH_JSON.replace(
            r#""highway": "residential""#,
            r#""highway": "residential", "oneway": "-1""#,
        );
        let mock = MockHttpClient::with_response(PRIMARY, Ok(json.into_bytes()));
        let graph = provider(mock).graph_in_bbox(&bbox()).unwrap();

        assert_eq!(graph.edge_count(), 2);
        assert!(graph
            .edge(&EdgeKey {
                from: 3,
                to: 2,
                way_id: 100
            })
            .is_some());
    }

    #[test]
    fn test_graph_truncated_by_edge() {
        // Way 200 runs from inside the box to two nodes further north; only
        // the first outside node shares an edge with an inside node.
        let json = r#"{
            "elements": [
                {"type": "node", "id": 1, "lat": 40.005, "lon": -73.995},
                {"type": "node", "id": 2, "lat": 40.009, "lon": -73.995},
                {"type": "node", "id": 3, "lat": 40.015, "lon": -73.995},
                {"type": "node", "id": 4, "lat": 40.020, "lon": -73.995},
                {"type": "node", "id": 5, "lat": 40.030, "lon": -73.995},
                {"type": "node", "id": 6, "lat": 40.020, "lon": -73.980},
                {"type": "way", "id": 200, "nodes": [1, 2, 3, 4, 5],
                 "tags": {"highway": "primary"}},
                {"type": "way", "id": 201, "nodes": [4, 6], "tags": {"highway": "service"}}
            ]
        }"#;
        let mock = MockHttpClient::with_response(PRIMARY, Ok(json.as_bytes().to_vec()));
        let graph = provider(mock).graph_in_bbox(&bbox()).unwrap();

        let ids: Vec<_> = graph.nodes().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(graph.edge_count(), 4);
        assert!(graph.edges().all(|e| e.key.way_id == 200));
        assert!(graph
            .edge(&EdgeKey {
                from: 3,
                to: 2,
                way_id: 200
            })
            .is_some());
    }

    #[test]
    fn test_graph_query_shape() {
        let mock = MockHttpClient::with_response(PRIMARY, Ok(GRAPH_JSON.as_bytes().to_vec()));
        let provider = provider(mock);
        provider.graph_in_bbox(&bbox()).unwrap();

        let requests = provider.http_client.requests.lock();
        let (url, form) = &requests[0];
        assert_eq!(url, PRIMARY);
        assert_eq!(form[0].0, "data");
        let query = &form[0].1;
        assert!(query.starts_with("[out:json][timeout:25];"));
        assert!(query.contains("(40.0000000,-74.0000000,40.0100000,-73.9900000)"));
        assert!(query.contains(">;"));
    }

    #[test]
    fn test_features_parse_geometries() {
        let json = r#"{
            "elements": [
                {"type": "node", "id": 5, "lat": 40.005, "lon": -73.995,
                 "tags": {"natural": "water"}},
                {"type": "way", "id": 6, "tags": {"natural": "water"}, "geometry": [
                    {"lat": 40.0, "lon": -74.0}, {"lat": 40.0, "lon": -73.99},
                    {"lat": 40.01, "lon": -73.99}, {"lat": 40.0, "lon": -74.0}
                ]},
                {"type": "way", "id": 7, "tags": {"waterway": "riverbank"}, "geometry": [
                    {"lat": 40.0, "lon": -74.0}, {"lat": 40.01, "lon": -73.99}
                ]},
                {"type": "relation", "id": 8, "tags": {"natural": "water"}, "members": [
                    {"type": "way", "ref": 60, "role": "outer", "geometry": [
                        {"lat": 40.0, "lon": -74.0}, null, {"lat": 40.01, "lon": -73.99}
                    ]},
                    {"type": "node", "ref": 61, "role": "label"}
                ]}
            ]
        }"#;
        let mock = MockHttpClient::with_response(PRIMARY, Ok(json.as_bytes().to_vec()));
        let features = provider(mock)
            .features_in_bbox(&bbox(), &TagFilter::water())
            .unwrap();

        let geometries: Vec<_> = features.iter().map(|f| &f.geometry).collect();
        assert_eq!(features.len(), 4);
        assert_eq!(*geometries[0], Geometry::Point(Point::new(-73.995, 40.005)));
        assert!(matches!(geometries[1], Geometry::Polygon(p) if p.exterior().0.len() == 4));
        assert!(matches!(geometries[2], Geometry::LineString(l) if l.0.len() == 2));
        assert!(matches!(
            geometries[3],
            Geometry::MultiLineString(m) if m.0.len() == 1 && m.0[0].0.len() == 2
        ));
    }

    #[test]
    fn test_features_query_has_every_pair() {
        let mock = MockHttpClient::with_response(PRIMARY, Ok(br#"{"elements": []}"#.to_vec()));
        let provider = provider(mock);
        let features = provider
            .features_in_bbox(&bbox(), &TagFilter::parks())
            .unwrap();
        assert!(features.is_empty());

        let requests = provider.http_client.requests.lock();
        let query = &requests[0].1[0].1;
        assert!(query.contains(r#"nwr["leisure"="park"]"#));
        assert!(query.contains(r#"nwr["landuse"="grass"]"#));
        assert!(query.ends_with("out geom;"));
    }

    #[test]
    fn test_falls_back_to_second_endpoint() {
        let mut mock = MockHttpClient::with_response(
            PRIMARY,
            Err(FetchError::Status {
                status: 429,
                url: PRIMARY.to_string(),
            }),
        );
        mock.responses
            .insert(SECONDARY.to_string(), Ok(GRAPH_JSON.as_bytes().to_vec()));
        let provider = provider(mock);

        let graph = provider.graph_in_bbox(&bbox()).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(provider.http_client.request_count(), 2);
    }

    #[test]
    fn test_all_endpoints_failed() {
        let mock = MockHttpClient::with_response(PRIMARY, Ok(b"<html>busy</html>".to_vec()));
        let err = provider(mock).graph_in_bbox(&bbox()).unwrap_err();

        match err {
            FetchError::AllEndpointsFailed(errors) => {
                assert_eq!(errors.len(), 2);
                assert!(errors[0].contains("invalid Overpass JSON"));
                assert!(errors[1].contains("404"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_runtime_remark_is_remote_error() {
        let json = r#"{
            "elements": [],
            "remark": "runtime error: Query timed out in \"query\" at line 1 after 26 seconds."
        }"#;
        let provider = OverpassProvider::new(
            MockHttpClient::with_response(PRIMARY, Ok(json.as_bytes().to_vec())),
            vec![PRIMARY.to_string()],
            25,
        );

        let err = provider.graph_in_bbox(&bbox()).unwrap_err();
        match err {
            FetchError::AllEndpointsFailed(errors) => assert!(errors[0].contains("timed out")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_escape_quotes() {
        assert_eq!(escape(r#"a"b\c"#), r#"a\"b\\c"#);
    }
}
