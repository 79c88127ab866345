//! Persisted form of one dataset of a tile.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::traits::StorageError;

/// A dataset that was either fetched or confirmed unavailable.
///
/// Absence is cached like data: an absent artifact is never re-fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Artifact<T> {
    Present(T),
    /// The fetch failed; `reason` keeps the failure message.
    Absent { reason: String },
}

impl<T> Artifact<T> {
    pub fn absent(reason: impl Into<String>) -> Self {
        Artifact::Absent {
            reason: reason.into(),
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Artifact::Present(_))
    }

    pub fn as_ref(&self) -> Option<&T> {
        match self {
            Artifact::Present(data) => Some(data),
            Artifact::Absent { .. } => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Artifact::Present(data) => Some(data),
            Artifact::Absent { .. } => None,
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for Artifact<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Artifact::Present(data),
            Err(e) => Artifact::absent(e.to_string()),
        }
    }
}

impl<T: Serialize> Artifact<T> {
    /// Serializes the artifact for storage under `key`.
    pub fn encode(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        bincode::serialize(self).map_err(|e| StorageError::Encode {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }
}

impl<T: DeserializeOwned> Artifact<T> {
    /// Deserializes an artifact read from `key`.
    pub fn decode(key: &str, bytes: &[u8]) -> Result<Self, StorageError> {
        bincode::deserialize(bytes).map_err(|e| StorageError::Decode {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FeatureCollection, GraphNode, RoadGraph};
    use crate::provider::FetchError;
    use std::collections::BTreeMap;

    #[test]
    fn test_graph_survives_storage() {
        let mut graph = RoadGraph::new();
        graph.add_node(GraphNode {
            id: 42,
            lat: 40.0,
            lon: -74.0,
            tags: BTreeMap::from([("highway".to_string(), "stop".to_string())]),
        });
        let artifact = Artifact::Present(graph);

        let bytes = artifact.encode("k").unwrap();
        let decoded: Artifact<RoadGraph> = Artifact::decode("k", &bytes).unwrap();
        assert_eq!(decoded, artifact);
    }

    #[test]
    fn test_absent_keeps_reason_and_differs_from_empty() {
        let failed: Artifact<FeatureCollection> =
            Err::<FeatureCollection, _>(FetchError::HttpError("timeout".into())).into();
        let empty = Artifact::Present(FeatureCollection::default());

        let failed_back: Artifact<FeatureCollection> =
            Artifact::decode("k", &failed.encode("k").unwrap()).unwrap();
        let empty_back: Artifact<FeatureCollection> =
            Artifact::decode("k", &empty.encode("k").unwrap()).unwrap();

        assert!(matches!(&failed_back, Artifact::Absent { reason } if reason.contains("timeout")));
        assert!(empty_back.is_present());
        assert_eq!(empty_back.as_ref().map(FeatureCollection::len), Some(0));
    }

    #[test]
    fn test_truncated_bytes_fail_to_decode() {
        let bytes = Artifact::Present(RoadGraph::new()).encode("k").unwrap();
        let result = Artifact::<RoadGraph>::decode("z1N_graph_0_0", &bytes[..bytes.len() - 1]);
        assert!(matches!(result, Err(StorageError::Decode { key, .. }) if key == "z1N_graph_0_0"));
    }
}
