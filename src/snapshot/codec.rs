//! `SnapshotCodec` — validates and (de)serializes a graph to/from a JSON
//! document. Unknown fields at node/edge/metadata level are preserved
//! silently for forward compatibility.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::graph::GraphStore;
use crate::types::{Content, GraphError, GraphResult, Information, Relationship};

/// Top-level snapshot metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    pub version: String,
    pub created: DateTime<Utc>,
    pub node_count: usize,
    pub edge_count: usize,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A complete, validated snapshot document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDocument {
    pub nodes: Vec<Information>,
    pub edges: Vec<Relationship>,
    pub metadata: SnapshotMetadata,
}

const SNAPSHOT_VERSION: &str = "1";

/// Serializes a graph to a [`SnapshotDocument`] and validates/loads one back.
pub struct SnapshotCodec;

impl SnapshotCodec {
    /// Build a snapshot document from the current graph contents.
    pub fn encode(store: &GraphStore) -> SnapshotDocument {
        let nodes: Vec<Information> = store.nodes().cloned().collect();
        let edges: Vec<Relationship> = store.edges().cloned().collect();
        SnapshotDocument {
            metadata: SnapshotMetadata {
                version: SNAPSHOT_VERSION.to_string(),
                created: Utc::now(),
                node_count: nodes.len(),
                edge_count: edges.len(),
                extra: Map::new(),
            },
            nodes,
            edges,
        }
    }

    /// Replace the contents of `store` with the nodes and edges of `doc`.
    /// Callers are responsible for constructing a fresh store first if a
    /// clean load (rather than a merge) is desired.
    pub fn apply(store: &mut GraphStore, doc: SnapshotDocument) -> GraphResult<()> {
        for node in doc.nodes {
            store.add_node(node, None)?;
        }
        for edge in doc.edges {
            store.add_edge(edge, None)?;
        }
        Ok(())
    }

    /// Serialize a document to a pretty-printed JSON string.
    pub fn to_json(doc: &SnapshotDocument) -> GraphResult<String> {
        Ok(serde_json::to_string_pretty(doc)?)
    }

    /// Parse and fully validate a JSON document, per the snapshot schema:
    /// rejects a non-object document, non-array `nodes`/`edges`, a missing
    /// `metadata`, and any node/edge missing its required fields.
    pub fn from_json(text: &str) -> GraphResult<SnapshotDocument> {
        let value: Value = serde_json::from_str(text)?;
        Self::validate(&value)?;
        let doc: SnapshotDocument = serde_json::from_value(value)?;
        Ok(doc)
    }

    fn validate(value: &Value) -> GraphResult<()> {
        let obj = value
            .as_object()
            .ok_or_else(|| GraphError::InvalidGraphData("snapshot must be a JSON object".into()))?;

        let nodes = obj
            .get("nodes")
            .and_then(Value::as_array)
            .ok_or_else(|| GraphError::InvalidGraphData("`nodes` must be an array".into()))?;
        let edges = obj
            .get("edges")
            .and_then(Value::as_array)
            .ok_or_else(|| GraphError::InvalidGraphData("`edges` must be an array".into()))?;
        if !obj.get("metadata").is_some_and(Value::is_object) {
            return Err(GraphError::InvalidGraphData("`metadata` must be an object".into()));
        }

        for (i, node) in nodes.iter().enumerate() {
            let node = node
                .as_object()
                .ok_or_else(|| GraphError::InvalidGraphData(format!("node[{i}] must be an object")))?;
            for field in ["id", "content", "type", "created", "modified"] {
                if !node.contains_key(field) {
                    return Err(GraphError::InvalidGraphData(format!(
                        "node[{i}] missing required field `{field}`"
                    )));
                }
            }
        }

        for (i, edge) in edges.iter().enumerate() {
            let edge = edge
                .as_object()
                .ok_or_else(|| GraphError::InvalidGraphData(format!("edge[{i}] must be an object")))?;
            for field in ["from", "to", "type", "strength", "created"] {
                if !edge.contains_key(field) {
                    return Err(GraphError::InvalidGraphData(format!(
                        "edge[{i}] missing required field `{field}`"
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Round-trips an opaque [`Content`] value through JSON unchanged; exposed
/// for callers building custom tooling around snapshot payloads.
pub fn content_round_trips(content: &Content) -> GraphResult<Content> {
    let text = serde_json::to_string(content)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Content;

    fn sample_store() -> GraphStore {
        let mut store = GraphStore::new();
        store
            .add_node(Information::new("a", Content::String("x".into()), "fact").unwrap(), None)
            .unwrap();
        store
            .add_node(Information::new("b", Content::Null, "fact").unwrap(), None)
            .unwrap();
        store
            .add_edge(Relationship::new("a", "b", "related_to", 0.5).unwrap(), None)
            .unwrap();
        store
    }

    #[test]
    fn encode_then_decode_preserves_counts() {
        let store = sample_store();
        let doc = SnapshotCodec::encode(&store);
        let json = SnapshotCodec::to_json(&doc).unwrap();
        let parsed = SnapshotCodec::from_json(&json).unwrap();
        assert_eq!(parsed.nodes.len(), 2);
        assert_eq!(parsed.edges.len(), 1);
    }

    #[test]
    fn rejects_non_object_document() {
        let err = SnapshotCodec::from_json("[1,2,3]").unwrap_err();
        assert!(matches!(err, GraphError::InvalidGraphData(_)));
    }

    #[test]
    fn rejects_node_missing_required_field() {
        let text = r#"{"nodes":[{"id":"a"}],"edges":[],"metadata":{}}"#;
        let err = SnapshotCodec::from_json(text).unwrap_err();
        assert!(matches!(err, GraphError::InvalidGraphData(_)));
    }

    #[test]
    fn preserves_unknown_metadata_fields() {
        let text = r#"{"nodes":[],"edges":[],"metadata":{"version":"1","created":"2024-01-01T00:00:00Z","nodeCount":0,"edgeCount":0,"custom":"kept"}}"#;
        let doc = SnapshotCodec::from_json(text).unwrap();
        assert_eq!(doc.metadata.extra.get("custom").unwrap(), "kept");
    }

    #[test]
    fn nested_content_round_trips() {
        let mut map = std::collections::BTreeMap::new();
        map.insert("data".to_string(), Content::String("t".into()));
        map.insert(
            "numbers".to_string(),
            Content::Sequence(vec![Content::Number(1.0), Content::Number(2.0), Content::Number(3.0)]),
        );
        let nested = Content::Map(std::collections::BTreeMap::from([(
            "nested".to_string(),
            Content::Map(map),
        )]));
        let round_tripped = content_round_trips(&nested).unwrap();
        assert_eq!(nested, round_tripped);
    }
}
