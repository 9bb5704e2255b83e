//! Knowledge edges — typed directed relationships between two nodes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::content::Metadata;
use super::error::{GraphError, GraphResult};

/// The uniqueness key for an edge: `(from, to, type)`. Self-loops are
/// permitted; inserting an edge with an existing key replaces the prior one.
pub type EdgeKey = (String, String, String);

/// A directed, typed relationship between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Source node id.
    pub from: String,
    /// Target node id.
    pub to: String,
    /// A non-empty relationship type, e.g. `"caused_by"`, `"related_to"`.
    #[serde(rename = "type")]
    pub edge_type: String,
    /// Relationship strength in `[0, 1]`. Defaults to `1.0`.
    pub strength: f64,
    /// When this edge was created.
    pub created: DateTime<Utc>,
    /// Free-form keyed annotations.
    pub metadata: Option<Metadata>,
}

impl Relationship {
    /// Construct a new edge with strength clamped to `[0, 1]`.
    ///
    /// Returns `GraphError::InvalidData` if `edge_type` is empty or
    /// whitespace-only.
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        edge_type: impl Into<String>,
        strength: f64,
    ) -> GraphResult<Self> {
        let edge_type = edge_type.into();
        if edge_type.trim().is_empty() {
            return Err(GraphError::InvalidData("edge type must be non-empty".into()));
        }
        Ok(Self {
            from: from.into(),
            to: to.into(),
            edge_type,
            strength: strength.clamp(0.0, 1.0),
            created: Utc::now(),
            metadata: None,
        })
    }

    /// This edge's uniqueness key.
    pub fn key(&self) -> EdgeKey {
        (self.from.clone(), self.to.clone(), self.edge_type.clone())
    }

    /// Whether this edge is a self-loop.
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

/// Which direction to follow when querying a node's incident edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Edges where this node is `from`.
    Out,
    /// Edges where this node is `to`.
    In,
    /// The union of `Out` and `In`.
    Both,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_strength() {
        let edge = Relationship::new("a", "b", "related_to", 5.0).unwrap();
        assert_eq!(edge.strength, 1.0);
        let edge = Relationship::new("a", "b", "related_to", -5.0).unwrap();
        assert_eq!(edge.strength, 0.0);
    }

    #[test]
    fn rejects_empty_type() {
        let err = Relationship::new("a", "b", "", 1.0).unwrap_err();
        assert!(matches!(err, GraphError::InvalidData(_)));
    }

    #[test]
    fn self_loops_are_permitted() {
        let edge = Relationship::new("a", "a", "related_to", 1.0).unwrap();
        assert!(edge.is_self_loop());
    }

    #[test]
    fn key_is_the_from_to_type_triple() {
        let edge = Relationship::new("a", "b", "related_to", 1.0).unwrap();
        assert_eq!(
            edge.key(),
            ("a".to_string(), "b".to_string(), "related_to".to_string())
        );
    }
}
