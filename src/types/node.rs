//! Information nodes — the raw, opaque vertices of the graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::content::{Content, Metadata};
use super::error::{GraphError, GraphResult};

/// A single Information node: an opaque content record stored as a graph
/// vertex. `id` is immutable once assigned; `modified` never precedes
/// `created`; `node_type` is always non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Information {
    /// Unique identifier, assigned once and never reused.
    pub id: String,
    /// Opaque payload — preserved verbatim across snapshots.
    pub content: Content,
    /// A non-empty classification string, e.g. `"fact"`, `"concept"`.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Where this information came from, if known.
    pub source: Option<String>,
    /// When this node was first added.
    pub created: DateTime<Utc>,
    /// When this node was last updated. Always `>= created`.
    pub modified: DateTime<Utc>,
    /// Free-form keyed annotations.
    pub metadata: Option<Metadata>,
}

impl Information {
    /// Construct a new node, stamping `created == modified == now`.
    ///
    /// Returns `GraphError::InvalidData` if `node_type` is empty or
    /// whitespace-only.
    pub fn new(id: impl Into<String>, content: Content, node_type: impl Into<String>) -> GraphResult<Self> {
        let node_type = node_type.into();
        if node_type.trim().is_empty() {
            return Err(GraphError::InvalidData("node type must be non-empty".into()));
        }
        let now = Utc::now();
        Ok(Self {
            id: id.into(),
            content,
            node_type,
            source: None,
            created: now,
            modified: now,
            metadata: None,
        })
    }

    /// Apply a partial update (everything but `id`), bumping `modified` to
    /// `at`. `node_type`, if present, must be non-empty.
    pub fn apply_patch(&mut self, patch: NodePatch, at: DateTime<Utc>) -> GraphResult<()> {
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(node_type) = patch.node_type {
            if node_type.trim().is_empty() {
                return Err(GraphError::InvalidData("node type must be non-empty".into()));
            }
            self.node_type = node_type;
        }
        if let Some(source) = patch.source {
            self.source = source;
        }
        if let Some(metadata) = patch.metadata {
            self.metadata = metadata;
        }
        self.modified = at.max(self.modified);
        Ok(())
    }
}

/// A partial update to an `Information` node. Every field is optional;
/// absent fields are left unchanged. `Some(None)` clears an optional field
/// (e.g. `source: Some(None)` removes the source).
#[derive(Debug, Clone, Default)]
pub struct NodePatch {
    /// New content, if replacing it.
    pub content: Option<Content>,
    /// New type, if replacing it. Must be non-empty.
    pub node_type: Option<String>,
    /// New source (or `Some(None)` to clear it).
    pub source: Option<Option<String>>,
    /// New metadata (or `Some(None)` to clear it).
    pub metadata: Option<Option<Metadata>>,
}
