//! `GraphStore` — the core in-memory graph: nodes, typed directed edges,
//! and the adjacency indexes that make neighbor and traversal queries O(deg).

use std::collections::{HashMap, HashSet};

use crate::event::{EventBus, EventPayload};
use crate::types::{Direction, EdgeKey, GraphError, GraphResult, Information, NodePatch, Relationship};

use super::text_index::TextIndex;

/// The graph store exclusively owns all nodes and edges; every other
/// component (analysis engines, experience tracking) references them only
/// by id.
pub struct GraphStore {
    nodes: HashMap<String, Information>,
    edges: HashMap<EdgeKey, Relationship>,
    out_adjacency: HashMap<String, Vec<EdgeKey>>,
    in_adjacency: HashMap<String, Vec<EdgeKey>>,
    text_index: Option<Box<dyn TextIndex>>,
}

fn is_blank(id: &str) -> bool {
    id.trim().is_empty()
}

impl GraphStore {
    /// Create an empty store with no text-index collaborator wired in.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            out_adjacency: HashMap::new(),
            in_adjacency: HashMap::new(),
            text_index: None,
        }
    }

    /// Wire in a text-index collaborator; the store notifies it on every
    /// node CRUD operation.
    pub fn with_text_index(mut self, index: Box<dyn TextIndex>) -> Self {
        self.text_index = Some(index);
        self
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of live edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Add a new node. Rejects a blank id or a node whose type is empty
    /// (the latter cannot normally happen since `Information::new` already
    /// enforces it, but a caller-constructed value is re-checked here too).
    pub fn add_node(&mut self, info: Information, events: Option<&EventBus>) -> GraphResult<String> {
        if is_blank(&info.id) {
            return Err(GraphError::InvalidId(info.id));
        }
        if info.node_type.trim().is_empty() {
            return Err(GraphError::InvalidData("node type must be non-empty".into()));
        }
        let id = info.id.clone();
        log::debug!("adding node {id:?} (type={:?})", info.node_type);
        if let Some(index) = self.text_index.as_mut() {
            index.add_node(&info);
        }
        self.nodes.insert(id.clone(), info);
        if let Some(bus) = events {
            bus.emit("information:afterAdd", EventPayload::String(id.clone()));
        }
        Ok(id)
    }

    /// Look up a node by id. Returns `None` for an unknown or blank id.
    pub fn get_node(&self, id: &str) -> Option<&Information> {
        if is_blank(id) {
            return None;
        }
        self.nodes.get(id)
    }

    /// Apply a partial update to a node, bumping `modified`. Returns
    /// `Ok(false)` for an unknown or blank id; `Err` if the patch itself is
    /// invalid (e.g. an empty replacement type).
    pub fn update_node(
        &mut self,
        id: &str,
        patch: NodePatch,
        events: Option<&EventBus>,
    ) -> GraphResult<bool> {
        if is_blank(id) {
            return Ok(false);
        }
        let Some(node) = self.nodes.get_mut(id) else {
            return Ok(false);
        };
        node.apply_patch(patch, chrono::Utc::now())?;
        log::debug!("updated node {id:?}");
        if let Some(index) = self.text_index.as_mut() {
            index.update_node(node);
        }
        if let Some(bus) = events {
            bus.emit("information:afterUpdate", EventPayload::String(id.to_string()));
        }
        Ok(true)
    }

    /// Delete a node, cascading to every incident edge. Returns the ids of
    /// the edges removed, so callers (the experience layer in particular)
    /// can cascade further to experiences/strategies referencing the node.
    pub fn delete_node(&mut self, id: &str, events: Option<&EventBus>) -> Option<Vec<EdgeKey>> {
        if is_blank(id) {
            return None;
        }
        let node = self.nodes.remove(id)?;
        log::info!("deleting node {id:?}, cascading to incident edges");
        let mut removed_keys = Vec::new();
        for key in self.out_adjacency.remove(id).unwrap_or_default() {
            self.edges.remove(&key);
            removed_keys.push(key);
        }
        for key in self.in_adjacency.remove(id).unwrap_or_default() {
            if self.edges.remove(&key).is_some() {
                removed_keys.push(key);
            }
        }
        // The removed node may also appear as the *other* endpoint in
        // adjacency lists we didn't just drop wholesale.
        for list in self.out_adjacency.values_mut() {
            list.retain(|(_, to, _)| to != id);
        }
        for list in self.in_adjacency.values_mut() {
            list.retain(|(from, _, _)| from != id);
        }
        if let Some(index) = self.text_index.as_mut() {
            index.remove_node(id);
        }
        if let Some(bus) = events {
            bus.emit("information:afterDelete", EventPayload::String(id.to_string()));
        }
        let _ = node;
        Some(removed_keys)
    }

    /// Insert (or replace) an edge. Rejects edges whose endpoints don't
    /// exist. Re-inserting an existing `(from, to, type)` key replaces the
    /// prior edge.
    pub fn add_edge(&mut self, rel: Relationship, events: Option<&EventBus>) -> GraphResult<EdgeKey> {
        if !self.nodes.contains_key(&rel.from) {
            return Err(GraphError::ConstraintViolation(format!(
                "edge source {:?} does not exist",
                rel.from
            )));
        }
        if !self.nodes.contains_key(&rel.to) {
            return Err(GraphError::ConstraintViolation(format!(
                "edge target {:?} does not exist",
                rel.to
            )));
        }
        let key = rel.key();
        let is_new = !self.edges.contains_key(&key);
        self.edges.insert(key.clone(), rel);
        if is_new {
            self.out_adjacency.entry(key.0.clone()).or_default().push(key.clone());
            self.in_adjacency.entry(key.1.clone()).or_default().push(key.clone());
        }
        log::debug!("connected {:?} -> {:?} ({})", key.0, key.1, key.2);
        if let Some(bus) = events {
            bus.emit(
                "knowledge:afterConnect",
                serde_json::json!({"from": key.0, "to": key.1, "type": key.2}),
            );
        }
        Ok(key)
    }

    /// Look up an edge by its `(from, to, type)` key.
    pub fn get_edge(&self, key: &EdgeKey) -> Option<&Relationship> {
        self.edges.get(key)
    }

    /// Whether an edge with this key exists.
    pub fn has_edge(&self, key: &EdgeKey) -> bool {
        self.edges.contains_key(key)
    }

    /// Remove a single edge by key.
    pub fn delete_edge(&mut self, key: &EdgeKey, events: Option<&EventBus>) -> bool {
        let Some(_) = self.edges.remove(key) else {
            return false;
        };
        if let Some(list) = self.out_adjacency.get_mut(&key.0) {
            list.retain(|k| k != key);
        }
        if let Some(list) = self.in_adjacency.get_mut(&key.1) {
            list.retain(|k| k != key);
        }
        if let Some(bus) = events {
            bus.emit(
                "knowledge:afterDisconnect",
                serde_json::json!({"from": key.0, "to": key.1, "type": key.2}),
            );
        }
        true
    }

    /// All edges incident to `id` in the given direction.
    pub fn get_node_edges(&self, id: &str, direction: Direction) -> Vec<&Relationship> {
        let mut keys: Vec<&EdgeKey> = Vec::new();
        if matches!(direction, Direction::Out | Direction::Both) {
            if let Some(list) = self.out_adjacency.get(id) {
                keys.extend(list.iter());
            }
        }
        if matches!(direction, Direction::In | Direction::Both) {
            if let Some(list) = self.in_adjacency.get(id) {
                keys.extend(list.iter());
            }
        }
        let mut seen = HashSet::new();
        keys.into_iter()
            .filter(|k| seen.insert((*k).clone()))
            .filter_map(|k| self.edges.get(k))
            .collect()
    }

    /// Neighbor node ids reachable via `direction`.
    pub fn get_neighbors(&self, id: &str) -> Vec<String> {
        let mut result = Vec::new();
        let mut seen = HashSet::new();
        for edge in self.get_node_edges(id, Direction::Both) {
            let neighbor = if edge.from == id { &edge.to } else { &edge.from };
            if seen.insert(neighbor.clone()) {
                result.push(neighbor.clone());
            }
        }
        result
    }

    /// All nodes, in unspecified order.
    pub fn nodes(&self) -> impl Iterator<Item = &Information> {
        self.nodes.values()
    }

    /// All node ids, in unspecified order.
    pub fn node_ids(&self) -> impl Iterator<Item = &String> {
        self.nodes.keys()
    }

    /// All edges, in unspecified order.
    pub fn edges(&self) -> impl Iterator<Item = &Relationship> {
        self.edges.values()
    }

    pub(crate) fn out_edge_keys(&self, id: &str) -> &[EdgeKey] {
        self.out_adjacency.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Content;

    fn node(id: &str) -> Information {
        Information::new(id, Content::Null, "fact").unwrap()
    }

    #[test]
    fn add_node_rejects_blank_id() {
        let mut store = GraphStore::new();
        let mut n = node("a");
        n.id = "   ".to_string();
        let err = store.add_node(n, None).unwrap_err();
        assert!(matches!(err, GraphError::InvalidId(_)));
    }

    #[test]
    fn update_node_returns_false_for_unknown_id() {
        let mut store = GraphStore::new();
        let updated = store.update_node("missing", NodePatch::default(), None).unwrap();
        assert!(!updated);
    }

    #[test]
    fn update_node_bumps_modified() {
        let mut store = GraphStore::new();
        store.add_node(node("a"), None).unwrap();
        let before = store.get_node("a").unwrap().modified;
        std::thread::sleep(std::time::Duration::from_millis(2));
        let updated = store
            .update_node(
                "a",
                NodePatch {
                    content: Some(Content::String("x".into())),
                    ..Default::default()
                },
                None,
            )
            .unwrap();
        assert!(updated);
        assert!(store.get_node("a").unwrap().modified >= before);
    }

    #[test]
    fn add_edge_rejects_missing_endpoints() {
        let mut store = GraphStore::new();
        store.add_node(node("a"), None).unwrap();
        let rel = Relationship::new("a", "ghost", "related_to", 1.0).unwrap();
        let err = store.add_edge(rel, None).unwrap_err();
        assert!(matches!(err, GraphError::ConstraintViolation(_)));
    }

    #[test]
    fn duplicate_edge_key_replaces_prior_edge() {
        let mut store = GraphStore::new();
        store.add_node(node("a"), None).unwrap();
        store.add_node(node("b"), None).unwrap();
        store
            .add_edge(Relationship::new("a", "b", "related_to", 0.2).unwrap(), None)
            .unwrap();
        store
            .add_edge(Relationship::new("a", "b", "related_to", 0.9).unwrap(), None)
            .unwrap();
        assert_eq!(store.edge_count(), 1);
        let key = ("a".to_string(), "b".to_string(), "related_to".to_string());
        assert_eq!(store.get_edge(&key).unwrap().strength, 0.9);
    }

    #[test]
    fn self_loop_edges_are_permitted() {
        let mut store = GraphStore::new();
        store.add_node(node("a"), None).unwrap();
        store
            .add_edge(Relationship::new("a", "a", "related_to", 1.0).unwrap(), None)
            .unwrap();
        assert_eq!(store.get_node_edges("a", Direction::Both).len(), 1);
    }

    #[test]
    fn delete_node_cascades_to_incident_edges() {
        let mut store = GraphStore::new();
        store.add_node(node("a"), None).unwrap();
        store.add_node(node("b"), None).unwrap();
        store.add_node(node("c"), None).unwrap();
        store
            .add_edge(Relationship::new("a", "b", "related_to", 1.0).unwrap(), None)
            .unwrap();
        store
            .add_edge(Relationship::new("c", "b", "related_to", 1.0).unwrap(), None)
            .unwrap();
        store.delete_node("b", None);
        assert_eq!(store.edge_count(), 0);
        assert!(store.get_node("b").is_none());
    }

    #[test]
    fn get_neighbors_unions_in_and_out() {
        let mut store = GraphStore::new();
        store.add_node(node("a"), None).unwrap();
        store.add_node(node("b"), None).unwrap();
        store.add_node(node("c"), None).unwrap();
        store
            .add_edge(Relationship::new("a", "b", "related_to", 1.0).unwrap(), None)
            .unwrap();
        store
            .add_edge(Relationship::new("c", "a", "related_to", 1.0).unwrap(), None)
            .unwrap();
        let mut neighbors = store.get_neighbors("a");
        neighbors.sort();
        assert_eq!(neighbors, vec!["b".to_string(), "c".to_string()]);
    }
}
