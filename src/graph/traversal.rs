//! Path enumeration, shortest paths, subgraph extraction, and connected
//! components over a [`GraphStore`].

use std::collections::{HashSet, VecDeque};

use crate::types::{Direction, Information, Relationship};

use super::store::GraphStore;

/// Enumerate simple paths from `src` to `dst` by bounded DFS over outgoing
/// edges. `max_depth` bounds the number of edges traversed. Results are
/// ordered shortest-first; within a length, order follows edge insertion
/// order (deterministic given a fixed build sequence).
///
/// Returns an empty vector if either id is missing. When `src == dst`, the
/// trivial one-node path is always included; if a self-loop edge exists at
/// `src` it is additionally reported as a one-edge cycle.
pub fn find_paths(store: &GraphStore, src: &str, dst: &str, max_depth: usize) -> Vec<Vec<String>> {
    if store.get_node(src).is_none() || store.get_node(dst).is_none() {
        return Vec::new();
    }

    let mut results: Vec<Vec<String>> = Vec::new();

    if src == dst {
        results.push(vec![src.to_string()]);
        let has_self_loop = store
            .out_edge_keys(src)
            .iter()
            .any(|(from, to, _)| from == to);
        if has_self_loop {
            results.push(vec![src.to_string(), src.to_string()]);
        }
        return results;
    }

    let mut visiting = HashSet::new();
    let mut path = vec![src.to_string()];
    visiting.insert(src.to_string());
    dfs_paths(store, src, dst, max_depth, &mut path, &mut visiting, &mut results);

    results.sort_by_key(|p| p.len());
    results
}

fn dfs_paths(
    store: &GraphStore,
    current: &str,
    dst: &str,
    remaining_depth: usize,
    path: &mut Vec<String>,
    visiting: &mut HashSet<String>,
    results: &mut Vec<Vec<String>>,
) {
    if remaining_depth == 0 {
        return;
    }
    for key in store.out_edge_keys(current) {
        let next = key.1.clone();
        if next == dst {
            path.push(next);
            results.push(path.clone());
            path.pop();
            continue;
        }
        if visiting.contains(&next) {
            continue;
        }
        visiting.insert(next.clone());
        path.push(next.clone());
        dfs_paths(store, &next, dst, remaining_depth - 1, path, visiting, results);
        path.pop();
        visiting.remove(&next);
    }
}

/// Breadth-first shortest path from `src` to `dst` over outgoing edges.
/// Returns an empty vector if no path exists or either id is missing.
pub fn find_shortest_path(store: &GraphStore, src: &str, dst: &str) -> Vec<String> {
    if store.get_node(src).is_none() || store.get_node(dst).is_none() {
        return Vec::new();
    }
    if src == dst {
        return vec![src.to_string()];
    }

    let mut queue = VecDeque::new();
    let mut came_from: std::collections::HashMap<String, String> = std::collections::HashMap::new();
    let mut visited = HashSet::new();
    queue.push_back(src.to_string());
    visited.insert(src.to_string());

    while let Some(current) = queue.pop_front() {
        for key in store.out_edge_keys(&current) {
            let next = key.1.clone();
            if visited.contains(&next) {
                continue;
            }
            visited.insert(next.clone());
            came_from.insert(next.clone(), current.clone());
            if next == dst {
                let mut path = vec![next.clone()];
                let mut cursor = next;
                while let Some(prev) = came_from.get(&cursor) {
                    path.push(prev.clone());
                    cursor = prev.clone();
                }
                path.reverse();
                return path;
            }
            queue.push_back(next);
        }
    }
    Vec::new()
}

/// Nodes and their incident edges within `depth` undirected hops of `root`.
/// Each discovered node appears at most once. Empty if `root` is missing.
pub fn get_subgraph(
    store: &GraphStore,
    root: &str,
    depth: usize,
) -> Vec<(Information, Vec<Relationship>)> {
    if store.get_node(root).is_none() {
        return Vec::new();
    }

    let mut visited = HashSet::new();
    visited.insert(root.to_string());
    let mut frontier = vec![root.to_string()];
    let mut order = vec![root.to_string()];

    for _ in 0..depth {
        let mut next_frontier = Vec::new();
        for id in &frontier {
            for neighbor in store.get_neighbors(id) {
                if visited.insert(neighbor.clone()) {
                    order.push(neighbor.clone());
                    next_frontier.push(neighbor);
                }
            }
        }
        if next_frontier.is_empty() {
            break;
        }
        frontier = next_frontier;
    }

    order
        .into_iter()
        .filter_map(|id| {
            let node = store.get_node(&id)?.clone();
            let edges = store
                .get_node_edges(&id, Direction::Both)
                .into_iter()
                .cloned()
                .collect();
            Some((node, edges))
        })
        .collect()
}

/// Weakly-connected components (undirected projection) across the whole
/// graph. Every node belongs to exactly one component.
pub fn get_connected_components(store: &GraphStore) -> Vec<HashSet<String>> {
    let mut visited = HashSet::new();
    let mut components = Vec::new();

    let mut ids: Vec<&String> = store.node_ids().collect();
    ids.sort();

    for id in ids {
        if visited.contains(id) {
            continue;
        }
        let mut component = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(id.clone());
        visited.insert(id.clone());
        while let Some(current) = queue.pop_front() {
            component.insert(current.clone());
            for neighbor in store.get_neighbors(&current) {
                if visited.insert(neighbor.clone()) {
                    queue.push_back(neighbor);
                }
            }
        }
        components.push(component);
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Content;

    fn chain_store() -> GraphStore {
        let mut store = GraphStore::new();
        for id in ["a", "b", "c", "d"] {
            store
                .add_node(Information::new(id, Content::Null, "fact").unwrap(), None)
                .unwrap();
        }
        store
            .add_edge(Relationship::new("a", "b", "related_to", 1.0).unwrap(), None)
            .unwrap();
        store
            .add_edge(Relationship::new("b", "c", "related_to", 1.0).unwrap(), None)
            .unwrap();
        store
            .add_edge(Relationship::new("a", "c", "related_to", 1.0).unwrap(), None)
            .unwrap();
        store
    }

    #[test]
    fn find_paths_orders_shortest_first() {
        let store = chain_store();
        let paths = find_paths(&store, "a", "c", 5);
        assert_eq!(paths[0], vec!["a".to_string(), "c".to_string()]);
        assert_eq!(paths[1], vec!["a".to_string(), "b".to_string(), "c".to_string()]);
    }

    #[test]
    fn find_paths_empty_for_missing_node() {
        let store = chain_store();
        assert!(find_paths(&store, "a", "ghost", 5).is_empty());
    }

    #[test]
    fn find_paths_reports_self_loop_cycle() {
        let mut store = GraphStore::new();
        store
            .add_node(Information::new("a", Content::Null, "fact").unwrap(), None)
            .unwrap();
        store
            .add_edge(Relationship::new("a", "a", "related_to", 1.0).unwrap(), None)
            .unwrap();
        let paths = find_paths(&store, "a", "a", 5);
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0], vec!["a".to_string()]);
        assert_eq!(paths[1], vec!["a".to_string(), "a".to_string()]);
    }

    #[test]
    fn shortest_path_is_direct_edge() {
        let store = chain_store();
        assert_eq!(
            find_shortest_path(&store, "a", "c"),
            vec!["a".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn shortest_path_empty_when_unreachable() {
        let mut store = chain_store();
        store
            .add_node(Information::new("isolated", Content::Null, "fact").unwrap(), None)
            .unwrap();
        assert!(find_shortest_path(&store, "a", "isolated").is_empty());
    }

    #[test]
    fn subgraph_includes_incident_edges() {
        let store = chain_store();
        let subgraph = get_subgraph(&store, "a", 1);
        let ids: HashSet<String> = subgraph.iter().map(|(n, _)| n.id.clone()).collect();
        assert_eq!(ids, HashSet::from(["a".to_string(), "b".to_string(), "c".to_string()]));
    }

    #[test]
    fn connected_components_separate_islands() {
        let mut store = chain_store();
        store
            .add_node(Information::new("isolated", Content::Null, "fact").unwrap(), None)
            .unwrap();
        let components = get_connected_components(&store);
        assert_eq!(components.len(), 2);
    }
}
