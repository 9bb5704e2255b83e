//! `StructuralPatternMiner` — enumerates recurring structural motifs (star,
//! chain, cycle, tree, bridge, cluster, hub) with support/confidence
//! scoring and pruning.

use std::collections::{HashMap, HashSet};

use crate::graph::GraphStore;
use crate::types::{Direction, GraphPattern, GraphPatternType, IdGen};

/// Which templates to mine and the thresholds candidates must clear.
#[derive(Debug, Clone)]
pub struct PatternMinerOptions {
    pub enabled: HashSet<GraphPatternType>,
    /// Minimum distinct neighbors (via one edge type) for a star center.
    pub star_min_degree: usize,
    pub min_chain_len: usize,
    pub max_pattern_size: usize,
    pub min_support: f64,
    pub min_confidence: f64,
}

impl Default for PatternMinerOptions {
    fn default() -> Self {
        Self {
            enabled: [
                GraphPatternType::Star,
                GraphPatternType::Chain,
                GraphPatternType::Cycle,
                GraphPatternType::Tree,
                GraphPatternType::Bridge,
                GraphPatternType::Cluster,
                GraphPatternType::Hub,
            ]
            .into_iter()
            .collect(),
            star_min_degree: 3,
            min_chain_len: 2,
            max_pattern_size: 6,
            min_support: 0.0,
            min_confidence: 0.0,
        }
    }
}

/// Mine structural patterns across every enabled template.
pub fn mine_patterns(store: &GraphStore, options: &PatternMinerOptions) -> Vec<GraphPattern> {
    let node_count = store.node_count().max(1);
    let mut candidates = Vec::new();

    if options.enabled.contains(&GraphPatternType::Star) {
        candidates.extend(find_stars(store, options));
    }
    if options.enabled.contains(&GraphPatternType::Chain) {
        candidates.extend(find_chains(store, options));
    }
    if options.enabled.contains(&GraphPatternType::Cycle) {
        candidates.extend(find_cycles(store, options));
    }
    if options.enabled.contains(&GraphPatternType::Tree) {
        candidates.extend(find_trees(store, options));
    }
    if options.enabled.contains(&GraphPatternType::Bridge) {
        candidates.extend(find_bridges(store));
    }
    if options.enabled.contains(&GraphPatternType::Cluster) {
        candidates.extend(find_clusters(store, options));
    }
    if options.enabled.contains(&GraphPatternType::Hub) {
        candidates.extend(find_hubs(store, options));
    }

    let id_gen = IdGen::new();
    candidates
        .into_iter()
        .map(|mut c| {
            c.support = c.frequency as f64 / node_count as f64;
            c
        })
        .filter(|c| c.support >= options.min_support && c.confidence >= options.min_confidence)
        .map(|mut c| {
            c.id = id_gen.next("pattern");
            c
        })
        .collect()
}

fn blank_pattern(pattern_type: GraphPatternType) -> GraphPattern {
    GraphPattern {
        id: String::new(),
        pattern_type,
        nodes: Vec::new(),
        edges: Vec::new(),
        support: 0.0,
        confidence: 0.0,
        frequency: 0,
        last_seen: chrono::Utc::now(),
    }
}

fn find_stars(store: &GraphStore, options: &PatternMinerOptions) -> Vec<GraphPattern> {
    let mut results = Vec::new();
    for id in store.node_ids() {
        let edges = store.get_node_edges(id, Direction::Out);
        let mut by_type: HashMap<&str, Vec<&str>> = HashMap::new();
        for e in &edges {
            by_type.entry(e.edge_type.as_str()).or_default().push(e.to.as_str());
        }
        for (edge_type, targets) in by_type {
            let distinct: HashSet<&str> = targets.iter().copied().collect();
            if distinct.len() >= options.star_min_degree {
                let mut nodes = vec![id.clone()];
                nodes.extend(distinct.iter().map(|s| s.to_string()));
                let edge_list: Vec<(String, String, String)> = distinct
                    .iter()
                    .map(|t| (id.clone(), t.to_string(), edge_type.to_string()))
                    .collect();
                let confidence = distinct.len() as f64 / edges.len().max(1) as f64;
                let mut pattern = blank_pattern(GraphPatternType::Star);
                pattern.nodes = nodes;
                pattern.edges = edge_list;
                pattern.confidence = confidence;
                pattern.frequency = 1;
                results.push(pattern);
            }
        }
    }
    results
}

fn find_chains(store: &GraphStore, options: &PatternMinerOptions) -> Vec<GraphPattern> {
    let mut results = Vec::new();
    let mut ids: Vec<&String> = store.node_ids().collect();
    ids.sort();
    for start in ids {
        let mut path = vec![start.clone()];
        let mut edge_types = vec![];
        extend_chain(store, start, options.max_pattern_size - 1, &mut path, &mut edge_types, &mut results, options);
    }
    results
}

fn extend_chain(
    store: &GraphStore,
    current: &str,
    remaining: usize,
    path: &mut Vec<String>,
    edge_types: &mut Vec<String>,
    results: &mut Vec<GraphPattern>,
    options: &PatternMinerOptions,
) {
    if path.len() >= options.min_chain_len + 1 {
        let edge_list: Vec<(String, String, String)> = (0..path.len() - 1)
            .map(|i| (path[i].clone(), path[i + 1].clone(), edge_types[i].clone()))
            .collect();
        let mut pattern = blank_pattern(GraphPatternType::Chain);
        pattern.nodes = path.clone();
        pattern.edges = edge_list;
        pattern.confidence = 1.0;
        pattern.frequency = 1;
        results.push(pattern);
    }
    if remaining == 0 {
        return;
    }
    for e in store.get_node_edges(current, Direction::Out) {
        if path.contains(&e.to) {
            continue;
        }
        if let Some(last_type) = edge_types.last() {
            if last_type != &e.edge_type {
                continue;
            }
        }
        path.push(e.to.clone());
        edge_types.push(e.edge_type.clone());
        extend_chain(store, &e.to.clone(), remaining - 1, path, edge_types, results, options);
        edge_types.pop();
        path.pop();
    }
}

fn find_cycles(store: &GraphStore, options: &PatternMinerOptions) -> Vec<GraphPattern> {
    let mut results = Vec::new();
    let mut ids: Vec<&String> = store.node_ids().collect();
    ids.sort();
    for start in ids {
        let mut path = vec![start.clone()];
        let mut edge_types = Vec::new();
        dfs_cycle(store, start, start, options.max_pattern_size, &mut path, &mut edge_types, &mut results);
    }
    results
}

fn dfs_cycle(
    store: &GraphStore,
    origin: &str,
    current: &str,
    remaining: usize,
    path: &mut Vec<String>,
    edge_types: &mut Vec<String>,
    results: &mut Vec<GraphPattern>,
) {
    if remaining == 0 {
        return;
    }
    for e in store.get_node_edges(current, Direction::Out) {
        if e.to == origin && path.len() >= 3 {
            let mut edges: Vec<(String, String, String)> = (0..path.len() - 1)
                .map(|i| (path[i].clone(), path[i + 1].clone(), edge_types[i].clone()))
                .collect();
            edges.push((path.last().unwrap().clone(), origin.to_string(), e.edge_type.clone()));
            let mut pattern = blank_pattern(GraphPatternType::Cycle);
            pattern.nodes = path.clone();
            pattern.edges = edges;
            pattern.confidence = 1.0;
            pattern.frequency = 1;
            results.push(pattern);
            continue;
        }
        if path.contains(&e.to) {
            continue;
        }
        path.push(e.to.clone());
        edge_types.push(e.edge_type.clone());
        dfs_cycle(store, origin, &e.to.clone(), remaining - 1, path, edge_types, results);
        edge_types.pop();
        path.pop();
    }
}

/// A rooted out-edge spanning tree: grown breadth-first from each node up
/// to `max_pattern_size` nodes, kept only when some node along the way
/// branches into more than one child (otherwise it's just a chain).
fn find_trees(store: &GraphStore, options: &PatternMinerOptions) -> Vec<GraphPattern> {
    let mut results = Vec::new();
    let mut ids: Vec<&String> = store.node_ids().collect();
    ids.sort();
    for root in ids {
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(root.clone());
        let mut nodes = vec![root.clone()];
        let mut edges: Vec<(String, String, String)> = Vec::new();
        let mut frontier = vec![root.clone()];
        let mut branched = false;

        while nodes.len() < options.max_pattern_size && !frontier.is_empty() {
            let mut next_frontier = Vec::new();
            for parent in &frontier {
                let mut children = 0;
                for e in store.get_node_edges(parent, Direction::Out) {
                    if nodes.len() >= options.max_pattern_size {
                        break;
                    }
                    if visited.contains(&e.to) {
                        continue;
                    }
                    visited.insert(e.to.clone());
                    nodes.push(e.to.clone());
                    edges.push((parent.clone(), e.to.clone(), e.edge_type.clone()));
                    next_frontier.push(e.to.clone());
                    children += 1;
                }
                if children > 1 {
                    branched = true;
                }
            }
            frontier = next_frontier;
        }

        if branched && nodes.len() >= options.min_chain_len + 1 {
            let confidence = (nodes.len() - 1) as f64 / options.max_pattern_size.max(1) as f64;
            let mut pattern = blank_pattern(GraphPatternType::Tree);
            pattern.nodes = nodes;
            pattern.edges = edges;
            pattern.confidence = confidence.min(1.0);
            pattern.frequency = 1;
            results.push(pattern);
        }
    }
    results
}

/// A densely interconnected local neighborhood: a node whose neighbors
/// themselves hold many edges among each other. Confidence is the node's
/// local clustering coefficient.
fn find_clusters(store: &GraphStore, options: &PatternMinerOptions) -> Vec<GraphPattern> {
    let coefficients = super::centrality::clustering_coefficient(store);
    let mut results = Vec::new();
    let mut ids: Vec<&String> = store.node_ids().collect();
    ids.sort();
    for id in ids {
        let incident = store.get_node_edges(id, Direction::Both);
        if incident.len() < options.star_min_degree {
            continue;
        }
        let coefficient = *coefficients.get(id).unwrap_or(&0.0);
        if coefficient <= 0.0 {
            continue;
        }
        let neighbors = store.get_neighbors(id);
        let neighbor_set: HashSet<&str> = neighbors.iter().map(String::as_str).collect();

        let mut nodes = vec![id.clone()];
        nodes.extend(neighbors.iter().cloned());
        let mut edges: Vec<(String, String, String)> =
            incident.iter().map(|e| (e.from.clone(), e.to.clone(), e.edge_type.clone())).collect();
        for neighbor in &neighbors {
            for e in store.get_node_edges(neighbor, Direction::Out) {
                if neighbor_set.contains(e.to.as_str()) {
                    edges.push((e.from.clone(), e.to.clone(), e.edge_type.clone()));
                }
            }
        }

        let mut pattern = blank_pattern(GraphPatternType::Cluster);
        pattern.nodes = nodes;
        pattern.edges = edges;
        pattern.confidence = coefficient;
        pattern.frequency = 1;
        results.push(pattern);
    }
    results
}

fn find_bridges(store: &GraphStore) -> Vec<GraphPattern> {
    let (_, bridges) = super::centrality::articulation_points_and_bridges(store);
    bridges
        .into_iter()
        .map(|(a, b)| {
            let mut pattern = blank_pattern(GraphPatternType::Bridge);
            pattern.nodes = vec![a.clone(), b.clone()];
            pattern.edges = vec![(a, b, "related_to".to_string())];
            pattern.confidence = 1.0;
            pattern.frequency = 1;
            pattern
        })
        .collect()
}

fn find_hubs(store: &GraphStore, options: &PatternMinerOptions) -> Vec<GraphPattern> {
    super::centrality::top_hubs(store, options.star_min_degree.max(1))
        .into_iter()
        .filter(|id| store.get_node_edges(id, Direction::Both).len() >= options.star_min_degree)
        .map(|id| {
            let neighbors = store.get_neighbors(&id);
            let edges = neighbors
                .iter()
                .map(|n| (id.clone(), n.clone(), "related_to".to_string()))
                .collect();
            let mut pattern = blank_pattern(GraphPatternType::Hub);
            pattern.nodes = {
                let mut nodes = vec![id.clone()];
                nodes.extend(neighbors);
                nodes
            };
            pattern.edges = edges;
            pattern.confidence = 1.0;
            pattern.frequency = 1;
            pattern
        })
        .collect()
}
