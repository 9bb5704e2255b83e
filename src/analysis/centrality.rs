//! `CentralityEngine` — per-node and graph-level structural metrics:
//! degree, Brandes betweenness, BFS closeness, PageRank, eigenvector
//! centrality, clustering coefficients, and articulation points/bridges.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::graph::GraphStore;

const ITERATION_CAP: usize = 100;
const CONVERGENCE_TOLERANCE: f64 = 1e-6;

/// Per-node centrality scores, keyed by node id.
#[derive(Debug, Clone, Default)]
pub struct NodeCentrality {
    pub degree: HashMap<String, usize>,
    pub betweenness: HashMap<String, f64>,
    pub closeness: HashMap<String, f64>,
    pub page_rank: HashMap<String, f64>,
    pub eigenvector: HashMap<String, f64>,
    pub clustering_coefficient: HashMap<String, f64>,
}

/// Whole-graph summary metrics.
#[derive(Debug, Clone, Default)]
pub struct GraphMetrics {
    pub density: f64,
    pub average_path_length: f64,
    pub diameter: f64,
    pub clustering_coefficient: f64,
    pub component_count: usize,
    pub modularity: Option<f64>,
}

struct UndirectedView {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    adjacency: Vec<Vec<usize>>,
}

fn build_undirected_view(store: &GraphStore) -> UndirectedView {
    let mut ids: Vec<String> = store.node_ids().cloned().collect();
    ids.sort();
    let index: HashMap<String, usize> = ids.iter().enumerate().map(|(i, id)| (id.clone(), i)).collect();
    let mut adjacency: Vec<HashSet<usize>> = vec![HashSet::new(); ids.len()];
    for rel in store.edges() {
        if let (Some(&a), Some(&b)) = (index.get(&rel.from), index.get(&rel.to)) {
            if a != b {
                adjacency[a].insert(b);
                adjacency[b].insert(a);
            }
        }
    }
    let adjacency = adjacency.into_iter().map(|set| set.into_iter().collect()).collect();
    UndirectedView { ids, index, adjacency }
}

/// Compute degree centrality: in-degree + out-degree per node.
pub fn degree_centrality(store: &GraphStore) -> HashMap<String, usize> {
    store
        .node_ids()
        .map(|id| {
            let degree = store.get_node_edges(id, crate::types::Direction::Both).len();
            (id.clone(), degree)
        })
        .collect()
}

/// Brandes' algorithm for betweenness centrality over the undirected
/// projection (unweighted shortest paths).
pub fn betweenness_centrality(store: &GraphStore) -> HashMap<String, f64> {
    let view = build_undirected_view(store);
    let n = view.ids.len();
    let mut betweenness = vec![0.0f64; n];

    for s in 0..n {
        let mut stack = Vec::new();
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0f64; n];
        sigma[s] = 1.0;
        let mut distance = vec![-1i64; n];
        distance[s] = 0;
        let mut queue = VecDeque::new();
        queue.push_back(s);

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for &w in &view.adjacency[v] {
                if distance[w] < 0 {
                    distance[w] = distance[v] + 1;
                    queue.push_back(w);
                }
                if distance[w] == distance[v] + 1 {
                    sigma[w] += sigma[v];
                    predecessors[w].push(v);
                }
            }
        }

        let mut delta = vec![0.0f64; n];
        while let Some(w) = stack.pop() {
            for &v in &predecessors[w] {
                delta[v] += (sigma[v] / sigma[w]) * (1.0 + delta[w]);
            }
            if w != s {
                betweenness[w] += delta[w];
            }
        }
    }

    // Undirected graph: each shortest path counted from both endpoints.
    for value in &mut betweenness {
        *value /= 2.0;
    }

    view.ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.clone(), betweenness[i]))
        .collect()
}

/// Closeness centrality: `(n-1) / sum of distances`, 0 for isolated nodes.
pub fn closeness_centrality(store: &GraphStore) -> HashMap<String, f64> {
    let view = build_undirected_view(store);
    let n = view.ids.len();
    let mut result = HashMap::new();

    for start in 0..n {
        let mut distance = vec![-1i64; n];
        distance[start] = 0;
        let mut queue = VecDeque::new();
        queue.push_back(start);
        while let Some(v) = queue.pop_front() {
            for &w in &view.adjacency[v] {
                if distance[w] < 0 {
                    distance[w] = distance[v] + 1;
                    queue.push_back(w);
                }
            }
        }
        let total: i64 = distance.iter().filter(|&&d| d > 0).sum();
        let closeness = if total > 0 && n > 1 {
            (n - 1) as f64 / total as f64
        } else {
            0.0
        };
        result.insert(view.ids[start].clone(), closeness);
    }

    result
}

/// PageRank with damping 0.85, uniform teleport, iterating to an L1
/// residual below `1e-6` or 100 iterations.
pub fn page_rank(store: &GraphStore) -> HashMap<String, f64> {
    const DAMPING: f64 = 0.85;
    let mut ids: Vec<String> = store.node_ids().cloned().collect();
    ids.sort();
    let n = ids.len();
    if n == 0 {
        return HashMap::new();
    }
    let index: HashMap<String, usize> = ids.iter().enumerate().map(|(i, id)| (id.clone(), i)).collect();

    let mut out_links: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut out_degree = vec![0usize; n];
    for rel in store.edges() {
        if let (Some(&a), Some(&b)) = (index.get(&rel.from), index.get(&rel.to)) {
            out_links[a].push(b);
            out_degree[a] += 1;
        }
    }

    let mut rank = vec![1.0 / n as f64; n];
    for _ in 0..ITERATION_CAP {
        let dangling_mass: f64 = (0..n).filter(|&i| out_degree[i] == 0).map(|i| rank[i]).sum();
        let mut next = vec![(1.0 - DAMPING) / n as f64 + DAMPING * dangling_mass / n as f64; n];
        for u in 0..n {
            if out_degree[u] == 0 {
                continue;
            }
            let share = DAMPING * rank[u] / out_degree[u] as f64;
            for &v in &out_links[u] {
                next[v] += share;
            }
        }
        let residual: f64 = next.iter().zip(&rank).map(|(a, b)| (a - b).abs()).sum();
        rank = next;
        if residual < CONVERGENCE_TOLERANCE {
            break;
        }
    }

    log::debug!("pagerank converged over {n} nodes");
    ids.into_iter().zip(rank).collect()
}

/// Eigenvector centrality via power iteration on the undirected adjacency
/// matrix, same stopping rule as PageRank.
pub fn eigenvector_centrality(store: &GraphStore) -> HashMap<String, f64> {
    let view = build_undirected_view(store);
    let n = view.ids.len();
    if n == 0 {
        return HashMap::new();
    }
    let mut x = vec![1.0 / (n as f64).sqrt(); n];

    for _ in 0..ITERATION_CAP {
        let mut next = vec![0.0; n];
        for (u, neighbors) in view.adjacency.iter().enumerate() {
            for &v in neighbors {
                next[v] += x[u];
            }
        }
        let norm = next.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for v in &mut next {
                *v /= norm;
            }
        }
        let residual: f64 = next.iter().zip(&x).map(|(a, b)| (a - b).abs()).sum();
        x = next;
        if residual < CONVERGENCE_TOLERANCE {
            break;
        }
    }

    view.ids.into_iter().zip(x).collect()
}

/// Local clustering coefficient per node: `2*triangles / (deg*(deg-1))`,
/// 0 when degree < 2.
pub fn clustering_coefficient(store: &GraphStore) -> HashMap<String, f64> {
    let view = build_undirected_view(store);
    let neighbor_sets: Vec<HashSet<usize>> = view
        .adjacency
        .iter()
        .map(|list| list.iter().copied().collect())
        .collect();

    view.ids
        .iter()
        .enumerate()
        .map(|(u, id)| {
            let neighbors = &view.adjacency[u];
            let degree = neighbors.len();
            if degree < 2 {
                return (id.clone(), 0.0);
            }
            let mut links = 0usize;
            for i in 0..neighbors.len() {
                for j in (i + 1)..neighbors.len() {
                    if neighbor_sets[neighbors[i]].contains(&neighbors[j]) {
                        links += 1;
                    }
                }
            }
            let coefficient = 2.0 * links as f64 / (degree * (degree - 1)) as f64;
            (id.clone(), coefficient)
        })
        .collect()
}

/// Compute the full [`NodeCentrality`] bundle in one pass.
pub fn compute_node_centrality(store: &GraphStore) -> NodeCentrality {
    NodeCentrality {
        degree: degree_centrality(store),
        betweenness: betweenness_centrality(store),
        closeness: closeness_centrality(store),
        page_rank: page_rank(store),
        eigenvector: eigenvector_centrality(store),
        clustering_coefficient: clustering_coefficient(store),
    }
}

/// Compute whole-graph summary metrics.
pub fn compute_graph_metrics(store: &GraphStore) -> GraphMetrics {
    let view = build_undirected_view(store);
    let n = view.ids.len();
    let edge_count = store.edge_count();

    let density = if n > 1 {
        edge_count as f64 / (n * (n - 1)) as f64
    } else {
        0.0
    };

    let mut total_distance = 0.0;
    let mut reachable_pairs = 0u64;
    let mut diameter = 0.0f64;
    for start in 0..n {
        let mut distance = vec![-1i64; n];
        distance[start] = 0;
        let mut queue = VecDeque::new();
        queue.push_back(start);
        while let Some(v) = queue.pop_front() {
            for &w in &view.adjacency[v] {
                if distance[w] < 0 {
                    distance[w] = distance[v] + 1;
                    queue.push_back(w);
                }
            }
        }
        for &d in &distance {
            if d > 0 {
                total_distance += d as f64;
                reachable_pairs += 1;
                diameter = diameter.max(d as f64);
            }
        }
    }
    let average_path_length = if reachable_pairs > 0 {
        total_distance / reachable_pairs as f64
    } else {
        0.0
    };

    let per_node_clustering = clustering_coefficient(store);
    let clustering = if per_node_clustering.is_empty() {
        0.0
    } else {
        per_node_clustering.values().sum::<f64>() / per_node_clustering.len() as f64
    };

    let component_count = crate::graph::get_connected_components(store).len();

    let clusters = super::community::detect_communities(store, &super::community::CommunityOptions::default());
    let modularity = if clusters.is_empty() {
        None
    } else {
        Some(clusters.iter().filter_map(|c| c.modularity).sum())
    };

    GraphMetrics {
        density,
        average_path_length,
        diameter,
        clustering_coefficient: clustering,
        component_count,
        modularity,
    }
}

/// Top-`k` node ids by degree, descending.
pub fn top_hubs(store: &GraphStore, k: usize) -> Vec<String> {
    let mut degrees: Vec<(String, usize)> = degree_centrality(store).into_iter().collect();
    degrees.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    degrees.into_iter().take(k).map(|(id, _)| id).collect()
}

/// Articulation points and bridges of the undirected projection, via the
/// standard DFS low-link algorithm.
pub fn articulation_points_and_bridges(store: &GraphStore) -> (HashSet<String>, Vec<(String, String)>) {
    let view = build_undirected_view(store);
    let n = view.ids.len();
    let mut visited = vec![false; n];
    let mut discovery = vec![0usize; n];
    let mut low = vec![0usize; n];
    let mut parent: Vec<Option<usize>> = vec![None; n];
    let mut articulation = vec![false; n];
    let mut bridges: Vec<(usize, usize)> = Vec::new();
    let mut timer = 0usize;

    for root in 0..n {
        if visited[root] {
            continue;
        }
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
        visited[root] = true;
        discovery[root] = timer;
        low[root] = timer;
        timer += 1;
        let mut children_at: HashMap<usize, usize> = HashMap::new();

        while let Some(&mut (u, ref mut child_index)) = stack.last_mut() {
            if *child_index < view.adjacency[u].len() {
                let v = view.adjacency[u][*child_index];
                *child_index += 1;
                if Some(v) == parent[u] {
                    continue;
                }
                if visited[v] {
                    low[u] = low[u].min(discovery[v]);
                } else {
                    visited[v] = true;
                    parent[v] = Some(u);
                    discovery[v] = timer;
                    low[v] = timer;
                    timer += 1;
                    *children_at.entry(u).or_insert(0) += 1;
                    stack.push((v, 0));
                }
            } else {
                stack.pop();
                if let Some(p) = parent[u] {
                    low[p] = low[p].min(low[u]);
                    let is_root = p == root && parent[p].is_none();
                    if !is_root && low[u] >= discovery[p] {
                        articulation[p] = true;
                    }
                    if is_root && *children_at.get(&p).unwrap_or(&0) > 1 {
                        articulation[p] = true;
                    }
                    if low[u] > discovery[p] {
                        bridges.push((p, u));
                    }
                }
            }
        }
    }

    let articulation_ids = view
        .ids
        .iter()
        .enumerate()
        .filter(|(i, _)| articulation[*i])
        .map(|(_, id)| id.clone())
        .collect();
    let bridge_ids = bridges
        .into_iter()
        .map(|(a, b)| (view.ids[a].clone(), view.ids[b].clone()))
        .collect();

    (articulation_ids, bridge_ids)
}
