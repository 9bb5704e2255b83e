//! `CommunityDetector` — single-level Louvain community detection over the
//! undirected projection of the graph, using the engine's seeded `Rng` for
//! reproducible node-visit order.

use std::collections::HashMap;

use crate::graph::GraphStore;
use crate::types::{ClusterAlgorithm, IdGen, KnowledgeCluster, Rng};

/// Tuning knobs for [`detect_communities`]. Mirrors the teacher's
/// per-operation `*Params` convention (see `engine/query.rs`).
#[derive(Debug, Clone)]
pub struct CommunityOptions {
    /// Multiplies the expected-edge term in the modularity gain formula.
    pub resolution: f64,
    /// Communities smaller than this are dropped from the output.
    pub min_community_size: usize,
    /// Hard cap on local-move passes.
    pub max_iterations: usize,
    /// Seed for the shuffle driving node-visit order. `None` uses wall-clock.
    pub random_seed: Option<u64>,
}

impl Default for CommunityOptions {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            min_community_size: 1,
            max_iterations: 200,
            random_seed: None,
        }
    }
}

struct Edge {
    a: usize,
    b: usize,
    weight: f64,
}

/// Run single-level Louvain local-move over the undirected projection of
/// `store` and return one [`KnowledgeCluster`] per surviving community.
pub fn detect_communities(store: &GraphStore, options: &CommunityOptions) -> Vec<KnowledgeCluster> {
    let mut node_ids: Vec<String> = store.node_ids().cloned().collect();
    node_ids.sort();
    let n = node_ids.len();
    if n == 0 {
        return Vec::new();
    }
    let mut index: HashMap<String, usize> = HashMap::new();
    for (i, id) in node_ids.iter().enumerate() {
        index.insert(id.clone(), i);
    }

    let mut edges: Vec<Edge> = Vec::new();
    for rel in store.edges() {
        let (Some(&a), Some(&b)) = (index.get(&rel.from), index.get(&rel.to)) else {
            continue;
        };
        edges.push(Edge {
            a,
            b,
            weight: rel.strength.max(0.0),
        });
    }

    let m: f64 = edges.iter().map(|e| e.weight).sum();

    log::debug!("louvain: {n} nodes, {} edges, m={m}", edges.len());

    if m == 0.0 {
        return node_ids
            .into_iter()
            .map(|id| singleton_cluster(&IdGen::new(), vec![id]))
            .collect();
    }

    let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
    let mut k: Vec<f64> = vec![0.0; n];
    for e in &edges {
        adjacency[e.a].push((e.b, e.weight));
        if e.a != e.b {
            adjacency[e.b].push((e.a, e.weight));
        }
        k[e.a] += e.weight;
        if e.a != e.b {
            k[e.b] += e.weight;
        } else {
            k[e.a] += e.weight;
        }
    }

    let mut community: Vec<usize> = (0..n).collect();
    let mut sigma_tot: Vec<f64> = k.clone();
    let mut sigma_in: Vec<f64> = edges
        .iter()
        .filter(|e| e.a == e.b)
        .fold(vec![0.0; n], |mut acc, e| {
            acc[e.a] += e.weight;
            acc
        });

    let mut rng = match options.random_seed {
        Some(seed) => Rng::new(seed),
        None => Rng::new(chrono::Utc::now().timestamp_millis() as u64),
    };
    let mut order: Vec<usize> = (0..n).collect();

    for _pass in 0..options.max_iterations {
        rng.shuffle(&mut order);
        let mut moved = false;

        for &u in &order {
            let current = community[u];

            // withdraw u from its current community
            let k_u = k[u];
            let k_u_current = neighbor_weight_to_community(u, current, &adjacency, &community);
            sigma_tot[current] -= k_u;
            sigma_in[current] -= 2.0 * k_u_current;
            community[u] = usize::MAX; // temporarily unassigned

            let mut best_community = current;
            let mut best_gain = 0.0f64;
            let mut candidates: Vec<usize> = vec![current];
            for &(v, _) in &adjacency[u] {
                if community[v] != usize::MAX && !candidates.contains(&community[v]) {
                    candidates.push(community[v]);
                }
            }

            for &c in &candidates {
                let k_u_c = neighbor_weight_to_community(u, c, &adjacency, &community);
                let gain = k_u_c / m - options.resolution * (sigma_tot[c] * k_u) / (2.0 * m * m);
                if gain > best_gain {
                    best_gain = gain;
                    best_community = c;
                }
            }

            community[u] = best_community;
            let k_u_best = neighbor_weight_to_community(u, best_community, &adjacency, &community);
            sigma_tot[best_community] += k_u;
            sigma_in[best_community] += 2.0 * k_u_best;

            if best_community != current {
                moved = true;
            }
        }

        if !moved {
            break;
        }
    }

    let mut members: HashMap<usize, Vec<String>> = HashMap::new();
    for (i, &c) in community.iter().enumerate() {
        members.entry(c).or_default().push(node_ids[i].clone());
    }

    let id_gen = IdGen::new();
    let mut clusters: Vec<KnowledgeCluster> = members
        .into_iter()
        .filter(|(_, nodes)| nodes.len() >= options.min_community_size)
        .map(|(c, mut nodes)| {
            nodes.sort();
            let coherence = if sigma_tot[c] > 0.0 {
                (2.0 * sigma_in[c] / sigma_tot[c]).min(1.0)
            } else {
                1.0
            };
            let modularity = sigma_in[c] / m - (sigma_tot[c] / (2.0 * m)).powi(2);
            KnowledgeCluster {
                id: id_gen.next("cluster"),
                nodes,
                algorithm: ClusterAlgorithm::Community,
                coherence: coherence.clamp(0.0, 1.0),
                modularity: Some(modularity),
                avg_similarity: None,
            }
        })
        .collect();

    clusters.sort_by(|a, b| a.nodes.first().cmp(&b.nodes.first()));
    clusters
}

fn neighbor_weight_to_community(
    u: usize,
    target_community: usize,
    adjacency: &[Vec<(usize, f64)>],
    community: &[usize],
) -> f64 {
    adjacency[u]
        .iter()
        .filter(|(v, _)| community[*v] == target_community)
        .map(|(_, w)| *w)
        .sum()
}

fn singleton_cluster(id_gen: &IdGen, nodes: Vec<String>) -> KnowledgeCluster {
    KnowledgeCluster {
        id: id_gen.next("cluster"),
        nodes,
        algorithm: ClusterAlgorithm::Community,
        coherence: 1.0,
        modularity: Some(0.0),
        avg_similarity: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Content, Information, Relationship};

    fn two_triangles_with_bridge() -> GraphStore {
        let mut store = GraphStore::new();
        for id in ["a1", "a2", "a3", "b1", "b2", "b3"] {
            store
                .add_node(Information::new(id, Content::Null, "fact").unwrap(), None)
                .unwrap();
        }
        let triangle = [("a1", "a2"), ("a2", "a3"), ("a3", "a1"), ("b1", "b2"), ("b2", "b3"), ("b3", "b1")];
        for (from, to) in triangle {
            store
                .add_edge(Relationship::new(from, to, "related_to", 1.0).unwrap(), None)
                .unwrap();
        }
        store
            .add_edge(Relationship::new("a1", "b1", "related_to", 0.1).unwrap(), None)
            .unwrap();
        store
    }

    #[test]
    fn empty_graph_yields_no_clusters() {
        let store = GraphStore::new();
        let clusters = detect_communities(&store, &CommunityOptions::default());
        assert!(clusters.is_empty());
    }

    #[test]
    fn zero_weight_graph_yields_singletons() {
        let mut store = GraphStore::new();
        store
            .add_node(Information::new("a", Content::Null, "fact").unwrap(), None)
            .unwrap();
        store
            .add_node(Information::new("b", Content::Null, "fact").unwrap(), None)
            .unwrap();
        let clusters = detect_communities(&store, &CommunityOptions::default());
        assert_eq!(clusters.len(), 2);
        assert!(clusters.iter().all(|c| c.coherence == 1.0));
    }

    #[test]
    fn two_triangles_separate_with_fixed_seed() {
        let store = two_triangles_with_bridge();
        let options = CommunityOptions {
            random_seed: Some(12345),
            ..CommunityOptions::default()
        };
        let clusters = detect_communities(&store, &options);
        assert_eq!(clusters.len(), 2);
        for cluster in &clusters {
            assert_eq!(cluster.nodes.len(), 3);
            assert!(cluster.coherence >= 0.0 && cluster.coherence <= 1.0);
            let modularity = cluster.modularity.unwrap();
            assert!(modularity >= -0.5 && modularity <= 1.0);
        }
    }

    #[test]
    fn min_community_size_filters_small_clusters() {
        let store = two_triangles_with_bridge();
        let options = CommunityOptions {
            random_seed: Some(1),
            min_community_size: 10,
            ..CommunityOptions::default()
        };
        let clusters = detect_communities(&store, &options);
        assert!(clusters.is_empty());
    }
}
