//! `SimilarityClusterer` — greedy single-linkage clustering of nodes by
//! content similarity (Jaccard or cosine over tokenized content).

use std::collections::{HashMap, HashSet};

use crate::graph::GraphStore;
use crate::types::{ClusterAlgorithm, IdGen, KnowledgeCluster};

const STOPWORDS: &[&str] = &["the", "and", "with", "for"];

/// Which similarity measure to use between two nodes' token sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityMetric {
    Jaccard,
    Cosine,
}

/// Tuning knobs for [`cluster_by_similarity`].
#[derive(Debug, Clone)]
pub struct SimilarityOptions {
    pub metric: SimilarityMetric,
    /// Minimum pairwise similarity for two clusters to merge.
    pub threshold: f64,
    /// When true, nodes of differing `type` are forced to similarity 0.
    pub consider_type: bool,
}

impl Default for SimilarityOptions {
    fn default() -> Self {
        Self {
            metric: SimilarityMetric::Jaccard,
            threshold: 0.5,
            consider_type: false,
        }
    }
}

/// Lowercase, replace non-word characters with spaces, split on
/// whitespace, drop tokens of length <= 2 and a small stopword set.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let normalized: String = lowered
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    normalized
        .split_whitespace()
        .filter(|tok| tok.len() > 2 && !STOPWORDS.contains(tok))
        .map(str::to_string)
        .collect()
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    if union == 0.0 {
        0.0
    } else {
        intersection / union
    }
}

fn cosine(a: &HashMap<String, usize>, b: &HashMap<String, usize>) -> f64 {
    let mut dot = 0.0;
    for (token, count) in a {
        if let Some(other_count) = b.get(token) {
            dot += (*count as f64) * (*other_count as f64);
        }
    }
    let norm_a: f64 = a.values().map(|c| (*c as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.values().map(|c| (*c as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

fn term_frequencies(tokens: &[String]) -> HashMap<String, usize> {
    let mut freqs = HashMap::new();
    for tok in tokens {
        *freqs.entry(tok.clone()).or_insert(0) += 1;
    }
    freqs
}

/// Similarity between two nodes' content under `options`.
pub fn node_similarity(store: &GraphStore, a: &str, b: &str, options: &SimilarityOptions) -> f64 {
    let (Some(node_a), Some(node_b)) = (store.get_node(a), store.get_node(b)) else {
        return 0.0;
    };
    if options.consider_type && node_a.node_type != node_b.node_type {
        return 0.0;
    }
    let tokens_a = tokenize(&node_a.content.flatten_to_text());
    let tokens_b = tokenize(&node_b.content.flatten_to_text());
    match options.metric {
        SimilarityMetric::Jaccard => jaccard(
            &tokens_a.into_iter().collect(),
            &tokens_b.into_iter().collect(),
        ),
        SimilarityMetric::Cosine => cosine(&term_frequencies(&tokens_a), &term_frequencies(&tokens_b)),
    }
}

/// Greedy single-linkage clustering: seed every node as its own cluster,
/// then repeatedly merge the pair of clusters whose maximum pairwise member
/// similarity exceeds `threshold`, until no more merges apply.
pub fn cluster_by_similarity(store: &GraphStore, options: &SimilarityOptions) -> Vec<KnowledgeCluster> {
    let mut node_ids: Vec<String> = store.node_ids().cloned().collect();
    node_ids.sort();
    if node_ids.is_empty() {
        return Vec::new();
    }

    let mut pairwise: HashMap<(usize, usize), f64> = HashMap::new();
    for i in 0..node_ids.len() {
        for j in (i + 1)..node_ids.len() {
            let sim = node_similarity(store, &node_ids[i], &node_ids[j], options);
            pairwise.insert((i, j), sim);
        }
    }

    let mut clusters: Vec<Vec<usize>> = (0..node_ids.len()).map(|i| vec![i]).collect();

    loop {
        let mut best: Option<(usize, usize, f64)> = None;
        for ci in 0..clusters.len() {
            for cj in (ci + 1)..clusters.len() {
                let max_sim = clusters[ci]
                    .iter()
                    .flat_map(|&a| clusters[cj].iter().map(move |&b| (a, b)))
                    .map(|(a, b)| {
                        let key = if a < b { (a, b) } else { (b, a) };
                        *pairwise.get(&key).unwrap_or(&0.0)
                    })
                    .fold(f64::MIN, f64::max);
                if max_sim > options.threshold {
                    match best {
                        Some((_, _, best_sim)) if best_sim >= max_sim => {}
                        _ => best = Some((ci, cj, max_sim)),
                    }
                }
            }
        }

        match best {
            Some((ci, cj, _)) => {
                let merged = clusters.remove(cj);
                clusters[ci].extend(merged);
            }
            None => break,
        }
    }

    let id_gen = IdGen::new();
    clusters
        .into_iter()
        .map(|indices| {
            let nodes: Vec<String> = indices.iter().map(|&i| node_ids[i].clone()).collect();
            let avg_similarity = if indices.len() < 2 {
                1.0
            } else {
                let mut total = 0.0;
                let mut count = 0.0;
                for a in 0..indices.len() {
                    for b in (a + 1)..indices.len() {
                        let key = if indices[a] < indices[b] {
                            (indices[a], indices[b])
                        } else {
                            (indices[b], indices[a])
                        };
                        total += *pairwise.get(&key).unwrap_or(&0.0);
                        count += 1.0;
                    }
                }
                if count > 0.0 {
                    total / count
                } else {
                    1.0
                }
            };
            KnowledgeCluster {
                id: id_gen.next("cluster"),
                nodes,
                algorithm: ClusterAlgorithm::Similarity,
                coherence: avg_similarity,
                modularity: None,
                avg_similarity: Some(avg_similarity),
            }
        })
        .collect()
}
