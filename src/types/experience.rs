//! Experience, Pattern, GraphPattern, KnowledgeCluster, and Insight — the
//! types the learning core (`experience::*`) and analysis engine
//! (`analysis::*`) produce and consume.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::content::Metadata;

/// The outcome recorded when a traversal path completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The traversal achieved its goal.
    Success,
    /// The traversal failed to achieve its goal.
    Failure,
    /// Neither success nor failure — e.g. auto-completed idle paths.
    Neutral,
}

/// A free-text observation attached to an `Experience`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    /// The observation itself.
    pub text: String,
    /// When the observation was recorded.
    pub created_at: DateTime<Utc>,
}

/// A recorded traversal: the path taken, its context, outcome, timing, and
/// the learning state derived from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    /// Unique identifier.
    pub id: String,
    /// The ordered sequence of node ids traversed. Always non-empty.
    pub path: Vec<String>,
    /// A non-empty description of the situation this traversal occurred in.
    pub context: String,
    /// How the traversal ended.
    pub outcome: Outcome,
    /// Optional free-text feedback supplied at completion.
    pub feedback: Option<String>,
    /// When the traversal completed.
    pub timestamp: DateTime<Utc>,
    /// Total traversal time in milliseconds, excluding any paused duration.
    pub traversal_time_ms: u64,
    /// Accumulated reinforcement in `[0, 1]`.
    pub reinforcement: f64,
    /// Confidence in this experience's reinforcement in `[0, 1]`.
    pub confidence: f64,
    /// Sequential patterns this experience has been grouped into.
    pub patterns: Vec<Pattern>,
    /// Free-text observations recorded for this experience.
    pub insights: Vec<Insight>,
    /// Ids of experiences judged similar to this one.
    pub related_experiences: Vec<String>,
    /// Free-form keyed annotations.
    pub metadata: Option<Metadata>,
}

/// A recurring sequence of nodes distilled from similar experiences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pattern {
    /// Unique identifier.
    pub id: String,
    /// A human-readable description of the pattern.
    pub description: String,
    /// How many times this pattern has been observed.
    pub frequency: u64,
    /// Confidence in `[0, 1]` that this is a genuine recurring pattern.
    pub confidence: f64,
    /// The node sequence defining the pattern. Always non-empty.
    pub nodes: Vec<String>,
    /// Distinct contexts this pattern has been observed in.
    pub contexts: Vec<String>,
    /// Fraction of observations with a successful outcome, in `[0, 1]`.
    pub success_rate: f64,
    /// Running average traversal time across observations, in milliseconds.
    pub avg_traversal_time_ms: f64,
    /// When this pattern was most recently observed.
    pub last_seen: DateTime<Utc>,
}

/// A structural motif type recognized by the pattern miner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphPatternType {
    /// A center node with several distinct same-typed neighbors.
    Star,
    /// A simple directed path with matching edge types.
    Chain,
    /// A simple directed cycle.
    Cycle,
    /// An acyclic branching structure rooted at one node.
    Tree,
    /// A single edge whose removal disconnects the graph.
    Bridge,
    /// A densely interconnected node group.
    Cluster,
    /// A node with disproportionately many distinct neighbors.
    Hub,
}

/// A structural motif discovered in the graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphPattern {
    /// Unique identifier.
    pub id: String,
    /// Which structural template matched.
    pub pattern_type: GraphPatternType,
    /// The nodes participating in the motif.
    pub nodes: Vec<String>,
    /// The edges participating in the motif, as `(from, to, type)` triples.
    pub edges: Vec<(String, String, String)>,
    /// `occurrences / |V|`, in `[0, 1]`.
    pub support: f64,
    /// Template-specific confidence in `[0, 1]`.
    pub confidence: f64,
    /// Raw occurrence count.
    pub frequency: u64,
    /// When this motif was most recently observed.
    pub last_seen: DateTime<Utc>,
}

/// Which algorithm produced a `KnowledgeCluster`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterAlgorithm {
    /// Louvain community detection.
    Community,
    /// Jaccard/cosine content similarity.
    Similarity,
}

/// A subset of nodes grouped by a clustering algorithm, with a coherence
/// score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeCluster {
    /// Unique identifier.
    pub id: String,
    /// Member node ids.
    pub nodes: Vec<String>,
    /// Which algorithm produced this cluster.
    pub algorithm: ClusterAlgorithm,
    /// Fraction of incident weight (community) or average pairwise
    /// similarity (similarity) that stays internal to the cluster, in
    /// `[0, 1]`.
    pub coherence: f64,
    /// Present for `Community` clusters: this community's contribution to
    /// graph modularity.
    pub modularity: Option<f64>,
    /// Present for `Similarity` clusters: average pairwise similarity.
    pub avg_similarity: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Outcome::Success).unwrap(), "\"success\"");
        assert_eq!(serde_json::to_string(&Outcome::Neutral).unwrap(), "\"neutral\"");
    }

    #[test]
    fn cluster_algorithm_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ClusterAlgorithm::Community).unwrap(),
            "\"community\""
        );
    }
}
