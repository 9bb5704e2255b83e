//! An in-memory knowledge graph engine for AI agents.
//!
//! Nodes (`Information`) and typed edges (`Relationship`) form a directed
//! graph; traversals recorded as `Experience`s feed a learning layer that
//! reinforces useful paths and suggests next steps. Structural and
//! similarity analysis surface communities, patterns, and centrality over
//! the same graph. The whole state persists to a validated JSON snapshot
//! with atomic save and backup recovery.

pub mod analysis;
pub mod event;
pub mod experience;
pub mod graph;
pub mod snapshot;
pub mod types;

pub use analysis::{
    betweenness_centrality, closeness_centrality, clustering_coefficient, cluster_by_similarity,
    compute_graph_metrics, compute_node_centrality, degree_centrality, detect_communities,
    eigenvector_centrality, mine_patterns, node_similarity, page_rank, top_hubs, tokenize,
    CommunityOptions, GraphMetrics, NodeCentrality, PatternMinerOptions, SimilarityMetric,
    SimilarityOptions,
};
pub use event::{EventBus, EventPayload, FilteredView, ListenerId, Namespace};
pub use experience::{
    cascade_delete_node, context_similarity, path_pattern_similarity, path_similarity,
    LearningEngine, LearningOptions, PathTracker, PathTrackerOptions, PatternDetector,
    PatternDetectorOptions, Suggestion, SuggestionEngine, SuggestionOptions,
};
pub use graph::{
    find_paths, find_shortest_path, get_connected_components, get_subgraph, GraphStore,
    NoopTextIndex, TextIndex,
};
pub use snapshot::{PersistenceController, SnapshotCodec, SnapshotDocument, SnapshotMetadata};
pub use types::{
    ClusterAlgorithm, Clock, Content, Direction, EdgeKey, Experience, FixedClock, GraphError,
    GraphPattern, GraphPatternType, GraphResult, IdGen, Information, Insight, KnowledgeCluster,
    Metadata, NodePatch, Outcome, Pattern, Relationship, Rng, SystemClock,
};
