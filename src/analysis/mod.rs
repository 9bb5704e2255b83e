//! Structural analysis over the graph: community detection, similarity
//! clustering, centrality metrics, and structural pattern mining.

pub mod centrality;
pub mod community;
pub mod patterns;
pub mod similarity;

pub use centrality::{
    betweenness_centrality, closeness_centrality, clustering_coefficient, compute_graph_metrics,
    compute_node_centrality, degree_centrality, eigenvector_centrality, page_rank, top_hubs,
    GraphMetrics, NodeCentrality,
};
pub use community::{detect_communities, CommunityOptions};
pub use patterns::{mine_patterns, PatternMinerOptions};
pub use similarity::{cluster_by_similarity, node_similarity, tokenize, SimilarityMetric, SimilarityOptions};
