//! All data types for the knowledge graph engine.

pub mod content;
pub mod edge;
pub mod error;
pub mod experience;
pub mod ids;
pub mod node;

pub use content::{Content, Metadata};
pub use edge::{Direction, EdgeKey, Relationship};
pub use error::{GraphError, GraphResult};
pub use experience::{
    ClusterAlgorithm, Experience, GraphPattern, GraphPatternType, Insight, KnowledgeCluster,
    Outcome, Pattern,
};
pub use ids::{Clock, FixedClock, IdGen, Rng, SystemClock};
pub use node::{Information, NodePatch};
