//! Experience tracking and learning: turning traversals into reinforced,
//! pattern-grouped memories that drive suggestions.

pub mod learning;
pub mod path_tracker;
pub mod pattern_detector;
pub mod suggestion;

pub use learning::{context_similarity, path_similarity, LearningEngine, LearningOptions};
pub use path_tracker::{PathTracker, PathTrackerOptions};
pub use pattern_detector::{path_pattern_similarity, PatternDetector, PatternDetectorOptions};
pub use suggestion::{Suggestion, SuggestionEngine, SuggestionOptions};

use crate::graph::GraphStore;
use crate::types::Experience;

/// Delete a node from the graph and cascade the removal into the
/// experience store: any recorded experience whose path contains the node
/// is dropped along with it, since its traversal record is no longer
/// meaningful. Returns `true` if the node existed.
pub fn cascade_delete_node(
    store: &mut GraphStore,
    experiences: &mut Vec<Experience>,
    id: &str,
    events: Option<&crate::event::EventBus>,
) -> bool {
    let Some(_removed_edges) = store.delete_node(id, events) else {
        return false;
    };
    experiences.retain(|exp| !exp.path.iter().any(|n| n == id));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Content, Information, Outcome};
    use chrono::Utc;

    #[test]
    fn cascade_delete_removes_touching_experiences() {
        let mut store = GraphStore::new();
        store
            .add_node(Information::new("a", Content::Null, "fact").unwrap(), None)
            .unwrap();
        let mut experiences = vec![Experience {
            id: "e1".into(),
            path: vec!["a".to_string()],
            context: "ctx".into(),
            outcome: Outcome::Success,
            feedback: None,
            timestamp: Utc::now(),
            traversal_time_ms: 0,
            reinforcement: 0.5,
            confidence: 0.5,
            patterns: Vec::new(),
            insights: Vec::new(),
            related_experiences: Vec::new(),
            metadata: None,
        }];
        assert!(cascade_delete_node(&mut store, &mut experiences, "a", None));
        assert!(experiences.is_empty());
    }
}
