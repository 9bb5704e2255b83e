//! The text-index collaborator contract.
//!
//! Full-text search is out of scope for this engine (see SPEC_FULL.md §1),
//! but `GraphStore` still calls out to an index on every node mutation so a
//! real search adapter can be plugged in without the store knowing about
//! it. `NoopTextIndex` lets the store work standalone.

use crate::types::Information;

/// The contract an external text-search collaborator must honor. The core
/// calls these on every node CRUD event.
pub trait TextIndex: Send {
    /// Index a newly-added node.
    fn add_node(&mut self, info: &Information);

    /// Re-index a node whose fields changed.
    fn update_node(&mut self, info: &Information);

    /// Remove a node from the index.
    fn remove_node(&mut self, id: &str);
}

/// A `TextIndex` that does nothing. Used when no search collaborator is
/// wired in.
#[derive(Debug, Default)]
pub struct NoopTextIndex;

impl TextIndex for NoopTextIndex {
    fn add_node(&mut self, _info: &Information) {}
    fn update_node(&mut self, _info: &Information) {}
    fn remove_node(&mut self, _id: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Content;

    #[test]
    fn noop_index_does_nothing_observable() {
        let mut index = NoopTextIndex;
        let node = Information::new("n1", Content::Null, "fact").unwrap();
        index.add_node(&node);
        index.update_node(&node);
        index.remove_node("n1");
    }
}
