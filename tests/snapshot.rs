//! End-to-end scenario: snapshot round-trip with nested content and a
//! non-ASCII type, via atomic save/load.

use std::collections::BTreeMap;

use knowledge_graph_engine::{Content, GraphStore, Information, PersistenceController};
use tempfile::tempdir;

#[test]
fn snapshot_round_trips_nested_content_and_non_ascii_type() {
    let mut inner = BTreeMap::new();
    inner.insert("data".to_string(), Content::String("t".to_string()));
    inner.insert(
        "numbers".to_string(),
        Content::Sequence(vec![Content::Number(1.0), Content::Number(2.0), Content::Number(3.0)]),
    );
    let mut outer = BTreeMap::new();
    outer.insert("nested".to_string(), Content::Map(inner));
    let content = Content::Map(outer);

    let mut store = GraphStore::new();
    let node = Information::new("n1", content.clone(), "事実").unwrap();
    let created = node.created;
    store.add_node(node, None).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("graph.json");
    PersistenceController::save(&store, &path).unwrap();

    let loaded = PersistenceController::load_into_new_store(&path).unwrap();
    let reloaded_node = loaded.get_node("n1").unwrap();

    assert_eq!(reloaded_node.content, content);
    assert_eq!(reloaded_node.node_type, "事実");
    assert_eq!(reloaded_node.created, created);
}

#[test]
fn load_with_recovery_falls_back_after_corruption() {
    let mut store = GraphStore::new();
    store
        .add_node(Information::new("n1", Content::Null, "fact").unwrap(), None)
        .unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("graph.json");
    PersistenceController::save_with_backup(&store, &path).unwrap();
    PersistenceController::save_with_backup(&store, &path).unwrap();

    std::fs::write(&path, "{ this is not json").unwrap();
    let recovered = PersistenceController::load_with_recovery(&path).unwrap();
    assert_eq!(recovered.nodes.len(), 1);
}
