//! End-to-end scenario: Louvain community detection on two triangles
//! joined by a weak bridge, with an isolated node.

use knowledge_graph_engine::{detect_communities, CommunityOptions, Content, GraphStore, Information, Relationship};

#[test]
fn two_triangles_with_bridge_separate_into_three_clusters() {
    let mut store = GraphStore::new();
    for id in ["A", "B", "C", "D", "E", "F", "G"] {
        store
            .add_node(Information::new(id, Content::Null, "fact").unwrap(), None)
            .unwrap();
    }

    let weighted_edges = [
        ("A", "B", 0.9),
        ("B", "C", 0.9),
        ("A", "C", 0.8),
        ("D", "E", 0.9),
        ("E", "F", 0.9),
        ("D", "F", 0.8),
        ("C", "D", 0.3),
    ];
    for (from, to, weight) in weighted_edges {
        store
            .add_edge(Relationship::new(from, to, "related_to", weight).unwrap(), None)
            .unwrap();
    }

    let options = CommunityOptions {
        random_seed: Some(12345),
        ..CommunityOptions::default()
    };
    let clusters = detect_communities(&store, &options);

    assert!(clusters.len() >= 3);

    let find_cluster_containing = |node: &str| {
        clusters
            .iter()
            .find(|c| c.nodes.iter().any(|n| n == node))
            .expect("every node belongs to some cluster")
    };

    let abc = find_cluster_containing("A");
    assert!(abc.nodes.contains(&"B".to_string()));
    assert!(abc.nodes.contains(&"C".to_string()));

    let def = find_cluster_containing("D");
    assert!(def.nodes.contains(&"E".to_string()));
    assert!(def.nodes.contains(&"F".to_string()));

    let g = find_cluster_containing("G");
    assert_eq!(g.nodes, vec!["G".to_string()]);

    for cluster in &clusters {
        if cluster.nodes.len() > 1 {
            assert!(cluster.coherence >= 0.3, "non-singleton cluster coherence too low: {cluster:?}");
        }
    }
}
