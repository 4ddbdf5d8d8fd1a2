//! Integration tests for blocking queries over the dependency graph.
//!
//! These tests exercise the full path a caller takes: records go in
//! through the store, the graph is loaded as a derived view, and the
//! blocking queries are asked against it.

use gusset::domain::{Dependency, DependencyType, IssueId};
use gusset::storage::{DependencyStore, in_memory::new_in_memory_store};

fn blocks(source: &str, target: &str) -> Dependency {
    Dependency::new(source, target, DependencyType::Blocks, None, "alice").unwrap()
}

fn requires(source: &str, target: &str) -> Dependency {
    Dependency::new(source, target, DependencyType::Requires, None, "alice").unwrap()
}

#[tokio::test]
async fn test_single_blocks_edge() {
    let mut store = new_in_memory_store();
    store.create(blocks("item-a", "item-b")).await.unwrap();

    let graph = store.load_graph().await.unwrap();
    assert_eq!(
        graph.blocked_issues(&IssueId::new("item-a")),
        vec![IssueId::new("item-b")]
    );
    assert_eq!(
        graph.blocking_issues(&IssueId::new("item-b")),
        vec![IssueId::new("item-a")]
    );
}

#[tokio::test]
async fn test_requires_edge_adds_to_blocked_set() {
    let mut store = new_in_memory_store();
    store.create(blocks("item-a", "item-b")).await.unwrap();
    store.create(requires("item-c", "item-a")).await.unwrap();

    let graph = store.load_graph().await.unwrap();

    // C requires A, so A blocks C.
    assert!(
        graph
            .blocking_issues(&IssueId::new("item-c"))
            .contains(&IssueId::new("item-a"))
    );
    // A now blocks both B (via Blocks) and C (via Requires).
    assert_eq!(
        graph.blocked_issues(&IssueId::new("item-a")),
        vec![IssueId::new("item-b"), IssueId::new("item-c")]
    );
}

#[tokio::test]
async fn test_items_without_edges_are_unblocked() {
    let store = new_in_memory_store();
    let graph = store.load_graph().await.unwrap();

    for item in ["item-a", "item-b", "item-c"] {
        assert!(!graph.is_blocked(&IssueId::new(item)));
    }
    assert!(graph.find_circular_dependencies().is_empty());
}

#[tokio::test]
async fn test_blocking_duality_holds_across_edge_types() {
    let mut store = new_in_memory_store();
    store.create(blocks("item-a", "item-b")).await.unwrap();
    store.create(requires("item-c", "item-a")).await.unwrap();
    store.create(blocks("item-b", "item-d")).await.unwrap();
    store.create(requires("item-d", "item-c")).await.unwrap();

    let graph = store.load_graph().await.unwrap();
    let items: Vec<IssueId> = ["item-a", "item-b", "item-c", "item-d"]
        .into_iter()
        .map(IssueId::new)
        .collect();

    for s in &items {
        for t in &items {
            assert_eq!(
                graph.blocked_issues(s).contains(t),
                graph.blocking_issues(t).contains(s),
                "duality violated for {s} / {t}"
            );
        }
    }
}

#[tokio::test]
async fn test_resolved_edge_stops_blocking_but_stays_retrievable() {
    let mut store = new_in_memory_store();
    let created = store.create(blocks("item-a", "item-b")).await.unwrap();

    let mut resolved = created.clone();
    resolved.resolve("bob");
    store.update(resolved).await.unwrap();

    let graph = store.load_graph().await.unwrap();
    assert!(graph.blocked_issues(&IssueId::new("item-a")).is_empty());
    assert!(graph.blocking_issues(&IssueId::new("item-b")).is_empty());

    // Still in the store and the graph, for history.
    assert!(store.get(&created.id).await.unwrap().is_some());
    assert!(graph.get(&created.id).is_some());
}

#[tokio::test]
async fn test_reactivated_edge_blocks_again() {
    let mut store = new_in_memory_store();
    let created = store.create(blocks("item-a", "item-b")).await.unwrap();

    let mut edge = created.clone();
    edge.ignore("bob");
    store.update(edge.clone()).await.unwrap();

    let graph = store.load_graph().await.unwrap();
    assert!(!graph.is_blocked(&IssueId::new("item-b")));

    edge.reactivate();
    store.update(edge).await.unwrap();

    let graph = store.load_graph().await.unwrap();
    assert!(graph.is_blocked(&IssueId::new("item-b")));
}

#[tokio::test]
async fn test_create_then_delete_leaves_clean_graph() {
    let mut store = new_in_memory_store();
    let created = store.create(blocks("item-a", "item-b")).await.unwrap();
    store.delete(&created.id).await.unwrap();

    let graph = store.load_graph().await.unwrap();
    assert!(graph.is_empty());
    assert!(
        graph
            .dependencies_from_source(&IssueId::new("item-a"))
            .is_empty()
    );
    assert!(
        graph
            .dependencies_from_target(&IssueId::new("item-b"))
            .is_empty()
    );
}

#[tokio::test]
async fn test_blocking_info_view() {
    let mut store = new_in_memory_store();
    store.create(blocks("item-a", "item-b")).await.unwrap();
    store.create(blocks("item-b", "item-c")).await.unwrap();

    let graph = store.load_graph().await.unwrap();
    let info = graph.blocking_info(&IssueId::new("item-b"));

    assert_eq!(info.issue_id, IssueId::new("item-b"));
    assert!(info.is_blocked);
    assert_eq!(info.blocked_by, vec![IssueId::new("item-a")]);
    assert_eq!(info.blocking, vec![IssueId::new("item-c")]);
}
