//! Integration tests for cycle detection and graph validation.

use gusset::domain::{Dependency, DependencyType, IssueId};
use gusset::graph::DependencyGraph;
use gusset::graph::analysis::DEFAULT_RANKING_SIZE;
use gusset::storage::{DependencyStore, in_memory::new_in_memory_store};

fn blocks(source: &str, target: &str) -> Dependency {
    Dependency::new(source, target, DependencyType::Blocks, None, "alice").unwrap()
}

#[tokio::test]
async fn test_point_check_fires_before_cycle_is_closed() {
    let mut store = new_in_memory_store();
    store.create(blocks("item-a", "item-b")).await.unwrap();
    store.create(blocks("item-b", "item-c")).await.unwrap();

    // A -> B -> C already reaches toward closing the loop, so the guard
    // for a prospective C -> A edge fires before that edge exists.
    let graph = store.load_graph().await.unwrap();
    assert!(graph.has_circular_dependency(&IssueId::new("item-c"), &IssueId::new("item-a")));

    // The graph itself is still acyclic.
    assert!(graph.find_circular_dependencies().is_empty());
}

#[tokio::test]
async fn test_closed_triangle_is_one_cycle() {
    let mut store = new_in_memory_store();
    store.create(blocks("item-a", "item-b")).await.unwrap();
    store.create(blocks("item-b", "item-c")).await.unwrap();
    // The store does not guard; the pre-insertion check is the caller's
    // job, so a cycle can be persisted and must then be reported.
    store.create(blocks("item-c", "item-a")).await.unwrap();

    let graph = store.load_graph().await.unwrap();
    let cycles = graph.find_circular_dependencies();

    assert_eq!(cycles.len(), 1);
    let cycle = &cycles[0];
    assert_eq!(cycle.len(), 3);
    for item in ["item-a", "item-b", "item-c"] {
        assert!(cycle.contains(&IssueId::new(item)));
    }
}

#[tokio::test]
async fn test_find_conflicts_reports_cycle_edges() {
    let mut store = new_in_memory_store();
    store.create(blocks("item-a", "item-b")).await.unwrap();
    store.create(blocks("item-b", "item-a")).await.unwrap();
    store.create(blocks("item-a", "item-x")).await.unwrap();

    let result = store.find_conflicts().await.unwrap();

    assert!(!result.is_valid);
    assert_eq!(result.circular_paths.len(), 1);
    assert_eq!(result.conflicting_dependencies.len(), 2);
    assert!(
        result
            .conflicting_dependencies
            .iter()
            .all(|dep| dep.target_id.as_str() != "item-x")
    );
    assert_eq!(result.warnings.len(), 1);
}

#[tokio::test]
async fn test_resolving_an_edge_clears_the_conflict() {
    let mut store = new_in_memory_store();
    let ab = store.create(blocks("item-a", "item-b")).await.unwrap();
    store.create(blocks("item-b", "item-a")).await.unwrap();

    let mut resolved = ab.clone();
    resolved.resolve("bob");
    store.update(resolved).await.unwrap();

    let result = store.find_conflicts().await.unwrap();
    assert!(result.is_valid);
    assert!(result.circular_paths.is_empty());
}

#[tokio::test]
async fn test_stats_identical_across_insertion_orders() {
    let edges = [
        blocks("item-a", "item-b"),
        blocks("item-c", "item-b"),
        blocks("item-b", "item-d"),
        blocks("item-e", "item-b"),
        blocks("item-d", "item-a"),
    ];

    let mut forward = new_in_memory_store();
    for edge in edges.iter().cloned() {
        forward.create(edge).await.unwrap();
    }
    let mut reversed = new_in_memory_store();
    for edge in edges.iter().rev().cloned() {
        reversed.create(edge).await.unwrap();
    }

    let forward_graph = forward.load_graph().await.unwrap();
    let reversed_graph = reversed.load_graph().await.unwrap();

    let forward_stats = forward_graph.stats(DEFAULT_RANKING_SIZE);
    let reversed_stats = reversed_graph.stats(DEFAULT_RANKING_SIZE);

    assert_eq!(forward_stats.most_blocked_issues, reversed_stats.most_blocked_issues);
    assert_eq!(
        forward_stats.most_blocking_issues,
        reversed_stats.most_blocking_issues
    );
    assert_eq!(
        forward_graph.find_circular_dependencies(),
        reversed_graph.find_circular_dependencies()
    );
}

#[tokio::test]
async fn test_impact_analysis_through_store() {
    let mut store = new_in_memory_store();
    store.create(blocks("item-a", "item-b")).await.unwrap();
    store.create(blocks("item-b", "item-c")).await.unwrap();

    let graph = store.load_graph().await.unwrap();
    let impact = graph.impact_analysis(&IssueId::new("item-a"));

    assert_eq!(impact.directly_blocked, vec![IssueId::new("item-b")]);
    assert_eq!(
        impact.transitively_blocked,
        vec![IssueId::new("item-b"), IssueId::new("item-c")]
    );
    assert_eq!(
        impact.critical_path,
        vec![
            IssueId::new("item-a"),
            IssueId::new("item-b"),
            IssueId::new("item-c"),
        ]
    );
}

#[test]
fn test_detectors_never_mutate() {
    let mut graph = DependencyGraph::new();
    graph.add_dependency(blocks("item-a", "item-b"));
    graph.add_dependency(blocks("item-b", "item-a"));

    let before: usize = graph.len();
    let _ = graph.has_circular_dependency(&IssueId::new("item-a"), &IssueId::new("item-b"));
    let _ = graph.find_circular_dependencies();
    let _ = graph.validate_graph();
    assert_eq!(graph.len(), before);
}
