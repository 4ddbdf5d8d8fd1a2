//! In-memory dependency graph index.
//!
//! [`DependencyGraph`] indexes a set of [`Dependency`] edges for O(1)
//! lookup by edge ID, source item, and target item. It is a derived,
//! rebuildable view: a graph is populated from the store at the start of a
//! logical operation, queried, and discarded. Nothing in here persists.
//!
//! # Index invariants
//!
//! - Every edge ID in `edges` appears in exactly one `by_source` bucket
//!   (keyed by its source) and exactly one `by_target` bucket (keyed by its
//!   target).
//! - No dangling IDs: a bucket entry always refers to an edge in `edges`.
//! - No empty buckets: a bucket is removed when its last entry is removed.
//!
//! Replacing an edge whose ID is already present removes the stale index
//! entries first, so the invariants hold even when an edge is re-added with
//! the same ID.
//!
//! # Blocking semantics
//!
//! The two edge types are dual views of the same "X before Y" relation:
//!
//! - `Requires(s -> t)`: `s` cannot complete until `t` completes, so `t`
//!   blocks `s`.
//! - `Blocks(s -> t)`: `s` must complete before `t` can proceed, so `s`
//!   blocks `t`.
//!
//! Only **active** edges participate in blocking queries. Resolved and
//! ignored edges stay in the index for history and remain retrievable by
//! ID.

pub mod analysis;
pub mod cycles;

use std::collections::{BTreeSet, HashMap};

use crate::domain::{Dependency, DependencyId, DependencyType, IssueId};

/// An in-memory index over a set of dependency edges.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Edges keyed by ID
    edges: HashMap<DependencyId, Dependency>,

    /// Edge IDs bucketed by source item, in insertion order
    by_source: HashMap<IssueId, Vec<DependencyId>>,

    /// Edge IDs bucketed by target item, in insertion order
    by_target: HashMap<IssueId, Vec<DependencyId>>,
}

impl DependencyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a collection of edges.
    pub fn from_edges(edges: impl IntoIterator<Item = Dependency>) -> Self {
        let mut graph = Self::new();
        for dep in edges {
            graph.add_dependency(dep);
        }
        graph
    }

    /// Number of edges in the graph, all statuses included.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph holds no edges.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Look up an edge by ID.
    pub fn get(&self, id: &DependencyId) -> Option<&Dependency> {
        self.edges.get(id)
    }

    /// Iterate over all edges in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Dependency> {
        self.edges.values()
    }

    /// Insert an edge, replacing any edge with the same ID.
    ///
    /// When the ID is already present the stale index entries are removed
    /// before the new ones are appended, so bucket entries are never
    /// duplicated or leaked.
    pub fn add_dependency(&mut self, dep: Dependency) {
        if let Some(stale) = self.edges.remove(&dep.id) {
            self.unindex(&stale);
        }
        self.by_source
            .entry(dep.source_id.clone())
            .or_default()
            .push(dep.id.clone());
        self.by_target
            .entry(dep.target_id.clone())
            .or_default()
            .push(dep.id.clone());
        self.edges.insert(dep.id.clone(), dep);
    }

    /// Remove an edge by ID, returning it if present.
    ///
    /// A no-op when the ID is absent. Buckets emptied by the removal are
    /// dropped entirely.
    pub fn remove_dependency(&mut self, id: &DependencyId) -> Option<Dependency> {
        let dep = self.edges.remove(id)?;
        self.unindex(&dep);
        Some(dep)
    }

    /// Remove the edge's ID from both index buckets, dropping buckets that
    /// become empty.
    fn unindex(&mut self, dep: &Dependency) {
        if let Some(bucket) = self.by_source.get_mut(&dep.source_id) {
            bucket.retain(|id| id != &dep.id);
            if bucket.is_empty() {
                self.by_source.remove(&dep.source_id);
            }
        }
        if let Some(bucket) = self.by_target.get_mut(&dep.target_id) {
            bucket.retain(|id| id != &dep.id);
            if bucket.is_empty() {
                self.by_target.remove(&dep.target_id);
            }
        }
    }

    /// All edges where the given item is the source, in insertion order.
    pub fn dependencies_from_source(&self, item: &IssueId) -> Vec<&Dependency> {
        self.materialize(self.by_source.get(item))
    }

    /// All edges where the given item is the target, in insertion order.
    pub fn dependencies_from_target(&self, item: &IssueId) -> Vec<&Dependency> {
        self.materialize(self.by_target.get(item))
    }

    fn materialize(&self, bucket: Option<&Vec<DependencyId>>) -> Vec<&Dependency> {
        bucket
            .map(|ids| ids.iter().filter_map(|id| self.edges.get(id)).collect())
            .unwrap_or_default()
    }

    /// Items that must complete before the given item can proceed.
    ///
    /// Over active edges only: `Requires(item -> t)` means `t` blocks
    /// `item`; `Blocks(s -> item)` means `s` blocks `item`. The result is
    /// sorted lexicographically.
    pub fn blocking_issues(&self, item: &IssueId) -> Vec<IssueId> {
        let mut blocking = BTreeSet::new();
        for dep in self.dependencies_from_source(item) {
            if dep.is_active() && dep.dep_type == DependencyType::Requires {
                blocking.insert(dep.target_id.clone());
            }
        }
        for dep in self.dependencies_from_target(item) {
            if dep.is_active() && dep.dep_type == DependencyType::Blocks {
                blocking.insert(dep.source_id.clone());
            }
        }
        blocking.into_iter().collect()
    }

    /// Items waiting on the given item, the inverse of
    /// [`blocking_issues`](Self::blocking_issues).
    ///
    /// Over active edges only: `Blocks(item -> t)` means `t` waits on
    /// `item`; `Requires(s -> item)` means `s` waits on `item`. The result
    /// is sorted lexicographically.
    pub fn blocked_issues(&self, item: &IssueId) -> Vec<IssueId> {
        let mut blocked = BTreeSet::new();
        for dep in self.dependencies_from_source(item) {
            if dep.is_active() && dep.dep_type == DependencyType::Blocks {
                blocked.insert(dep.target_id.clone());
            }
        }
        for dep in self.dependencies_from_target(item) {
            if dep.is_active() && dep.dep_type == DependencyType::Requires {
                blocked.insert(dep.source_id.clone());
            }
        }
        blocked.into_iter().collect()
    }

    /// Whether anything must complete before the given item can proceed.
    pub fn is_blocked(&self, item: &IssueId) -> bool {
        !self.blocking_issues(item).is_empty()
    }

    /// Iterate over active edges in unspecified order.
    pub(crate) fn active_edges(&self) -> impl Iterator<Item = &Dependency> {
        self.edges.values().filter(|dep| dep.is_active())
    }

    /// The union of sources and targets of active edges, sorted.
    ///
    /// Traversals iterate this instead of raw map keys so their output does
    /// not depend on hash order or insertion order.
    pub(crate) fn sorted_nodes(&self) -> Vec<IssueId> {
        let mut nodes = BTreeSet::new();
        for dep in self.active_edges() {
            nodes.insert(dep.source_id.clone());
            nodes.insert(dep.target_id.clone());
        }
        nodes.into_iter().collect()
    }

    /// Successor lists over active edges, following the literal
    /// `source -> target` pointer regardless of edge type. Each list is
    /// sorted and deduplicated.
    pub(crate) fn active_adjacency(&self) -> HashMap<IssueId, Vec<IssueId>> {
        let mut successors: HashMap<IssueId, BTreeSet<IssueId>> = HashMap::new();
        for dep in self.active_edges() {
            successors
                .entry(dep.source_id.clone())
                .or_default()
                .insert(dep.target_id.clone());
        }
        successors
            .into_iter()
            .map(|(node, targets)| (node, targets.into_iter().collect()))
            .collect()
    }

    /// Find an active edge whose literal pointer runs `source -> target`,
    /// whichever of the two types it has.
    pub(crate) fn find_active_edge(
        &self,
        source: &IssueId,
        target: &IssueId,
    ) -> Option<&Dependency> {
        self.dependencies_from_source(source)
            .into_iter()
            .find(|dep| dep.is_active() && &dep.target_id == target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DependencyStatus;

    fn edge(source: &str, target: &str, dep_type: DependencyType) -> Dependency {
        Dependency::new(source, target, dep_type, None, "alice").unwrap()
    }

    #[test]
    fn test_add_then_remove_leaves_no_residue() {
        let mut graph = DependencyGraph::new();
        let dep = edge("item-a", "item-b", DependencyType::Blocks);
        let id = dep.id.clone();

        graph.add_dependency(dep);
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.dependencies_from_source(&IssueId::new("item-a")).len(), 1);

        let removed = graph.remove_dependency(&id);
        assert!(removed.is_some());
        assert!(graph.is_empty());
        assert!(graph.get(&id).is_none());

        // Buckets must be dropped entirely, not left empty.
        assert!(graph.by_source.is_empty());
        assert!(graph.by_target.is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency(edge("item-a", "item-b", DependencyType::Blocks));

        assert!(graph.remove_dependency(&DependencyId::new("dep-missing")).is_none());
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_replacing_edge_does_not_duplicate_index_entries() {
        let mut graph = DependencyGraph::new();
        let first = edge("item-a", "item-b", DependencyType::Blocks);
        let id = first.id.clone();

        let mut second = first.clone();
        second.resolve("bob");

        graph.add_dependency(first);
        graph.add_dependency(second);

        assert_eq!(graph.len(), 1);
        assert_eq!(graph.dependencies_from_source(&IssueId::new("item-a")).len(), 1);
        assert_eq!(graph.dependencies_from_target(&IssueId::new("item-b")).len(), 1);
        assert_eq!(graph.get(&id).map(|d| d.status), Some(DependencyStatus::Resolved));
    }

    #[test]
    fn test_blocks_edge_blocking_and_blocked() {
        // Scenario: Blocks(A -> B) means A blocks B.
        let mut graph = DependencyGraph::new();
        graph.add_dependency(edge("item-a", "item-b", DependencyType::Blocks));

        let a = IssueId::new("item-a");
        let b = IssueId::new("item-b");

        assert_eq!(graph.blocked_issues(&a), vec![b.clone()]);
        assert_eq!(graph.blocking_issues(&b), vec![a.clone()]);
        assert!(graph.blocking_issues(&a).is_empty());
        assert!(!graph.is_blocked(&a));
        assert!(graph.is_blocked(&b));
    }

    #[test]
    fn test_requires_edge_is_dual_of_blocks() {
        // Scenario: Blocks(A -> B) plus Requires(C -> A). C requires A, so
        // A blocks C, and A now blocks both B and C.
        let mut graph = DependencyGraph::new();
        graph.add_dependency(edge("item-a", "item-b", DependencyType::Blocks));
        graph.add_dependency(edge("item-c", "item-a", DependencyType::Requires));

        let a = IssueId::new("item-a");
        let b = IssueId::new("item-b");
        let c = IssueId::new("item-c");

        assert_eq!(graph.blocking_issues(&c), vec![a.clone()]);
        assert_eq!(graph.blocked_issues(&a), vec![b.clone(), c.clone()]);
    }

    #[test]
    fn test_blocking_duality() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency(edge("item-a", "item-b", DependencyType::Blocks));
        graph.add_dependency(edge("item-c", "item-a", DependencyType::Requires));
        graph.add_dependency(edge("item-b", "item-d", DependencyType::Requires));

        // t is blocked by s iff s is blocking t, for every pair.
        let nodes: Vec<IssueId> = ["item-a", "item-b", "item-c", "item-d"]
            .into_iter()
            .map(IssueId::new)
            .collect();
        for s in &nodes {
            for t in &nodes {
                let s_blocks_t = graph.blocked_issues(s).contains(t);
                let t_blocked_by_s = graph.blocking_issues(t).contains(s);
                assert_eq!(s_blocks_t, t_blocked_by_s, "duality violated for {s} / {t}");
            }
        }
    }

    #[test]
    fn test_resolved_edges_excluded_from_blocking() {
        let mut graph = DependencyGraph::new();
        let mut dep = edge("item-a", "item-b", DependencyType::Blocks);
        let id = dep.id.clone();
        dep.resolve("bob");
        graph.add_dependency(dep);

        let a = IssueId::new("item-a");
        let b = IssueId::new("item-b");

        assert!(graph.blocked_issues(&a).is_empty());
        assert!(graph.blocking_issues(&b).is_empty());
        assert!(!graph.is_blocked(&b));

        // Still present for history.
        assert!(graph.get(&id).is_some());
        assert_eq!(graph.dependencies_from_source(&a).len(), 1);
    }

    #[test]
    fn test_isolated_items_are_unblocked() {
        let graph = DependencyGraph::new();
        for item in ["item-a", "item-b", "item-c"] {
            assert!(!graph.is_blocked(&IssueId::new(item)));
        }
    }
}
