//! Core in-memory store data structures.
//!
//! This module contains the inner store structure that holds all
//! dependency records and is wrapped in `Arc<Mutex<>>` for thread safety.

use std::collections::HashMap;

use crate::domain::{Dependency, DependencyFilter, DependencyId};
use crate::graph::DependencyGraph;

/// Inner store structure (not thread-safe).
///
/// Holds the dependency records keyed by edge ID. The graph is **not**
/// cached here: it is a derived view, rebuilt from the records at the
/// start of each operation that needs it, so the records stay the single
/// source of truth.
pub(crate) struct InMemoryStoreInner {
    /// Dependency records indexed by edge ID for O(1) lookups
    pub(super) deps: HashMap<DependencyId, Dependency>,
}

impl InMemoryStoreInner {
    /// Create a new empty store instance
    pub(crate) fn new() -> Self {
        Self {
            deps: HashMap::new(),
        }
    }

    /// Build a fully populated graph from the current records.
    pub(super) fn graph(&self) -> DependencyGraph {
        DependencyGraph::from_edges(self.deps.values().cloned())
    }

    /// Apply a filter, sort newest-created first (edge ID as the
    /// deterministic tiebreak), and page with the filter's offset/limit.
    pub(super) fn list_filtered(&self, filter: &DependencyFilter) -> Vec<Dependency> {
        let mut deps: Vec<Dependency> = self
            .deps
            .values()
            .filter(|dep| filter.matches(dep))
            .cloned()
            .collect();

        deps.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));

        if let Some(offset) = filter.offset {
            deps.drain(..offset.min(deps.len()));
        }
        if let Some(limit) = filter.limit {
            deps.truncate(limit);
        }

        deps
    }
}
