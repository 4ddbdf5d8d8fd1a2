//! DependencyStore trait implementation for in-memory storage.

use async_trait::async_trait;

use super::InMemoryStore;
use crate::domain::{Dependency, DependencyFilter, DependencyId, IssueId};
use crate::error::{Error, Result};
use crate::graph::DependencyGraph;
use crate::graph::analysis::{DEFAULT_RANKING_SIZE, DependencyStats, ValidationResult};
use crate::storage::DependencyStore;

#[async_trait]
impl DependencyStore for InMemoryStore {
    async fn create(&mut self, dep: Dependency) -> Result<Dependency> {
        let mut inner = self.lock().await;

        dep.validate()?;

        // The edge ID is a pure function of (source, type, target), so a
        // key collision means the same relationship was recorded before.
        if inner.deps.contains_key(&dep.id) {
            return Err(Error::DuplicateDependency {
                source_id: dep.source_id,
                target_id: dep.target_id,
                dep_type: dep.dep_type,
            });
        }

        inner.deps.insert(dep.id.clone(), dep.clone());
        Ok(dep)
    }

    async fn get(&self, id: &DependencyId) -> Result<Option<Dependency>> {
        let inner = self.lock().await;
        Ok(inner.deps.get(id).cloned())
    }

    async fn update(&mut self, dep: Dependency) -> Result<Dependency> {
        let mut inner = self.lock().await;

        dep.validate()?;

        if !inner.deps.contains_key(&dep.id) {
            return Err(Error::DependencyNotFound(dep.id));
        }

        inner.deps.insert(dep.id.clone(), dep.clone());
        Ok(dep)
    }

    async fn delete(&mut self, id: &DependencyId) -> Result<()> {
        let mut inner = self.lock().await;

        if inner.deps.remove(id).is_none() {
            return Err(Error::DependencyNotFound(id.clone()));
        }
        Ok(())
    }

    async fn list(&self, filter: &DependencyFilter) -> Result<Vec<Dependency>> {
        let inner = self.lock().await;
        Ok(inner.list_filtered(filter))
    }

    async fn get_by_issue(&self, id: &IssueId) -> Result<Vec<Dependency>> {
        let inner = self.lock().await;

        let mut deps: Vec<Dependency> = inner
            .deps
            .values()
            .filter(|dep| &dep.source_id == id || &dep.target_id == id)
            .cloned()
            .collect();
        deps.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));

        Ok(deps)
    }

    async fn load_graph(&self) -> Result<DependencyGraph> {
        let inner = self.lock().await;
        Ok(inner.graph())
    }

    async fn get_stats(&self, filter: &DependencyFilter) -> Result<DependencyStats> {
        let inner = self.lock().await;

        let filtered = inner.deps.values().filter(|dep| filter.matches(dep));
        let graph = DependencyGraph::from_edges(filtered.cloned());
        Ok(graph.stats(DEFAULT_RANKING_SIZE))
    }

    async fn bulk_update(&mut self, deps: Vec<Dependency>) -> Result<()> {
        let mut inner = self.lock().await;

        // Phase 1: all validations, no mutations. Either every record in
        // the batch applies or none does.
        for dep in &deps {
            dep.validate()?;
            if !inner.deps.contains_key(&dep.id) {
                return Err(Error::DependencyNotFound(dep.id.clone()));
            }
        }

        // Phase 2: apply.
        for dep in deps {
            inner.deps.insert(dep.id.clone(), dep);
        }
        Ok(())
    }

    async fn delete_by_issue(&mut self, id: &IssueId) -> Result<usize> {
        let mut inner = self.lock().await;

        let before = inner.deps.len();
        inner
            .deps
            .retain(|_, dep| &dep.source_id != id && &dep.target_id != id);
        Ok(before - inner.deps.len())
    }

    async fn find_conflicts(&self) -> Result<ValidationResult> {
        let inner = self.lock().await;
        Ok(inner.graph().validate_graph())
    }

    async fn save(&self) -> Result<()> {
        // Ephemeral storage; nothing to persist. The JSONL-backed wrapper
        // overrides this with a real write.
        Ok(())
    }

    async fn reload(&mut self) -> Result<()> {
        // No backing store to reload from.
        Ok(())
    }
}
