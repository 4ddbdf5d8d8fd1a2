//! Storage abstraction for dependency records.
//!
//! This module provides the edge store trait and factory for creating
//! store backends:
//!
//! - **In-memory**: fast, ephemeral storage backed by a `HashMap`
//! - **JSONL**: the in-memory store with file persistence (atomic writes,
//!   resilient loading)
//!
//! The trait is async and object-safe, allowing dynamic dispatch via
//! `Box<dyn DependencyStore>`.
//!
//! # Check-then-act is not atomic
//!
//! The store serializes individual calls, nothing more. The canonical
//! guard sequence
//!
//! ```text
//! let graph = store.load_graph().await?;
//! if !graph.has_circular_dependency(&from, &to) {
//!     store.create(dep).await?;          // <- another writer may have
//! }                                      //    raced in between
//! ```
//!
//! spans two calls, and a concurrent writer can slip between them. A
//! process embedding this store in a concurrent server must put its own
//! mutual-exclusion boundary (a single writer lock, or one owning task)
//! around any read-then-write sequence.
//!
//! # Cross-process safety
//!
//! The JSONL backend takes no file lock. Concurrent **processes** racing
//! to add edges can each pass the cycle check against their own snapshot
//! and persist a combination that closes a cycle. If multiple processes
//! mutate the same data directory, route writes through a single-writer
//! discipline (lock file, serializing daemon). `find_conflicts` exists
//! partly to detect damage after the fact.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::{Dependency, DependencyFilter, DependencyId, IssueId};
use crate::error::Result;
use crate::graph::DependencyGraph;
use crate::graph::analysis::{DependencyStats, ValidationResult};

// Store backend implementations
pub mod in_memory;

/// Core storage trait for dependency records.
///
/// Implementations must be `Send + Sync` to support concurrent access in
/// async contexts.
///
/// # Method categories
///
/// - **CRUD**: `create`, `get`, `update`, `delete`
/// - **Queries**: `list`, `get_by_issue`, `load_graph`
/// - **Aggregate/bulk**: `get_stats`, `bulk_update`, `delete_by_issue`,
///   `find_conflicts`
/// - **Persistence**: `save`, `reload`
///
/// # Error handling
///
/// Validation failures ([`crate::error::Error::Validation`]), missing
/// records ([`crate::error::Error::DependencyNotFound`]) and I/O problems
/// ([`crate::error::Error::Store`]) are distinct variants so callers can
/// tell user error from data loss.
#[async_trait]
pub trait DependencyStore: Send + Sync {
    /// Persist a new dependency edge.
    ///
    /// Implementations **must** call [`Dependency::validate`] first so
    /// invalid records never reach the backing medium.
    ///
    /// # Errors
    ///
    /// - [`crate::error::Error::Validation`] if the record is invalid
    /// - [`crate::error::Error::DuplicateDependency`] if an edge with the
    ///   same `(source, type, target)` triple already exists
    async fn create(&mut self, dep: Dependency) -> Result<Dependency>;

    /// Get an edge by ID. Returns `None` if it doesn't exist.
    async fn get(&self, id: &DependencyId) -> Result<Option<Dependency>>;

    /// Replace an existing edge (matched by ID) with the given record.
    ///
    /// # Errors
    ///
    /// - [`crate::error::Error::Validation`] if the record is invalid
    /// - [`crate::error::Error::DependencyNotFound`] if no edge has this ID
    async fn update(&mut self, dep: Dependency) -> Result<Dependency>;

    /// Delete an edge by ID.
    ///
    /// # Errors
    ///
    /// - [`crate::error::Error::DependencyNotFound`] if no edge has this ID
    async fn delete(&mut self, id: &DependencyId) -> Result<()>;

    /// List edges matching the given filter.
    ///
    /// Results are sorted newest-created first (edge ID breaking ties for
    /// reproducibility) and paged by the filter's offset/limit. An empty
    /// filter returns every edge, all statuses included.
    async fn list(&self, filter: &DependencyFilter) -> Result<Vec<Dependency>>;

    /// All edges where the given item appears as source **or** target,
    /// newest-created first.
    async fn get_by_issue(&self, id: &IssueId) -> Result<Vec<Dependency>>;

    /// Load every edge into a fully populated [`DependencyGraph`].
    ///
    /// This is how an operation obtains its working view; the graph is a
    /// snapshot and does not track later store mutations.
    async fn load_graph(&self) -> Result<DependencyGraph>;

    /// Aggregate statistics over the edges matching the filter.
    async fn get_stats(&self, filter: &DependencyFilter) -> Result<DependencyStats>;

    /// Replace a batch of existing edges, all-or-nothing.
    ///
    /// Every record is validated and checked for existence before any is
    /// applied.
    ///
    /// # Errors
    ///
    /// - [`crate::error::Error::Validation`] if any record is invalid
    /// - [`crate::error::Error::DependencyNotFound`] if any record's ID is
    ///   unknown; in both cases nothing has been applied
    async fn bulk_update(&mut self, deps: Vec<Dependency>) -> Result<()>;

    /// Delete every edge touching the given item, in either direction.
    /// Returns how many edges were removed (zero for an unknown item).
    async fn delete_by_issue(&mut self, id: &IssueId) -> Result<usize>;

    /// Validate the stored edge set, reporting cycles and the edges
    /// involved in them.
    async fn find_conflicts(&self) -> Result<ValidationResult>;

    /// Save changes to persistent storage.
    ///
    /// Takes `&self` so callers can save from shared references;
    /// implementations use interior mutability. A no-op for the bare
    /// in-memory backend.
    async fn save(&self) -> Result<()>;

    /// Reload state from persistent storage, discarding in-memory
    /// changes.
    ///
    /// Restores the store to the on-disk state; essential for recovering
    /// consistency in long-lived processes after a failed `save()`. A
    /// no-op for the bare in-memory backend.
    async fn reload(&mut self) -> Result<()>;
}

/// Storage backend configuration.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    /// In-memory storage (ephemeral)
    InMemory,

    /// JSONL file storage (persistent)
    Jsonl(PathBuf),
}

impl StorageBackend {
    /// Returns the data file path for file-based backends.
    pub fn data_path(&self) -> Option<&Path> {
        match self {
            StorageBackend::Jsonl(path) => Some(path),
            StorageBackend::InMemory => None,
        }
    }
}

/// Wrapper that adds JSONL file persistence to the in-memory store.
///
/// Holds the file path and implements `save()` by writing all records to
/// the JSONL file atomically, and `reload()` by re-reading it.
struct JsonlBackedStore {
    inner: Box<dyn DependencyStore>,
    path: PathBuf,
}

#[async_trait]
impl DependencyStore for JsonlBackedStore {
    async fn create(&mut self, dep: Dependency) -> Result<Dependency> {
        self.inner.create(dep).await
    }

    async fn get(&self, id: &DependencyId) -> Result<Option<Dependency>> {
        self.inner.get(id).await
    }

    async fn update(&mut self, dep: Dependency) -> Result<Dependency> {
        self.inner.update(dep).await
    }

    async fn delete(&mut self, id: &DependencyId) -> Result<()> {
        self.inner.delete(id).await
    }

    async fn list(&self, filter: &DependencyFilter) -> Result<Vec<Dependency>> {
        self.inner.list(filter).await
    }

    async fn get_by_issue(&self, id: &IssueId) -> Result<Vec<Dependency>> {
        self.inner.get_by_issue(id).await
    }

    async fn load_graph(&self) -> Result<DependencyGraph> {
        self.inner.load_graph().await
    }

    async fn get_stats(&self, filter: &DependencyFilter) -> Result<DependencyStats> {
        self.inner.get_stats(filter).await
    }

    async fn bulk_update(&mut self, deps: Vec<Dependency>) -> Result<()> {
        self.inner.bulk_update(deps).await
    }

    async fn delete_by_issue(&mut self, id: &IssueId) -> Result<usize> {
        self.inner.delete_by_issue(id).await
    }

    async fn find_conflicts(&self) -> Result<ValidationResult> {
        self.inner.find_conflicts().await
    }

    async fn save(&self) -> Result<()> {
        in_memory::save_to_jsonl(self.inner.as_ref(), &self.path).await
    }

    async fn reload(&mut self) -> Result<()> {
        if self.path.exists() {
            let (store, warnings) = in_memory::load_from_jsonl(&self.path).await?;
            for warning in &warnings {
                tracing::warn!(warning = ?warning, "JSONL reload warning");
            }
            self.inner = store;
        } else {
            // File doesn't exist - reset to empty storage
            self.inner = in_memory::new_in_memory_store();
        }
        Ok(())
    }
}

/// Create a store instance for the given backend.
///
/// # Example
///
/// ```no_run
/// use gusset::storage::{StorageBackend, create_store};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> anyhow::Result<()> {
///     let store = create_store(StorageBackend::InMemory).await?;
///     let graph = store.load_graph().await?;
///     assert!(graph.is_empty());
///     Ok(())
/// }
/// ```
///
/// # Errors
///
/// Returns [`crate::error::Error::Store`] if an existing JSONL file
/// cannot be read. Bad individual lines are logged as warnings and
/// skipped, not treated as fatal.
pub async fn create_store(backend: StorageBackend) -> Result<Box<dyn DependencyStore>> {
    match backend {
        StorageBackend::InMemory => Ok(in_memory::new_in_memory_store()),
        StorageBackend::Jsonl(path) => {
            let inner = if path.exists() {
                let (store, warnings) = in_memory::load_from_jsonl(&path).await?;
                for warning in &warnings {
                    tracing::warn!(warning = ?warning, "JSONL load warning");
                }
                store
            } else {
                // First run - start empty; save() creates the file.
                in_memory::new_in_memory_store()
            };
            Ok(Box::new(JsonlBackedStore { inner, path }))
        }
    }
}
