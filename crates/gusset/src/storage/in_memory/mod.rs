//! In-memory store backend.
//!
//! A fast, **ephemeral** store where all dependency records are held in
//! RAM and lost when the process exits. Suitable for tests, short-lived
//! CLI invocations, and as the engine behind the JSONL-backed store.
//!
//! # Persistence
//!
//! Optional JSONL persistence is available through [`load_from_jsonl`]
//! and [`save_to_jsonl`]. The trait's `save()` method is a no-op for the
//! bare in-memory store; the `Jsonl` backend in
//! [`crate::storage::create_store`] wraps it so `save()` writes the file.
//!
//! # Architecture
//!
//! - `HashMap<DependencyId, Dependency>` is the single source of truth.
//! - The [`DependencyGraph`](crate::graph::DependencyGraph) is rebuilt
//!   from the records whenever an operation needs graph queries; it is a
//!   derived view and never stored.
//!
//! # Thread safety
//!
//! The store is wrapped in `Arc<tokio::sync::Mutex<_>>`; every trait
//! method acquires the lock for its duration. Note that this protects
//! individual calls only: a cycle check followed by a create is two lock
//! acquisitions, and the gap between them is the caller's to close (see
//! the crate-level concurrency notes).

mod inner;
mod jsonl;
mod trait_impl;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::storage::DependencyStore;
use inner::InMemoryStoreInner;

// Re-export public API
pub use jsonl::{LoadWarning, load_from_jsonl, save_to_jsonl};

/// Thread-safe in-memory store.
///
/// This type alias wraps the inner store in `Arc<Mutex<>>` for
/// thread-safe async access. It implements
/// [`DependencyStore`](crate::storage::DependencyStore) via the trait
/// implementation in `trait_impl.rs`.
pub(crate) type InMemoryStore = Arc<Mutex<InMemoryStoreInner>>;

/// Create a new empty in-memory store instance.
pub fn new_in_memory_store() -> Box<dyn DependencyStore> {
    Box::new(Arc::new(Mutex::new(InMemoryStoreInner::new())))
}
