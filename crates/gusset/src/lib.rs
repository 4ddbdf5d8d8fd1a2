//! Gusset - a dependency graph engine for work-item tracking.
//!
//! Gusset models "blocks"/"requires" relationships between work items as
//! directed, typed, stateful edges and answers the questions that matter
//! about them: is the edge set acyclic, what is blocked by what, and what
//! are the consequences of changing a given item.
//!
//! # Components
//!
//! - [`domain`]: the [`Dependency`](domain::Dependency) edge record and
//!   its lifecycle state machine
//! - [`graph`]: the in-memory [`DependencyGraph`](graph::DependencyGraph)
//!   index with blocking queries, cycle detection
//!   ([`graph::cycles`]) and derived statistics ([`graph::analysis`])
//! - [`storage`]: the async edge store trait with in-memory and
//!   JSONL-file backends
//! - [`config`]: project configuration under `.gusset/`
//!
//! # Usage pattern
//!
//! A graph is a derived, rebuildable view: load it from the store at the
//! start of a logical operation, query it, write mutations back through
//! the store, and discard it.
//!
//! ```no_run
//! use gusset::domain::{Dependency, DependencyType, IssueId};
//! use gusset::storage::{StorageBackend, create_store};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let mut store = create_store(StorageBackend::InMemory).await?;
//!
//!     let dep = Dependency::new("api-12", "api-7", DependencyType::Blocks, None, "alice")?;
//!
//!     // Pre-insertion guard: refuse edges that would close a cycle.
//!     let graph = store.load_graph().await?;
//!     if graph.has_circular_dependency(&dep.source_id, &dep.target_id) {
//!         anyhow::bail!("edge would create a cycle");
//!     }
//!     store.create(dep).await?;
//!
//!     let graph = store.load_graph().await?;
//!     assert!(graph.is_blocked(&IssueId::new("api-7")));
//!     Ok(())
//! }
//! ```
//!
//! # Concurrency
//!
//! The engine is single-threaded, synchronous and in-memory: graph
//! queries are plain function calls with no suspension points or internal
//! locking. The store serializes individual calls but **not** sequences
//! of them - the cycle check followed by `create` above is two calls, and
//! an embedding server must put its own mutual-exclusion boundary around
//! such read-then-write sequences. The JSONL backend takes no
//! cross-process lock either; see [`storage`] for the full discussion.

#![forbid(unsafe_code)]

pub mod config;
pub mod domain;
pub mod error;
pub mod graph;
pub mod id_generation;
pub mod storage;
