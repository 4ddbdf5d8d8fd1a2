//! Error types for gusset operations.

use std::fmt;
use std::io;
use thiserror::Error;

use crate::domain::{DependencyId, DependencyType, IssueId};

/// Coarse classification of a store failure, used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// Failure while reading persisted data
    Read,

    /// Failure while writing persisted data
    Write,

    /// Failure while serializing or deserializing records
    Marshal,
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreErrorKind::Read => "read",
            StoreErrorKind::Write => "write",
            StoreErrorKind::Marshal => "marshal",
        };
        write!(f, "{name}")
    }
}

/// The error type for gusset operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A field failed validation. Raised at construction or mutation time,
    /// before any store write.
    #[error("validation failed for {field}: {message}")]
    Validation {
        /// The offending field
        field: &'static str,
        /// What was wrong with it
        message: String,
    },

    /// Dependency edge not found.
    #[error("dependency not found: {0}")]
    DependencyNotFound(DependencyId),

    /// An edge with the same `(source, type, target)` triple already exists.
    #[error("dependency already exists: {source} -[{dep_type}]-> {target}", source = .source_id, target = .target_id)]
    DuplicateDependency {
        /// Source item of the existing edge
        source_id: IssueId,
        /// Target item of the existing edge
        target_id: IssueId,
        /// Relationship kind of the existing edge
        dep_type: DependencyType,
    },

    /// A store operation failed, wrapped with the operation name and a
    /// coarse kind tag.
    #[error("store operation {op} failed ({kind}): {message}")]
    Store {
        /// The store operation that failed (e.g. "save", "load")
        op: &'static str,
        /// Coarse failure classification
        kind: StoreErrorKind,
        /// Backend-specific detail
        message: String,
    },

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A specialized Result type for gusset operations.
pub type Result<T> = std::result::Result<T, Error>;
