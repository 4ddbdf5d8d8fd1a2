//! Domain types for dependency tracking.
//!
//! This module contains the core domain types for the gusset dependency
//! engine: work-item and edge identifiers, the [`Dependency`] edge record
//! with its lifecycle state machine, and the filter type used by store
//! queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::id_generation::dependency_id;

/// Unique identifier for a work item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IssueId(pub String);

impl IssueId {
    /// Create a new issue ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for IssueId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for IssueId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a dependency edge.
///
/// Edge IDs are derived deterministically from the
/// `(source, type, target)` triple, so a given relationship always maps
/// to the same ID. See [`crate::id_generation::dependency_id`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DependencyId(pub String);

impl DependencyId {
    /// Create a new dependency ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DependencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DependencyId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DependencyId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Type of dependency relationship.
///
/// The two types are dual views of the same "X before Y" relation; they
/// differ only in which endpoint carries the obligation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyType {
    /// Source must complete before target can proceed
    Blocks,

    /// Source cannot complete until target completes
    Requires,
}

impl DependencyType {
    /// Canonical lowercase name, used in edge ID derivation
    pub fn as_str(self) -> &'static str {
        match self {
            DependencyType::Blocks => "blocks",
            DependencyType::Requires => "requires",
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a dependency edge.
///
/// Only `Active` edges participate in blocking and cycle computations;
/// `Resolved` and `Ignored` edges are retained for history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyStatus {
    /// Edge is in force
    Active,

    /// Obligation has been satisfied
    Resolved,

    /// Edge is disregarded without being satisfied
    Ignored,
}

impl DependencyStatus {
    /// Canonical lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            DependencyStatus::Active => "active",
            DependencyStatus::Resolved => "resolved",
            DependencyStatus::Ignored => "ignored",
        }
    }
}

impl fmt::Display for DependencyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A directed, typed, stateful edge between two work items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Stable identifier, derived from `(source, type, target)`
    pub id: DependencyId,

    /// Item the edge points from
    pub source_id: IssueId,

    /// Item the edge points to
    pub target_id: IssueId,

    /// Relationship kind
    #[serde(rename = "type")]
    pub dep_type: DependencyType,

    /// Lifecycle status
    pub status: DependencyStatus,

    /// Free-text note about the relationship
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Who recorded the edge
    pub created_by: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,

    /// When the edge left the active state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,

    /// Who resolved or ignored the edge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<String>,
}

impl Dependency {
    /// Create a new active dependency edge.
    ///
    /// The edge ID is derived from the `(source, type, target)` triple and
    /// both timestamps are set to now.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `source` equals `target` (self-loop)
    /// or any required field is empty.
    pub fn new(
        source_id: impl Into<IssueId>,
        target_id: impl Into<IssueId>,
        dep_type: DependencyType,
        description: Option<String>,
        created_by: impl Into<String>,
    ) -> Result<Self> {
        let source_id = source_id.into();
        let target_id = target_id.into();
        let created_by = created_by.into();

        if source_id.as_str().is_empty() {
            return Err(Error::Validation {
                field: "source_id",
                message: "source item ID must not be empty".to_string(),
            });
        }
        if target_id.as_str().is_empty() {
            return Err(Error::Validation {
                field: "target_id",
                message: "target item ID must not be empty".to_string(),
            });
        }
        if source_id == target_id {
            return Err(Error::Validation {
                field: "target_id",
                message: format!("dependency of {source_id} on itself is not allowed"),
            });
        }
        if created_by.is_empty() {
            return Err(Error::Validation {
                field: "created_by",
                message: "creator must not be empty".to_string(),
            });
        }

        let now = Utc::now();
        Ok(Self {
            id: dependency_id(&source_id, dep_type, &target_id),
            source_id,
            target_id,
            dep_type,
            status: DependencyStatus::Active,
            description,
            created_by,
            created_at: now,
            updated_at: now,
            resolved_at: None,
            resolved_by: None,
        })
    }

    /// Whether the edge currently participates in blocking and cycle
    /// computations.
    pub fn is_active(&self) -> bool {
        self.status == DependencyStatus::Active
    }

    /// Mark the edge resolved, stamping who and when.
    pub fn resolve(&mut self, by: impl Into<String>) {
        let now = Utc::now();
        self.status = DependencyStatus::Resolved;
        self.resolved_at = Some(now);
        self.resolved_by = Some(by.into());
        self.updated_at = now;
    }

    /// Mark the edge ignored, stamping who and when.
    ///
    /// The resolution fields record who closed the edge regardless of
    /// whether it was satisfied or disregarded.
    pub fn ignore(&mut self, by: impl Into<String>) {
        let now = Utc::now();
        self.status = DependencyStatus::Ignored;
        self.resolved_at = Some(now);
        self.resolved_by = Some(by.into());
        self.updated_at = now;
    }

    /// Return the edge to the active state, clearing resolution fields.
    ///
    /// Both `Resolved` and `Ignored` edges can be reactivated; calling this
    /// on an already-active edge only refreshes `updated_at`.
    pub fn reactivate(&mut self) {
        self.status = DependencyStatus::Active;
        self.resolved_at = None;
        self.resolved_by = None;
        self.updated_at = Utc::now();
    }

    /// Check every record invariant, identifying the offending field.
    ///
    /// Called before persistence so malformed records surface as validation
    /// failures rather than corrupt data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first field that violates
    /// an invariant.
    pub fn validate(&self) -> Result<()> {
        if self.id.as_str().is_empty() {
            return Err(Error::Validation {
                field: "id",
                message: "edge ID must not be empty".to_string(),
            });
        }
        if self.source_id.as_str().is_empty() {
            return Err(Error::Validation {
                field: "source_id",
                message: "source item ID must not be empty".to_string(),
            });
        }
        if self.target_id.as_str().is_empty() {
            return Err(Error::Validation {
                field: "target_id",
                message: "target item ID must not be empty".to_string(),
            });
        }
        if self.source_id == self.target_id {
            return Err(Error::Validation {
                field: "target_id",
                message: format!("dependency of {} on itself is not allowed", self.source_id),
            });
        }
        if self.created_by.is_empty() {
            return Err(Error::Validation {
                field: "created_by",
                message: "creator must not be empty".to_string(),
            });
        }
        // The ID is a pure function of the triple; a mismatch means the
        // record was edited by hand or corrupted.
        let expected = dependency_id(&self.source_id, self.dep_type, &self.target_id);
        if self.id != expected {
            return Err(Error::Validation {
                field: "id",
                message: format!(
                    "edge ID {} does not match its (source, type, target) triple",
                    self.id
                ),
            });
        }
        Ok(())
    }
}

/// Filter for querying dependency edges.
///
/// All fields are conjunctive; `None` means "no constraint". The creation
/// date range is inclusive on both ends.
#[derive(Debug, Clone, Default)]
pub struct DependencyFilter {
    /// Filter by source item
    pub source_id: Option<IssueId>,

    /// Filter by target item
    pub target_id: Option<IssueId>,

    /// Filter by relationship kind
    pub dep_type: Option<DependencyType>,

    /// Filter by lifecycle status
    pub status: Option<DependencyStatus>,

    /// Filter by creator
    pub created_by: Option<String>,

    /// Only edges created at or after this instant
    pub created_after: Option<DateTime<Utc>>,

    /// Only edges created at or before this instant
    pub created_before: Option<DateTime<Utc>>,

    /// Skip this many results after sorting
    pub offset: Option<usize>,

    /// Limit number of results
    pub limit: Option<usize>,
}

impl DependencyFilter {
    /// Whether the given edge satisfies every constraint in this filter.
    pub fn matches(&self, dep: &Dependency) -> bool {
        if let Some(source_id) = &self.source_id {
            if &dep.source_id != source_id {
                return false;
            }
        }
        if let Some(target_id) = &self.target_id {
            if &dep.target_id != target_id {
                return false;
            }
        }
        if let Some(dep_type) = self.dep_type {
            if dep.dep_type != dep_type {
                return false;
            }
        }
        if let Some(status) = self.status {
            if dep.status != status {
                return false;
            }
        }
        if let Some(created_by) = &self.created_by {
            if &dep.created_by != created_by {
                return false;
            }
        }
        if let Some(after) = self.created_after {
            if dep.created_at < after {
                return false;
            }
        }
        if let Some(before) = self.created_before {
            if dep.created_at > before {
                return false;
            }
        }
        true
    }
}
