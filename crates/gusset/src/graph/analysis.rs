//! Derived views and aggregate statistics over a dependency graph.
//!
//! Everything in this module is computed from the in-memory
//! [`DependencyGraph`]; nothing here mutates state. The result types are
//! serde-serializable so a report layer can render them directly. All item
//! sequences and rankings are deterministically ordered: degree descending
//! with a lexicographic ID tiebreak for rankings, lexicographic ID order
//! everywhere else.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use super::DependencyGraph;
use crate::domain::{Dependency, DependencyId, DependencyStatus, DependencyType, IssueId};

/// Default number of entries in the most-blocked/most-blocking rankings.
pub const DEFAULT_RANKING_SIZE: usize = 5;

/// Affected-item count at which impact is rated medium.
const MEDIUM_IMPACT_THRESHOLD: usize = 3;

/// Affected-item count at which impact is rated high.
const HIGH_IMPACT_THRESHOLD: usize = 6;

/// Affected-item count at which impact is rated critical.
const CRITICAL_IMPACT_THRESHOLD: usize = 10;

/// Blocking chains longer than this trigger a split recommendation.
const LONG_CHAIN_THRESHOLD: usize = 3;

/// Outcome of validating the active dependency set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the active edge set is acyclic
    pub is_valid: bool,

    /// Every cycle found, as returned by
    /// [`DependencyGraph::find_circular_dependencies`]
    pub circular_paths: Vec<Vec<IssueId>>,

    /// Every active edge participating in any discovered cycle, sorted by
    /// ID with duplicates removed
    pub conflicting_dependencies: Vec<Dependency>,

    /// Human-readable advisories, one per cycle
    pub warnings: Vec<String>,
}

/// An item together with its degree count in a ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRank {
    /// The ranked item
    pub issue_id: IssueId,

    /// Number of distinct items on the other side of the relation
    pub count: usize,
}

/// Aggregate statistics over a dependency set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyStats {
    /// Total number of edges, all statuses included
    pub total_dependencies: usize,

    /// Number of active edges
    pub active_dependencies: usize,

    /// Number of resolved edges
    pub resolved_dependencies: usize,

    /// Edge counts grouped by relationship kind
    pub by_type: BTreeMap<DependencyType, usize>,

    /// Edge counts grouped by lifecycle status
    pub by_status: BTreeMap<DependencyStatus, usize>,

    /// Distinct items appearing in at least one edge
    pub issues_with_dependencies: usize,

    /// `total_dependencies / issues_with_dependencies`, `0` when no item
    /// has edges
    pub average_dependencies_per_issue: f64,

    /// Items ranked by how many distinct items block them
    pub most_blocked_issues: Vec<IssueRank>,

    /// Items ranked by how many distinct items they block
    pub most_blocking_issues: Vec<IssueRank>,

    /// Edge counts grouped by creator
    pub by_creator: BTreeMap<String, usize>,

    /// Number of cycles in the active edge set
    pub circular_dependencies: usize,
}

/// Per-item blocking view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockingInfo {
    /// The item under inspection
    pub issue_id: IssueId,

    /// Whether anything must complete before this item can proceed
    pub is_blocked: bool,

    /// Items that must complete first, sorted
    pub blocked_by: Vec<IssueId>,

    /// Items waiting on this one, sorted
    pub blocking: Vec<IssueId>,
}

/// Coarse risk classification for impact analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Few or no items affected
    Low,

    /// A handful of items affected
    Medium,

    /// A significant portion of open work affected
    High,

    /// A large share of open work affected
    Critical,
}

impl RiskLevel {
    fn from_affected_count(count: usize) -> Self {
        if count >= CRITICAL_IMPACT_THRESHOLD {
            RiskLevel::Critical
        } else if count >= HIGH_IMPACT_THRESHOLD {
            RiskLevel::High
        } else if count >= MEDIUM_IMPACT_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Advisory impact analysis for a single work item.
///
/// This is derived, heuristic output for planning purposes; the risk
/// rating is monotonic in the affected-item count but carries no hard
/// invariant beyond that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactAnalysis {
    /// The item under inspection
    pub issue_id: IssueId,

    /// Items directly waiting on this one, sorted
    pub directly_blocked: Vec<IssueId>,

    /// Reachability closure of items waiting on this one, sorted
    pub transitively_blocked: Vec<IssueId>,

    /// A representative longest blocking chain, starting at the item
    pub critical_path: Vec<IssueId>,

    /// Coarse risk classification
    pub risk: RiskLevel,

    /// Free-text planning advisories
    pub recommendations: Vec<String>,
}

impl DependencyGraph {
    /// Validate the active edge set, reporting every cycle and every edge
    /// involved in one.
    pub fn validate_graph(&self) -> ValidationResult {
        let circular_paths = self.find_circular_dependencies();

        let mut conflicting: BTreeMap<DependencyId, Dependency> = BTreeMap::new();
        let mut warnings = Vec::with_capacity(circular_paths.len());

        for cycle in &circular_paths {
            // Adjacent pairs plus the implied closing pair back to the
            // entry point.
            for (index, node) in cycle.iter().enumerate() {
                let next = &cycle[(index + 1) % cycle.len()];
                if let Some(dep) = self.find_active_edge(node, next) {
                    conflicting.insert(dep.id.clone(), dep.clone());
                }
            }
            warnings.push(format!("circular dependency: {}", render_cycle(cycle)));
        }

        ValidationResult {
            is_valid: circular_paths.is_empty(),
            circular_paths,
            conflicting_dependencies: conflicting.into_values().collect(),
            warnings,
        }
    }

    /// Compute aggregate statistics over every edge in the graph.
    ///
    /// `ranking_size` bounds the most-blocked/most-blocking rankings
    /// (see [`DEFAULT_RANKING_SIZE`]).
    pub fn stats(&self, ranking_size: usize) -> DependencyStats {
        let mut by_type = BTreeMap::new();
        let mut by_status = BTreeMap::new();
        let mut by_creator = BTreeMap::new();
        let mut items = BTreeSet::new();

        for dep in self.iter() {
            *by_type.entry(dep.dep_type).or_insert(0) += 1;
            *by_status.entry(dep.status).or_insert(0) += 1;
            *by_creator.entry(dep.created_by.clone()).or_insert(0) += 1;
            items.insert(dep.source_id.clone());
            items.insert(dep.target_id.clone());
        }

        let total = self.len();
        let issues_with_dependencies = items.len();
        let average_dependencies_per_issue = average_per_issue(total, issues_with_dependencies);

        let most_blocked_issues = self.rank_by(ranking_size, Self::blocking_issues);
        let most_blocking_issues = self.rank_by(ranking_size, Self::blocked_issues);

        DependencyStats {
            total_dependencies: total,
            active_dependencies: by_status
                .get(&DependencyStatus::Active)
                .copied()
                .unwrap_or(0),
            resolved_dependencies: by_status
                .get(&DependencyStatus::Resolved)
                .copied()
                .unwrap_or(0),
            by_type,
            by_status,
            issues_with_dependencies,
            average_dependencies_per_issue,
            most_blocked_issues,
            most_blocking_issues,
            by_creator,
            circular_dependencies: self.find_circular_dependencies().len(),
        }
    }

    /// Rank items by the size of a per-item degree set, descending, with a
    /// lexicographic ID tiebreak. Items with zero degree are omitted.
    fn rank_by(
        &self,
        ranking_size: usize,
        degree: impl Fn(&Self, &IssueId) -> Vec<IssueId>,
    ) -> Vec<IssueRank> {
        let mut ranks: Vec<IssueRank> = self
            .sorted_nodes()
            .into_iter()
            .filter_map(|issue_id| {
                let count = degree(self, &issue_id).len();
                (count > 0).then_some(IssueRank { issue_id, count })
            })
            .collect();

        ranks.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.issue_id.cmp(&b.issue_id))
        });
        ranks.truncate(ranking_size);
        ranks
    }

    /// The blocking view for a single item.
    pub fn blocking_info(&self, item: &IssueId) -> BlockingInfo {
        let blocked_by = self.blocking_issues(item);
        BlockingInfo {
            issue_id: item.clone(),
            is_blocked: !blocked_by.is_empty(),
            blocked_by,
            blocking: self.blocked_issues(item),
        }
    }

    /// Estimate the downstream consequences of changing a single item.
    ///
    /// Walks the blocked-by closure to a fixpoint, extracts a
    /// representative longest blocking chain, and classifies the blast
    /// radius. Cycles in the graph are tolerated; each item is visited
    /// once.
    pub fn impact_analysis(&self, item: &IssueId) -> ImpactAnalysis {
        let directly_blocked = self.blocked_issues(item);

        // Breadth-first closure with parent tracking for path recovery.
        let mut depths: HashMap<IssueId, usize> = HashMap::new();
        let mut parents: HashMap<IssueId, IssueId> = HashMap::new();
        let mut queue: VecDeque<IssueId> = VecDeque::new();

        for blocked in &directly_blocked {
            depths.insert(blocked.clone(), 1);
            parents.insert(blocked.clone(), item.clone());
            queue.push_back(blocked.clone());
        }

        while let Some(current) = queue.pop_front() {
            let next_depth = depths.get(&current).copied().unwrap_or(0) + 1;
            for blocked in self.blocked_issues(&current) {
                if blocked == *item || depths.contains_key(&blocked) {
                    continue;
                }
                depths.insert(blocked.clone(), next_depth);
                parents.insert(blocked.clone(), current.clone());
                queue.push_back(blocked);
            }
        }

        let mut transitively_blocked: Vec<IssueId> = depths.keys().cloned().collect();
        transitively_blocked.sort();

        let critical_path = extract_chain(item, &depths, &parents);
        let risk = RiskLevel::from_affected_count(transitively_blocked.len());
        let recommendations =
            build_recommendations(item, transitively_blocked.len(), critical_path.len(), risk);

        ImpactAnalysis {
            issue_id: item.clone(),
            directly_blocked,
            transitively_blocked,
            critical_path,
            risk,
            recommendations,
        }
    }
}

/// `total / issues`, guarding the divide: an empty edge set has no
/// average.
#[allow(clippy::cast_precision_loss)]
fn average_per_issue(total: usize, issues: usize) -> f64 {
    if issues == 0 {
        0.0
    } else {
        total as f64 / issues as f64
    }
}

/// Render a cycle for display, re-appending the entry point to show
/// closure.
fn render_cycle(cycle: &[IssueId]) -> String {
    let mut names: Vec<&str> = cycle.iter().map(IssueId::as_str).collect();
    if let Some(first) = names.first().copied() {
        names.push(first);
    }
    names.join(" -> ")
}

/// Recover the chain from `item` to the deepest node discovered by the
/// closure walk. Ties on depth break toward the lexicographically smaller
/// ID so the result is reproducible.
fn extract_chain(
    item: &IssueId,
    depths: &HashMap<IssueId, usize>,
    parents: &HashMap<IssueId, IssueId>,
) -> Vec<IssueId> {
    let deepest = depths
        .iter()
        .max_by(|(a_id, a_depth), (b_id, b_depth)| {
            a_depth.cmp(b_depth).then_with(|| b_id.cmp(a_id))
        })
        .map(|(id, _)| id.clone());

    let Some(mut current) = deepest else {
        return vec![item.clone()];
    };

    let mut chain = vec![current.clone()];
    while let Some(parent) = parents.get(&current) {
        chain.push(parent.clone());
        if parent == item {
            break;
        }
        current = parent.clone();
    }
    chain.reverse();
    chain
}

fn build_recommendations(
    item: &IssueId,
    affected: usize,
    chain_length: usize,
    risk: RiskLevel,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if affected == 0 {
        recommendations.push(format!(
            "no work items are waiting on {item}; it can be rescheduled freely"
        ));
        return recommendations;
    }

    recommendations.push(format!(
        "{affected} item(s) are waiting on {item}, directly or transitively; prioritize its completion"
    ));
    if chain_length > LONG_CHAIN_THRESHOLD {
        recommendations.push(format!(
            "blocking chain of {chain_length} items runs through {item}; consider splitting it or resolving intermediate dependencies"
        ));
    }
    if risk >= RiskLevel::High {
        recommendations.push(format!(
            "downstream impact is {risk:?}; avoid adding new dependencies onto {item}",
        ));
    }

    recommendations
}
