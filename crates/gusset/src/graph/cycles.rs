//! Cycle detection over the active-edge subgraph.
//!
//! Two related operations, both defined only over active edges, both
//! treating `Blocks` and `Requires` edges identically as directed arcs
//! `source -> target`:
//!
//! - [`DependencyGraph::has_circular_dependency`] is a point check used as
//!   a pre-insertion guard: would adding `from -> to` close a cycle?
//! - [`DependencyGraph::find_circular_dependencies`] enumerates every
//!   cycle currently present.
//!
//! Neither operation is an error path. Both return plain values so callers
//! can use them as pre-flight checks without exception-driven control
//! flow, and neither mutates the graph.
//!
//! Both traversals are iterative with explicit stacks; recursion depth is
//! never a function of graph shape. Nodes and successor lists are iterated
//! in lexicographic order, so the output is reproducible regardless of the
//! order edges were inserted.

use std::collections::HashSet;

use super::DependencyGraph;
use crate::domain::IssueId;

impl DependencyGraph {
    /// Would adding an edge `from -> to` create a cycle?
    ///
    /// Equivalent to asking whether a path `to -> ... -> from` already
    /// exists over active edges. Runs a depth-first reachability search
    /// from `to` with a fresh visited set; O(V+E) per call, no caching
    /// across calls.
    ///
    /// A degenerate `from == to` edge is reported as a cycle: a self-loop
    /// closes on itself.
    pub fn has_circular_dependency(&self, from: &IssueId, to: &IssueId) -> bool {
        if from == to {
            return true;
        }

        let adjacency = self.active_adjacency();
        let mut visited: HashSet<&IssueId> = HashSet::new();
        let mut stack: Vec<&IssueId> = vec![to];

        while let Some(node) = stack.pop() {
            if node == from {
                return true;
            }
            if !visited.insert(node) {
                continue;
            }
            if let Some(successors) = adjacency.get(node) {
                for successor in successors {
                    if !visited.contains(successor) {
                        stack.push(successor);
                    }
                }
            }
        }
        false
    }

    /// Enumerate all cycles in the active-edge subgraph.
    ///
    /// One depth-first traversal is started per unvisited node, over the
    /// union of all sources and targets appearing in active edges; nodes
    /// fully explored once are never revisited, giving a single O(V+E)
    /// pass. A cycle is detected when a traversal edge targets a node on
    /// the current path, and extracted by slicing the path from that
    /// node's position to the end.
    ///
    /// Each returned sequence starts at the cycle's entry point; closing
    /// back to that first item is implied, not repeated. Callers rendering
    /// a cycle should re-append the first element to show closure.
    pub fn find_circular_dependencies(&self) -> Vec<Vec<IssueId>> {
        let adjacency = self.active_adjacency();
        let empty: Vec<IssueId> = Vec::new();

        let mut cycles: Vec<Vec<IssueId>> = Vec::new();
        let mut visited: HashSet<IssueId> = HashSet::new();

        for start in self.sorted_nodes() {
            if visited.contains(&start) {
                continue;
            }

            // Explicit DFS frames: (node, index of the next successor to
            // try). A frame entered with index 0 is being visited for the
            // first time; a frame popped with its successors exhausted is
            // fully explored.
            let mut frames: Vec<(IssueId, usize)> = vec![(start, 0)];
            let mut path: Vec<IssueId> = Vec::new();
            let mut on_stack: HashSet<IssueId> = HashSet::new();

            while let Some((node, next_child)) = frames.pop() {
                if next_child == 0 {
                    on_stack.insert(node.clone());
                    path.push(node.clone());
                }

                let successors = adjacency.get(&node).unwrap_or(&empty);
                if let Some(successor) = successors.get(next_child) {
                    frames.push((node.clone(), next_child + 1));

                    if on_stack.contains(successor) {
                        // Back edge: the cycle is the path slice from the
                        // repeated node to the current end.
                        if let Some(entry) = path.iter().position(|n| n == successor) {
                            cycles.push(path[entry..].to_vec());
                        }
                    } else if !visited.contains(successor) {
                        frames.push((successor.clone(), 0));
                    }
                } else {
                    visited.insert(node.clone());
                    on_stack.remove(&node);
                    path.pop();
                }
            }
        }

        cycles
    }
}
