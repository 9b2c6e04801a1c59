use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::variable::{Variable, VariableId, VariableRegistry};

/// Directed edge `parent -> child`.
///
/// Two edges occupy the same slot when they join the same unordered pair,
/// but the direction decides which variable gains the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub parent: VariableId,
    pub child: VariableId,
}

impl Edge {
    pub fn new(parent: VariableId, child: VariableId) -> Self {
        Edge { parent, child }
    }

    /// True when this edge joins `a` and `b` in either direction.
    pub fn connects(&self, a: VariableId, b: VariableId) -> bool {
        (self.parent == a && self.child == b) || (self.parent == b && self.child == a)
    }

    pub fn reversed(&self) -> Edge {
        Edge::new(self.child, self.parent)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.parent, self.child)
    }
}

/// A structure snapshot: the variables plus the directed edges between them.
///
/// Variables are stored in an arena and edges refer to them by id, so
/// `clone()` yields a fully independent copy that can be mutated
/// speculatively without touching the original.
///
/// Invariant: `edges` contains `p -> c` exactly when `p` is in the parent
/// list of `c`. Acyclicity is not enforced on mutation; callers check
/// `is_acyclic` afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    variables: VariableRegistry,
    edges: Vec<Edge>,
}

impl Network {
    /// Wraps a registry, deriving the edge set from any existing parent lists.
    pub fn new(variables: VariableRegistry) -> Self {
        let edges = variables
            .iter()
            .flat_map(|v| v.parents().iter().map(move |p| Edge::new(*p, v.id())))
            .collect();
        Network { variables, edges }
    }

    /// Same variables, no edges.
    pub fn without_edges(&self) -> Self {
        let mut empty = self.clone();
        for edge in self.edges.clone() {
            empty.remove_edge(&edge);
        }
        empty
    }

    pub fn variables(&self) -> &VariableRegistry {
        &self.variables
    }

    pub fn variable(&self, id: VariableId) -> &Variable {
        self.variables.get(id)
    }

    pub fn parents_of(&self, id: VariableId) -> &[VariableId] {
        self.variables.get(id).parents()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// True if any edge joins `a` and `b`, whatever its direction.
    pub fn is_connected(&self, a: VariableId, b: VariableId) -> bool {
        self.edges.iter().any(|e| e.connects(a, b))
    }

    pub fn contains_edge(&self, edge: &Edge) -> bool {
        self.edges.contains(edge)
    }

    /// Adds `parent -> child`.
    ///
    /// Returns false without mutating anything if `parent == child` or if an
    /// edge already joins the pair in either direction.
    pub fn add_edge(&mut self, parent: VariableId, child: VariableId) -> bool {
        if parent == child {
            trace!("add_edge - rejected self edge on {}", parent);
            return false;
        }
        if self.is_connected(parent, child) {
            trace!("add_edge - pair {} / {} already connected", parent, child);
            return false;
        }
        self.edges.push(Edge::new(parent, child));
        self.variables.get_mut(child).add_parent(parent);
        true
    }

    /// Removes `edge` if present. Returns whether anything changed.
    pub fn remove_edge(&mut self, edge: &Edge) -> bool {
        let Some(position) = self.edges.iter().position(|e| e == edge) else {
            return false;
        };
        self.edges.remove(position);
        self.variables.get_mut(edge.child).remove_parent(edge.parent);
        true
    }

    /// Replaces `edge` with its reverse.
    ///
    /// Returns false if `edge` was absent. If the reversed edge cannot be
    /// inserted the network is left with the edge removed.
    pub fn reverse_edge(&mut self, edge: &Edge) -> bool {
        if !self.remove_edge(edge) {
            return false;
        }
        self.add_edge(edge.child, edge.parent)
    }

    /// Checks that no variable is its own ancestor.
    ///
    /// Walks each variable's ancestor closure through parent lists. The
    /// per-walk visited set keeps shared ancestors from being expanded twice
    /// and guarantees termination even when a cycle exists upstream.
    pub fn is_acyclic(&self) -> bool {
        for start in self.variables.ids() {
            let mut visited = HashSet::new();
            let mut stack: Vec<VariableId> = self.parents_of(start).to_vec();
            while let Some(current) = stack.pop() {
                if current == start {
                    trace!("is_acyclic - {} is its own ancestor", start);
                    return false;
                }
                if visited.insert(current) {
                    stack.extend_from_slice(self.parents_of(current));
                }
            }
        }
        true
    }

    /// Number of free Bernoulli parameters: one per parent assignment per variable.
    pub fn parameter_count(&self) -> usize {
        self.variables
            .iter()
            .map(|v| 1usize << v.parents().len())
            .sum()
    }

    /// Formats an edge with variable names instead of ids.
    pub fn describe_edge(&self, edge: &Edge) -> String {
        format!(
            "{} -> {}",
            self.variables.name(edge.parent),
            self.variables.name(edge.child)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network(names: &[&str]) -> Network {
        Network::new(VariableRegistry::from_names(names.iter().copied()).unwrap())
    }

    #[test]
    fn test_add_edge_mirrors_parent_list() {
        let mut net = network(&["A", "B"]);
        let (a, b) = (VariableId(0), VariableId(1));
        assert!(net.add_edge(a, b));
        assert_eq!(net.edges(), &[Edge::new(a, b)]);
        assert_eq!(net.parents_of(b), &[a]);
        assert!(net.parents_of(a).is_empty());
    }

    #[test]
    fn test_duplicate_pair_rejected_in_both_directions() {
        let mut net = network(&["A", "B"]);
        let (a, b) = (VariableId(0), VariableId(1));
        assert!(net.add_edge(a, b));
        assert!(!net.add_edge(a, b));
        assert!(!net.add_edge(b, a));
        assert_eq!(net.edge_count(), 1);
        assert!(net.parents_of(a).is_empty());
    }

    #[test]
    fn test_self_edge_rejected() {
        let mut net = network(&["A"]);
        assert!(!net.add_edge(VariableId(0), VariableId(0)));
        assert_eq!(net.edge_count(), 0);
    }

    #[test]
    fn test_remove_edge() {
        let mut net = network(&["A", "B"]);
        let (a, b) = (VariableId(0), VariableId(1));
        net.add_edge(a, b);
        assert!(!net.remove_edge(&Edge::new(b, a)));
        assert!(net.remove_edge(&Edge::new(a, b)));
        assert_eq!(net.edge_count(), 0);
        assert!(net.parents_of(b).is_empty());
        assert!(!net.remove_edge(&Edge::new(a, b)));
    }

    #[test]
    fn test_reverse_is_its_own_inverse() {
        let mut net = network(&["A", "B"]);
        let (a, b) = (VariableId(0), VariableId(1));
        net.add_edge(a, b);
        let original = net.clone();

        assert!(net.reverse_edge(&Edge::new(a, b)));
        assert_eq!(net.edges(), &[Edge::new(b, a)]);
        assert_eq!(net.parents_of(a), &[b]);
        assert!(net.parents_of(b).is_empty());

        assert!(net.reverse_edge(&Edge::new(b, a)));
        assert_eq!(net, original);
    }

    #[test]
    fn test_reverse_missing_edge_is_noop() {
        let mut net = network(&["A", "B"]);
        assert!(!net.reverse_edge(&Edge::new(VariableId(0), VariableId(1))));
        assert_eq!(net.edge_count(), 0);
    }

    #[test]
    fn test_acyclic_for_empty_and_tree() {
        let mut net = network(&["A", "B", "C", "D"]);
        assert!(net.is_acyclic());
        net.add_edge(VariableId(0), VariableId(1));
        net.add_edge(VariableId(0), VariableId(2));
        net.add_edge(VariableId(2), VariableId(3));
        assert!(net.is_acyclic());
    }

    #[test]
    fn test_three_cycle_detected() {
        let mut net = network(&["A", "B", "C"]);
        let (a, b, c) = (VariableId(0), VariableId(1), VariableId(2));
        assert!(net.add_edge(a, b));
        assert!(net.add_edge(b, c));
        assert!(net.is_acyclic());
        assert!(net.add_edge(c, a));
        assert!(!net.is_acyclic());
    }

    #[test]
    fn test_diamond_with_shared_ancestor_is_acyclic() {
        let mut net = network(&["A", "B", "C", "D"]);
        let ids: Vec<_> = (0..4).map(VariableId).collect();
        net.add_edge(ids[0], ids[1]);
        net.add_edge(ids[0], ids[2]);
        net.add_edge(ids[1], ids[3]);
        net.add_edge(ids[2], ids[3]);
        assert!(net.is_acyclic());
    }

    #[test]
    fn test_upstream_cycle_terminates() {
        // D hangs below the A-B-C cycle; walking D's ancestors must stop.
        let mut net = network(&["D", "A", "B", "C"]);
        let ids: Vec<_> = (0..4).map(VariableId).collect();
        net.add_edge(ids[1], ids[0]);
        net.add_edge(ids[1], ids[2]);
        net.add_edge(ids[2], ids[3]);
        net.add_edge(ids[3], ids[1]);
        assert!(!net.is_acyclic());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut net = network(&["A", "B"]);
        let copy = net.clone();
        net.add_edge(VariableId(0), VariableId(1));
        assert_eq!(copy.edge_count(), 0);
        assert!(copy.parents_of(VariableId(1)).is_empty());
    }

    #[test]
    fn test_without_edges_and_parameter_count() {
        let mut net = network(&["A", "B", "C"]);
        net.add_edge(VariableId(0), VariableId(2));
        net.add_edge(VariableId(1), VariableId(2));
        assert_eq!(net.parameter_count(), 1 + 1 + 4);

        let empty = net.without_edges();
        assert_eq!(empty.edge_count(), 0);
        assert_eq!(empty.parameter_count(), 3);
        assert_eq!(empty.variable_count(), 3);
    }
}
