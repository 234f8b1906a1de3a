//! Directed causal graph over event and pattern identifiers
//!
//! Nodes are string identifiers; an edge `X -> Y` means X causally
//! precedes or contributes to Y. The graph grows monotonically as
//! explanations reference causal chains and is never pruned within a run.
//! Cycles are allowed; every traversal tracks visited nodes so it
//! terminates regardless.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// A directed graph of causal relations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CausalGraph {
    // Every known node has an entry; successor lists keep registration
    // order and are duplicate-free.
    adjacency: HashMap<String, Vec<String>>,
}

impl CausalGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a node exists
    pub fn add_node(&mut self, id: impl Into<String>) {
        self.adjacency.entry(id.into()).or_default();
    }

    /// Ensure a directed edge exists
    ///
    /// Idempotent: re-adding an existing edge is a no-op. Both endpoints
    /// are created as nodes if absent.
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) {
        let from = from.into();
        let to = to.into();
        self.add_node(to.clone());
        let successors = self.adjacency.entry(from).or_default();
        if !successors.contains(&to) {
            successors.push(to);
        }
    }

    /// Ensure every identifier in the chain exists and each consecutive
    /// pair is connected
    pub fn add_chain(&mut self, chain: &[String]) {
        if let [only] = chain {
            self.add_node(only.clone());
        }
        for pair in chain.windows(2) {
            self.add_edge(pair[0].clone(), pair[1].clone());
        }
    }

    /// Whether the node is known
    pub fn contains(&self, id: &str) -> bool {
        self.adjacency.contains_key(id)
    }

    /// Successors of a node in registration order
    pub fn successors(&self, id: &str) -> &[String] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of directed edges
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// Follow the primary outgoing edge from `start` until the path ends
    /// or revisits a node
    ///
    /// "Primary" means the first unvisited successor in registration
    /// order, so the walk is deterministic. Returns the identifiers in
    /// visit order, starting with `start`; empty when `start` is unknown.
    pub fn walk_chain(&self, start: &str) -> Vec<String> {
        let mut visited = HashSet::new();
        self.walk_from(start, &mut visited)
    }

    /// Chains competing with the primary walk out of `start`
    ///
    /// One chain per non-primary outgoing edge of `start`, each walked the
    /// same way with `start` already marked visited.
    pub fn alternative_chains(&self, start: &str) -> Vec<Vec<String>> {
        self.successors(start)
            .iter()
            .skip(1)
            .map(|next| {
                let mut visited = HashSet::new();
                visited.insert(start.to_string());
                let mut chain = vec![start.to_string()];
                chain.extend(self.walk_from(next, &mut visited));
                chain
            })
            .collect()
    }

    /// All nodes reachable from `start`, in breadth-first order
    pub fn reachable_from(&self, start: &str) -> Vec<String> {
        if !self.contains(start) {
            return Vec::new();
        }
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::from([start.to_string()]);
        while let Some(node) = queue.pop_front() {
            if !visited.insert(node.clone()) {
                continue;
            }
            for next in self.successors(&node) {
                if !visited.contains(next) {
                    queue.push_back(next.clone());
                }
            }
            order.push(node);
        }
        order
    }

    fn walk_from(&self, start: &str, visited: &mut HashSet<String>) -> Vec<String> {
        let mut chain = Vec::new();
        if !self.contains(start) {
            return chain;
        }
        let mut current = start.to_string();
        while visited.insert(current.clone()) {
            chain.push(current.clone());
            match self.successors(&current).iter().find(|n| !visited.contains(*n)) {
                Some(next) => current = next.clone(),
                None => break,
            }
        }
        chain
    }
}
