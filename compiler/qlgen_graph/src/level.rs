//! Topological leveling.

use crate::errors::CycleError;
use crate::graph::{DependencyGraph, NodeId};

/// Nodes whose dependencies all sit in earlier levels, sorted by import
/// path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Level {
    nodes: Vec<NodeId>,
}

impl Level {
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn import_paths<'g>(&self, graph: &'g DependencyGraph) -> Vec<&'g str> {
        self.nodes
            .iter()
            .map(|&id| graph.node(id).import_path.as_str())
            .collect()
    }
}

impl DependencyGraph {
    /// Partition the nodes into levels with Kahn's algorithm, taking every
    /// ready node at once.
    ///
    /// Only edges to other nodes count. Nodes left over when no node is
    /// ready form a cycle and nothing is scheduled.
    pub fn levelize(&self) -> Result<Vec<Level>, CycleError> {
        let count = self.len();
        let mut depcount = vec![0usize; count];
        let mut dependents: Vec<Vec<NodeId>> = vec![Vec::new(); count];
        for id in self.ids() {
            for dep in self.node_deps(id) {
                depcount[id.index()] += 1;
                dependents[dep.index()].push(id);
            }
        }

        let mut ready: Vec<NodeId> = self.ids().filter(|id| depcount[id.index()] == 0).collect();
        let mut scheduled = 0;
        let mut levels = Vec::new();
        while !ready.is_empty() {
            ready.sort_by(|a, b| self.node(*a).import_path.cmp(&self.node(*b).import_path));
            let mut next = Vec::new();
            for &id in &ready {
                for &dependent in &dependents[id.index()] {
                    depcount[dependent.index()] -= 1;
                    if depcount[dependent.index()] == 0 {
                        next.push(dependent);
                    }
                }
            }
            scheduled += ready.len();
            levels.push(Level { nodes: ready });
            ready = next;
        }

        if scheduled < count {
            let mut members: Vec<String> = self
                .ids()
                .filter(|id| depcount[id.index()] > 0)
                .map(|id| self.node(id).import_path.clone())
                .collect();
            members.sort();
            return Err(CycleError { members });
        }

        tracing::debug!(levels = levels.len(), nodes = count, "levelized graph");
        Ok(levels)
    }
}
