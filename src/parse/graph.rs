//! petgraph-based directed graph of path references.
//!
//! One graph node per declared path; an edge `a → b` for every step in path
//! `a` that transfers control to an existing path `b`. Handlers contribute
//! no edges. References to paths that do not exist are left out; the
//! validator reports those separately.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use super::types::ProcessDefinition;

pub struct PathGraph {
    pub graph: DiGraph<String, ()>,
    pub node_indices: HashMap<String, NodeIndex>,
}

impl PathGraph {
    pub fn build(pd: &ProcessDefinition) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();

        for name in pd.paths.keys() {
            let idx = graph.add_node(name.clone());
            node_indices.insert(name.clone(), idx);
        }

        for (name, path) in &pd.paths {
            let source = node_indices[name];
            for node in &path.nodes {
                for target in node.step.path_refs() {
                    if let Some(&t) = node_indices.get(target) {
                        graph.add_edge(source, t, ());
                    }
                }
            }
        }

        PathGraph {
            graph,
            node_indices,
        }
    }

    /// Paths referenced from `path_name`, deduplicated, in name order.
    pub fn successors(&self, path_name: &str) -> Vec<&str> {
        self.neighbors(path_name, Direction::Outgoing)
    }

    /// Paths whose steps reference `path_name`, deduplicated, in name order.
    pub fn referenced_by(&self, path_name: &str) -> Vec<&str> {
        self.neighbors(path_name, Direction::Incoming)
    }

    pub fn incoming_count(&self, path_name: &str) -> usize {
        self.referenced_by(path_name).len()
    }

    /// Paths that neither `start` nor any path step refers to, sorted.
    pub fn unreferenced(&self, start: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .node_indices
            .keys()
            .map(String::as_str)
            .filter(|name| *name != start && self.incoming_count(name) == 0)
            .collect();
        names.sort_unstable();
        names
    }

    fn neighbors(&self, path_name: &str, direction: Direction) -> Vec<&str> {
        let Some(&idx) = self.node_indices.get(path_name) else {
            return vec![];
        };
        let mut names: Vec<&str> = self
            .graph
            .neighbors_directed(idx, direction)
            .map(|n| self.graph[n].as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}
