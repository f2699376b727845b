//! Concrete implementation of the DependencyGraph trait using petgraph.
//!
//! The dependency graph is an owned arena: petgraph's `StableDiGraph` keeps
//! node indices valid across removals, a HashMap resolves names to indices,
//! and every node records its insertion sequence so rankings can break ties
//! by insertion order even after slots are reused.

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::unionfind::UnionFind;
use petgraph::visit::{EdgeRef, NodeIndexable};
use petgraph::Direction;
use spectra_core::error::{Result, SpectraError};
use spectra_core::topology::DependencyGraph;
use std::collections::{HashMap, HashSet};

/// Payload stored on each graph node.
#[derive(Debug, Clone)]
struct NodeData {
    name: String,
    sequence: u64,
}

/// Petgraph-backed implementation of the dependency graph.
#[derive(Debug, Clone)]
pub struct PetDependencyGraph {
    graph: StableDiGraph<NodeData, ()>,
    /// Map from node name to petgraph's internal index.
    node_index: HashMap<String, NodeIndex>,
    next_sequence: u64,
    revision: u64,
}

impl PetDependencyGraph {
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::default(),
            node_index: HashMap::new(),
            next_sequence: 0,
            revision: 0,
        }
    }

    /// Build a graph from `(from, to)` pairs.
    pub fn from_edges<'a, I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut graph = Self::new();
        for (from, to) in edges {
            graph.add_edge(from, to);
        }
        graph
    }

    /// Names of the nodes `name` points to (its dependencies).
    pub fn dependencies(&self, name: &str) -> Result<Vec<String>> {
        let idx = self.lookup(name)?;
        Ok(self.neighbor_names(idx, Direction::Outgoing))
    }

    /// Names of the nodes pointing to `name` (its dependents).
    pub fn dependents(&self, name: &str) -> Result<Vec<String>> {
        let idx = self.lookup(name)?;
        Ok(self.neighbor_names(idx, Direction::Incoming))
    }

    fn neighbor_names(&self, idx: NodeIndex, direction: Direction) -> Vec<String> {
        let mut neighbors: Vec<&NodeData> = self
            .graph
            .neighbors_directed(idx, direction)
            .map(|n| &self.graph[n])
            .collect();
        neighbors.sort_by_key(|d| d.sequence);
        neighbors.into_iter().map(|d| d.name.clone()).collect()
    }

    fn lookup(&self, name: &str) -> Result<NodeIndex> {
        self.node_index
            .get(name)
            .copied()
            .ok_or_else(|| SpectraError::node_not_found(name))
    }

    fn ensure_node(&mut self, name: &str) -> (NodeIndex, bool) {
        if let Some(&idx) = self.node_index.get(name) {
            return (idx, false);
        }
        let idx = self.graph.add_node(NodeData {
            name: name.to_string(),
            sequence: self.next_sequence,
        });
        self.next_sequence += 1;
        self.node_index.insert(name.to_string(), idx);
        self.revision += 1;
        (idx, true)
    }

    /// Node indices in insertion order.
    fn ordered_indices(&self) -> Vec<NodeIndex> {
        let mut indices: Vec<NodeIndex> = self.graph.node_indices().collect();
        indices.sort_by_key(|&idx| self.graph[idx].sequence);
        indices
    }
}

impl Default for PetDependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyGraph for PetDependencyGraph {
    fn add_node(&mut self, name: &str) -> bool {
        self.ensure_node(name).1
    }

    fn add_edge(&mut self, from: &str, to: &str) -> bool {
        let (from_idx, _) = self.ensure_node(from);
        let (to_idx, _) = self.ensure_node(to);

        // Duplicates collapse to a single edge
        if self.graph.find_edge(from_idx, to_idx).is_some() {
            return false;
        }
        self.graph.add_edge(from_idx, to_idx, ());
        self.revision += 1;
        true
    }

    fn remove_node(&mut self, name: &str) -> Result<usize> {
        let idx = self.lookup(name)?;
        let incident = self.graph.edges_directed(idx, Direction::Outgoing).count()
            + self
                .graph
                .edges_directed(idx, Direction::Incoming)
                .filter(|e| e.source() != e.target())
                .count();
        self.graph.remove_node(idx);
        self.node_index.remove(name);
        self.revision += 1;
        Ok(incident)
    }

    fn induced_subgraph(&self, names: &[&str]) -> Result<Self> {
        let mut keep = HashSet::with_capacity(names.len());
        for name in names {
            keep.insert(self.lookup(name)?);
        }

        let mut sub = PetDependencyGraph::new();
        for idx in self.ordered_indices() {
            if keep.contains(&idx) {
                sub.add_node(&self.graph[idx].name);
            }
        }
        for edge in self.graph.edge_indices() {
            if let Some((a, b)) = self.graph.edge_endpoints(edge) {
                if keep.contains(&a) && keep.contains(&b) {
                    sub.add_edge(&self.graph[a].name, &self.graph[b].name);
                }
            }
        }
        Ok(sub)
    }

    fn contains(&self, name: &str) -> bool {
        self.node_index.contains_key(name)
    }

    fn node_names(&self) -> Vec<String> {
        self.ordered_indices()
            .into_iter()
            .map(|idx| self.graph[idx].name.clone())
            .collect()
    }

    fn edges(&self) -> Vec<(String, String)> {
        self.graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(a, b)| (self.graph[a].name.clone(), self.graph[b].name.clone()))
            .collect()
    }

    fn in_degree(&self, name: &str) -> Result<usize> {
        let idx = self.lookup(name)?;
        Ok(self.graph.edges_directed(idx, Direction::Incoming).count())
    }

    fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn connected_components(&self) -> usize {
        let mut sets = UnionFind::<usize>::new(self.graph.node_bound());
        for edge in self.graph.edge_indices() {
            if let Some((a, b)) = self.graph.edge_endpoints(edge) {
                sets.union(a.index(), b.index());
            }
        }
        let roots: HashSet<usize> = self
            .graph
            .node_indices()
            .map(|idx| sets.find(idx.index()))
            .collect();
        roots.len()
    }
}
