//! Topology - the directed dependency graph.
//!
//! Edges point from a dependent to its dependency. Duplicate edges collapse
//! to a single edge of weight 1. Every mutation bumps the revision so that
//! node indices and matrices derived earlier can be recognized as stale.

use crate::error::Result;
use crate::types::NodeIndexMap;

/// Storage contract for the graph the spectral pipeline reads.
///
/// This is a trait rather than a concrete type so that different
/// backends can sit under the same pipeline.
pub trait DependencyGraph {
    /// Insert a node if absent. Returns true when the node is new.
    fn add_node(&mut self, name: &str) -> bool;

    /// Insert `from -> to`, creating missing nodes (`from` first).
    /// Returns true when the edge is new; re-adding an edge is a no-op.
    fn add_edge(&mut self, from: &str, to: &str) -> bool;

    /// Remove a node and all incident edges, returning how many edges went
    /// with it. An absent name is reported as `GraphError::NodeNotFound` and
    /// the graph is left untouched.
    fn remove_node(&mut self, name: &str) -> Result<usize>;

    /// New graph containing only `names` and the edges between them.
    fn induced_subgraph(&self, names: &[&str]) -> Result<Self>
    where
        Self: Sized;

    /// Whether a node with this name exists.
    fn contains(&self, name: &str) -> bool;

    /// Node names in insertion order.
    fn node_names(&self) -> Vec<String>;

    /// All edges as `(from, to)` name pairs.
    fn edges(&self) -> Vec<(String, String)>;

    /// Number of edges terminating at `name`.
    fn in_degree(&self, name: &str) -> Result<usize>;

    /// Number of nodes.
    fn node_count(&self) -> usize;

    /// Number of edges.
    fn edge_count(&self) -> usize;

    /// Monotonic mutation counter.
    fn revision(&self) -> u64;

    /// Number of weakly connected components.
    fn connected_components(&self) -> usize;

    /// Fresh node index over every node, in insertion order.
    fn node_index(&self) -> NodeIndexMap {
        NodeIndexMap::new(self.node_names(), self.revision())
    }
}
