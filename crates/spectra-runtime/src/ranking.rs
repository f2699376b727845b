//! In-degree ranking.
//!
//! The ranking is descending by in-degree with ties broken by insertion
//! order, so top-N selection is reproducible for a given edge list.

use spectra_core::error::Result;
use spectra_core::topology::DependencyGraph;
use spectra_core::types::RankedNode;

/// Ranks the nodes of a graph by how many dependents they have.
pub struct DegreeRanker<'g, G: DependencyGraph> {
    graph: &'g G,
}

impl<'g, G: DependencyGraph> DegreeRanker<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        Self { graph }
    }

    /// Count of edges terminating at `name`.
    pub fn in_degree(&self, name: &str) -> Result<usize> {
        self.graph.in_degree(name)
    }

    /// Every node, descending by in-degree, ties in insertion order.
    pub fn rank_by_in_degree(&self) -> Vec<RankedNode> {
        let mut ranked: Vec<RankedNode> = self
            .graph
            .node_names()
            .into_iter()
            .filter_map(|name| {
                let in_degree = self.graph.in_degree(&name).ok()?;
                Some(RankedNode { name, in_degree })
            })
            .collect();
        // sort_by is stable: equal degrees keep insertion order
        ranked.sort_by(|a, b| b.in_degree.cmp(&a.in_degree));
        ranked
    }

    /// Names of the first `n` ranked nodes (all of them if fewer exist).
    pub fn top_n(&self, n: usize) -> Vec<String> {
        self.rank_by_in_degree()
            .into_iter()
            .take(n)
            .map(|r| r.name)
            .collect()
    }
}
