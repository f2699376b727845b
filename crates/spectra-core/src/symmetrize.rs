//! Symmetrizer - directed adjacency to undirected connectivity.
//!
//! `C = (A + Aᵗ) / 2`. A one-way edge contributes 0.5 in both directions,
//! a reciprocal pair contributes 1.0.

use crate::error::{Result, SolverError};
use crate::sparse::SparseMatrix;
use crate::topology::DependencyGraph;
use crate::types::NodeIndexMap;

/// Directed adjacency matrix `A` over a fixed node index (`A_ij = 1` for `i -> j`).
#[derive(Debug, Clone)]
pub struct AdjacencyMatrix {
    matrix: SparseMatrix,
    index_id: u64,
}

impl AdjacencyMatrix {
    /// Build `A` for the nodes of `index`. Edges with an endpoint outside the
    /// index are ignored, so an index over a node subset yields the induced
    /// adjacency. Fails with `StaleIndex` if the graph changed since the index
    /// was taken.
    pub fn from_graph<G: DependencyGraph>(graph: &G, index: &NodeIndexMap) -> Result<Self> {
        index.ensure_current(graph.revision())?;
        let entries = graph.edges().into_iter().filter_map(|(from, to)| {
            Some((index.position(&from)?, index.position(&to)?, 1.0))
        });
        // Edges are unique in the store; collapse anyway so counts never exceed 1.
        let collapsed: Vec<_> = {
            let mut seen = std::collections::HashSet::new();
            entries.filter(|(r, c, _)| seen.insert((*r, *c))).collect()
        };
        Ok(Self {
            matrix: SparseMatrix::from_triplets(index.len(), collapsed)?,
            index_id: index.id(),
        })
    }

    /// Wrap an existing matrix (0/1 or count valued) built over `index`.
    pub fn from_matrix(matrix: SparseMatrix, index: &NodeIndexMap) -> Result<Self> {
        if matrix.dim() != index.len() {
            return Err(SolverError::DimensionMismatch {
                expected: index.len(),
                got: matrix.dim(),
            }
            .into());
        }
        Ok(Self {
            matrix,
            index_id: index.id(),
        })
    }

    pub fn matrix(&self) -> &SparseMatrix {
        &self.matrix
    }

    pub fn index_id(&self) -> u64 {
        self.index_id
    }

    /// `C = (A + Aᵗ) / 2`.
    pub fn symmetrize(&self) -> Result<ConnectivityMatrix> {
        let sum = self.matrix.add(&self.matrix.transpose())?;
        Ok(ConnectivityMatrix {
            matrix: sum.scale(0.5),
            index_id: self.index_id,
        })
    }
}

/// Symmetric connectivity matrix `C` over a fixed node index.
#[derive(Debug, Clone)]
pub struct ConnectivityMatrix {
    matrix: SparseMatrix,
    index_id: u64,
}

impl ConnectivityMatrix {
    /// Convenience: adjacency then symmetrize.
    pub fn from_graph<G: DependencyGraph>(graph: &G, index: &NodeIndexMap) -> Result<Self> {
        AdjacencyMatrix::from_graph(graph, index)?.symmetrize()
    }

    pub fn matrix(&self) -> &SparseMatrix {
        &self.matrix
    }

    pub fn index_id(&self) -> u64 {
        self.index_id
    }

    pub fn dim(&self) -> usize {
        self.matrix.dim()
    }

    /// Degree vector `d_i = Σ_j C_ij`.
    pub fn degrees(&self) -> Vec<f64> {
        self.matrix.row_sums()
    }

    /// Connectivity restricted to `members` (positions in this index).
    /// The result is addressed by position within `members`.
    pub fn restrict(&self, members: &[usize]) -> Result<ConnectivityMatrix> {
        Ok(ConnectivityMatrix {
            matrix: self.matrix.principal_submatrix(members)?,
            index_id: self.index_id,
        })
    }

    /// Weak components as lists of positions, each sorted, ordered by their
    /// lowest position.
    pub fn components(&self) -> Vec<Vec<usize>> {
        let n = self.dim();
        let mut sets = petgraph::unionfind::UnionFind::<usize>::new(n);
        for (r, c, _) in self.matrix.triplets() {
            sets.union(r, c);
        }
        let labels = sets.into_labeling();
        let mut by_root: std::collections::BTreeMap<usize, Vec<usize>> = Default::default();
        let mut order = Vec::new();
        for (i, root) in labels.into_iter().enumerate() {
            let entry = by_root.entry(root).or_insert_with(|| {
                order.push(root);
                Vec::new()
            });
            entry.push(i);
        }
        order
            .into_iter()
            .filter_map(|root| by_root.remove(&root))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(n: usize) -> NodeIndexMap {
        NodeIndexMap::new((0..n).map(|i| format!("n{}", i)).collect(), 0)
    }

    #[test]
    fn one_way_edge_becomes_half_in_both_directions() {
        let idx = index(2);
        let a = SparseMatrix::from_triplets(2, vec![(0, 1, 1.0)]).unwrap();
        let c = AdjacencyMatrix::from_matrix(a, &idx).unwrap().symmetrize().unwrap();
        assert_eq!(c.matrix().get(0, 1), 0.5);
        assert_eq!(c.matrix().get(1, 0), 0.5);
        assert_eq!(c.degrees(), vec![0.5, 0.5]);
        assert_eq!(c.index_id(), idx.id());
    }

    #[test]
    fn reciprocal_edges_sum_to_one() {
        let idx = index(2);
        let a = SparseMatrix::from_triplets(2, vec![(0, 1, 1.0), (1, 0, 1.0)]).unwrap();
        let c = AdjacencyMatrix::from_matrix(a, &idx).unwrap().symmetrize().unwrap();
        assert_eq!(c.matrix().get(0, 1), 1.0);
        assert!(c.matrix().is_symmetric(0.0));
    }

    #[test]
    fn wrong_sized_matrix_is_rejected() {
        let idx = index(3);
        let a = SparseMatrix::zeros(2);
        assert!(AdjacencyMatrix::from_matrix(a, &idx).is_err());
    }

    #[test]
    fn components_are_ordered_by_lowest_member() {
        let idx = index(5);
        let a = SparseMatrix::from_triplets(5, vec![(3, 1, 1.0), (0, 4, 1.0)]).unwrap();
        let c = AdjacencyMatrix::from_matrix(a, &idx).unwrap().symmetrize().unwrap();
        assert_eq!(c.components(), vec![vec![0, 4], vec![1, 3], vec![2]]);
    }
}
