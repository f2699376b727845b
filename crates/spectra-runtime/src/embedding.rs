//! Spectral embedding: affinity eigenvectors to planar coordinates.
//!
//! The affinity `D^-1/2 L D^-1/2 + σI` has eigenvalue `σ` on the Laplacian
//! null space (one per connected component, plus every isolated node).
//! Those pairs carry no layout information and are skipped. The next two
//! eigenvectors, rescaled by `D^-1/2`, become the x and y coordinates.
//!
//! The trivial count is known before solving (one per weak component), so
//! `embed` asks the solver for at least that many pairs plus two.

use serde::Serialize;
use spectra_core::eigen::EigenSolver;
use spectra_core::error::{Result, SolverError};
use spectra_core::laplacian::{affinity_target, LaplacianBuilder};
use spectra_core::types::{EigenDecomposition, NodeIndexMap, Position};
use tracing::debug;

/// Default distance from `σ` under which an eigenvalue counts as trivial.
pub const DEFAULT_TRIVIAL_TOLERANCE: f64 = 1e-6;

/// Coordinates plus the eigenvalues they were taken from.
#[derive(Debug, Clone, Serialize)]
pub struct SpectralEmbedding {
    /// One position per node index entry.
    pub positions: Vec<Position>,
    /// All eigenvalues the solver returned, ascending.
    pub eigenvalues: Vec<f64>,
    /// Eigenvalues of the two pairs used for x and y.
    pub axes: [f64; 2],
    /// Pairs skipped as trivial.
    pub trivial: usize,
    /// Solver restart cycles.
    pub iterations: usize,
    /// Largest eigenpair residual.
    pub residual: f64,
    /// Inner conjugate-gradient iterations.
    pub linear_iterations: usize,
    /// Identity of the node index the positions are laid out over.
    pub index_id: u64,
}

impl SpectralEmbedding {
    /// Positions paired with node names. `index` must be the one the
    /// Laplacian was built over.
    pub fn named_positions<'i>(
        &self,
        index: &'i NodeIndexMap,
    ) -> Result<Vec<(&'i str, Position)>> {
        index.ensure_same(self.index_id)?;
        Ok(index
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.positions.iter().copied())
            .collect())
    }
}

/// Projects affinity eigenpairs into graph space.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddingProjector {
    sigma: f64,
    trivial_tolerance: f64,
}

impl EmbeddingProjector {
    pub fn new(sigma: f64) -> Self {
        Self {
            sigma,
            trivial_tolerance: DEFAULT_TRIVIAL_TOLERANCE,
        }
    }

    pub fn with_trivial_tolerance(mut self, tolerance: f64) -> Self {
        self.trivial_tolerance = tolerance;
        self
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Whether `eigenvalue` belongs to the Laplacian null space.
    pub fn is_trivial(&self, eigenvalue: f64) -> bool {
        (eigenvalue - self.sigma).abs() <= self.trivial_tolerance
    }

    /// Rescale the first two non-trivial eigenvectors by `D^-1/2` of `laplacian`.
    pub fn project(
        &self,
        decomposition: &EigenDecomposition,
        laplacian: &LaplacianBuilder,
    ) -> Result<SpectralEmbedding> {
        let inverse_sqrt_degree = laplacian.inverse_sqrt_degree_values();
        let n = inverse_sqrt_degree.len();
        let mut trivial = 0;
        let mut axes: Vec<(f64, &[f64])> = Vec::with_capacity(2);
        for (value, vector) in decomposition.pairs() {
            if vector.len() != n {
                return Err(SolverError::DimensionMismatch {
                    expected: n,
                    got: vector.len(),
                }
                .into());
            }
            if self.is_trivial(value) {
                trivial += 1;
            } else if axes.len() < 2 {
                axes.push((value, vector));
            }
        }
        if axes.len() < 2 {
            return Err(SolverError::InsufficientSpectrum {
                needed: 2,
                found: axes.len(),
            }
            .into());
        }

        let (x_value, x) = axes[0];
        let (y_value, y) = axes[1];
        let positions = inverse_sqrt_degree
            .iter()
            .enumerate()
            .map(|(i, &s)| Position::new(s * x[i], s * y[i]))
            .collect();
        debug!(trivial, x = x_value, y = y_value, "Projected spectral embedding");

        Ok(SpectralEmbedding {
            positions,
            eigenvalues: decomposition.values.clone(),
            axes: [x_value, y_value],
            trivial,
            iterations: decomposition.iterations,
            residual: decomposition.residual,
            linear_iterations: decomposition.linear_iterations,
            index_id: laplacian.index_id(),
        })
    }

    /// Pairs to solve for: `requested`, raised to cover every trivial pair
    /// plus two axes, capped at the dimension.
    pub fn eigenpairs_for(&self, laplacian: &LaplacianBuilder, requested: usize) -> usize {
        let trivial = laplacian.connectivity().components().len();
        requested.max(trivial + 2).min(laplacian.dim())
    }

    /// Build the affinity, solve for enough pairs and project.
    ///
    /// The solver shift defaults to just below `σ` unless `solver` sets one.
    pub fn embed(
        &self,
        laplacian: &LaplacianBuilder,
        solver: &EigenSolver,
        k: usize,
    ) -> Result<SpectralEmbedding> {
        let affinity = laplacian.affinity(self.sigma)?;
        let count = self.eigenpairs_for(laplacian, k);
        if count != k {
            debug!(requested = k, solving = count, "Adjusted eigenpair count");
        }
        let options = solver.options().clone().or_target(affinity_target(self.sigma));
        let decomposition = EigenSolver::new(options).smallest(&affinity, count)?;
        self.project(&decomposition, laplacian)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology_impl::PetDependencyGraph;
    use spectra_core::error::{GraphError, SpectraError};
    use spectra_core::sparse::SparseMatrix;
    use spectra_core::symmetrize::{AdjacencyMatrix, ConnectivityMatrix};
    use spectra_core::topology::DependencyGraph;

    fn decomposition(values: Vec<f64>, vectors: Vec<Vec<f64>>) -> EigenDecomposition {
        EigenDecomposition {
            values,
            vectors,
            iterations: 1,
            residual: 0.0,
            linear_iterations: 0,
        }
    }

    /// Weighted 4-node builder with `D^-1/2 = [2, 1, 1, 0]`.
    fn weighted_builder() -> (LaplacianBuilder, NodeIndexMap) {
        let index = NodeIndexMap::new(["a", "b", "c", "d"].map(String::from).to_vec(), 0);
        let a = SparseMatrix::from_triplets(
            4,
            vec![(0, 1, 0.25), (1, 0, 0.25), (1, 2, 0.75), (2, 1, 0.75), (2, 2, 0.25)],
        )
        .unwrap();
        let c = AdjacencyMatrix::from_matrix(a, &index).unwrap().symmetrize().unwrap();
        (LaplacianBuilder::new(c), index)
    }

    #[test]
    fn skips_trivial_pairs_and_rescales() {
        let d = decomposition(
            vec![0.5, 0.9, 1.2],
            vec![
                vec![0.5, 0.5, 0.5, 0.5],
                vec![0.5, 0.5, -0.5, -0.5],
                vec![0.5, -0.5, 0.5, -0.5],
            ],
        );
        let (builder, _) = weighted_builder();
        assert_eq!(builder.inverse_sqrt_degree_values(), vec![2.0, 1.0, 1.0, 0.0]);
        let embedding = EmbeddingProjector::new(0.5).project(&d, &builder).unwrap();
        assert_eq!(embedding.trivial, 1);
        assert_eq!(embedding.axes, [0.9, 1.2]);
        assert_eq!(embedding.positions[0], Position::new(1.0, 1.0));
        assert_eq!(embedding.positions[2], Position::new(-0.5, 0.5));
        // zero-degree node sits at the origin
        assert_eq!(embedding.positions[3], Position::origin());
    }

    #[test]
    fn too_few_nontrivial_pairs() {
        let g = PetDependencyGraph::from_edges([("a", "b")]);
        let index = g.node_index();
        let builder = LaplacianBuilder::new(ConnectivityMatrix::from_graph(&g, &index).unwrap());
        let d = decomposition(vec![0.5, 0.5, 1.0], vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0]]);
        let err = EmbeddingProjector::new(0.5).project(&d, &builder).unwrap_err();
        assert!(matches!(
            err,
            SpectraError::Solver(SolverError::InsufficientSpectrum { needed: 2, found: 1 })
        ));

        let short = decomposition(vec![0.9], vec![vec![1.0]]);
        assert!(matches!(
            EmbeddingProjector::new(0.5).project(&short, &builder).unwrap_err(),
            SpectraError::Solver(SolverError::DimensionMismatch { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn positions_only_pair_with_their_own_index() {
        let d = decomposition(
            vec![0.9, 1.2],
            vec![vec![0.5, 0.5, -0.5, -0.5], vec![0.5, -0.5, 0.5, -0.5]],
        );
        let (builder, index) = weighted_builder();
        let embedding = EmbeddingProjector::new(0.5).project(&d, &builder).unwrap();
        let named = embedding.named_positions(&index).unwrap();
        assert_eq!(named[0], ("a", Position::new(1.0, 1.0)));

        let other = NodeIndexMap::new(index.names().to_vec(), 0);
        assert!(matches!(
            embedding.named_positions(&other).unwrap_err(),
            SpectraError::Graph(GraphError::IndexMismatch { .. })
        ));
    }

    #[test]
    fn eigenpair_count_covers_every_component() {
        let mut g = PetDependencyGraph::from_edges([
            ("a", "b"), ("b", "c"), ("c", "a"),
            ("x", "y"), ("y", "z"), ("z", "x"),
        ]);
        g.add_node("lonely");
        let index = g.node_index();
        let builder = LaplacianBuilder::new(ConnectivityMatrix::from_graph(&g, &index).unwrap());
        let projector = EmbeddingProjector::new(0.5);
        // three components: three trivial pairs plus two axes
        assert_eq!(projector.eigenpairs_for(&builder, 3), 5);
        assert_eq!(projector.eigenpairs_for(&builder, 6), 6);
        assert_eq!(projector.eigenpairs_for(&builder, 20), 7);

        let embedding = projector.embed(&builder, &EigenSolver::default(), 3).unwrap();
        assert_eq!(embedding.trivial, 3);
        assert_eq!(embedding.positions[6], Position::origin());
    }

    #[test]
    fn embeds_a_cycle() {
        let g = PetDependencyGraph::from_edges([
            ("a", "b"), ("b", "c"), ("c", "d"), ("d", "e"), ("e", "f"), ("f", "a"),
        ]);
        let index = g.node_index();
        let builder = LaplacianBuilder::new(ConnectivityMatrix::from_graph(&g, &index).unwrap());
        let embedding = EmbeddingProjector::new(0.5)
            .embed(&builder, &EigenSolver::default(), 3)
            .unwrap();
        assert_eq!(embedding.positions.len(), 6);
        assert_eq!(embedding.trivial, 1);
        // 6-cycle: normalized Laplacian eigenvalue 1 - cos(pi/3) = 0.5, twice
        assert!((embedding.axes[0] - 1.0).abs() < 1e-6, "{:?}", embedding.axes);
        assert!((embedding.axes[1] - 1.0).abs() < 1e-6, "{:?}", embedding.axes);
        // every cycle node ends up the same distance from the origin
        let radii: Vec<f64> = embedding
            .positions
            .iter()
            .map(|p| p.distance_to(&Position::origin()))
            .collect();
        let expected = (1.0_f64 / 3.0).sqrt();
        for r in &radii {
            assert!((r - expected).abs() < 1e-6, "{:?}", radii);
        }
    }
}
