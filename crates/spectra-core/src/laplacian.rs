//! Laplacian builder - degree vector, Laplacian and shifted affinity.
//!
//! For connectivity `C` with degrees `d`:
//!
//! - `L = diag(d) - C` (symmetric, PSD, rows sum to zero)
//! - `D^-1/2` with `0` in place of `1/sqrt(0)` for isolated nodes
//! - `affinity(σ) = D^-1/2 · L · D^-1/2 + σI`
//!
//! Every affinity eigenvalue is at least `σ`, so a shift-invert solve aims
//! just below it (`affinity_target`): `M - τI` stays positive definite and the
//! wanted pairs are the ones `(M - τI)^-1` stretches most.

use crate::error::{Result, SpectraError};
use crate::sparse::SparseMatrix;
use crate::symmetrize::ConnectivityMatrix;

/// Relative gap between `σ` and the solver shift used on an affinity matrix.
pub const AFFINITY_TARGET_GAP: f64 = 1e-2;

/// Solver shift for `affinity(sigma)`: `σ (1 - AFFINITY_TARGET_GAP)`.
pub fn affinity_target(sigma: f64) -> f64 {
    sigma * (1.0 - AFFINITY_TARGET_GAP)
}

/// Derives the Laplacian family of matrices from a connectivity matrix.
#[derive(Debug, Clone)]
pub struct LaplacianBuilder {
    connectivity: ConnectivityMatrix,
    degrees: Vec<f64>,
}

impl LaplacianBuilder {
    pub fn new(connectivity: ConnectivityMatrix) -> Self {
        let degrees = connectivity.degrees();
        Self {
            connectivity,
            degrees,
        }
    }

    pub fn connectivity(&self) -> &ConnectivityMatrix {
        &self.connectivity
    }

    pub fn index_id(&self) -> u64 {
        self.connectivity.index_id()
    }

    pub fn dim(&self) -> usize {
        self.degrees.len()
    }

    /// Degree vector `d_i = Σ_j C_ij`.
    pub fn degrees(&self) -> &[f64] {
        &self.degrees
    }

    /// Positions with zero degree.
    pub fn isolated(&self) -> Vec<usize> {
        self.degrees
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == 0.0)
            .map(|(i, _)| i)
            .collect()
    }

    /// `L = diag(d) - C`.
    pub fn laplacian(&self) -> Result<SparseMatrix> {
        SparseMatrix::diagonal(&self.degrees).sub(self.connectivity.matrix())
    }

    /// Diagonal entries of `D^-1/2`; zero-degree nodes get 0.
    pub fn inverse_sqrt_degree_values(&self) -> Vec<f64> {
        self.degrees
            .iter()
            .map(|&d| if d > 0.0 { 1.0 / d.sqrt() } else { 0.0 })
            .collect()
    }

    /// `D^-1/2` as a sparse diagonal matrix.
    pub fn inverse_sqrt_degree(&self) -> SparseMatrix {
        SparseMatrix::diagonal(&self.inverse_sqrt_degree_values())
    }

    /// `D^-1/2 · L · D^-1/2` without the shift.
    pub fn normalized_laplacian(&self) -> Result<SparseMatrix> {
        self.laplacian()?
            .scale_symmetric(&self.inverse_sqrt_degree_values())
    }

    /// `D^-1/2 · L · D^-1/2 + σI` for `σ > 0`.
    pub fn affinity(&self, sigma: f64) -> Result<SparseMatrix> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(SpectraError::invalid_parameters(format!(
                "affinity shift must be positive and finite, got {}",
                sigma
            )));
        }
        Ok(self.normalized_laplacian()?.shift_diagonal(sigma))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symmetrize::AdjacencyMatrix;
    use crate::types::NodeIndexMap;
    use proptest::prelude::*;

    fn builder(n: usize, edges: &[(usize, usize)]) -> LaplacianBuilder {
        let index = NodeIndexMap::new((0..n).map(|i| i.to_string()).collect(), 0);
        let a = SparseMatrix::from_triplets(n, edges.iter().map(|&(r, c)| (r, c, 1.0))).unwrap();
        let c = AdjacencyMatrix::from_matrix(a, &index)
            .unwrap()
            .symmetrize()
            .unwrap();
        LaplacianBuilder::new(c)
    }

    #[test]
    fn triangle_laplacian() {
        let b = builder(3, &[(0, 1), (1, 2), (2, 0)]);
        let l = b.laplacian().unwrap();
        assert_eq!(b.degrees(), &[1.0, 1.0, 1.0]);
        assert_eq!(l.get(0, 0), 1.0);
        assert_eq!(l.get(0, 1), -0.5);
        assert_eq!(l.get(0, 2), -0.5);
    }

    #[test]
    fn isolated_node_gets_zero_factor() {
        let b = builder(3, &[(0, 1)]);
        assert_eq!(b.isolated(), vec![2]);
        let s = b.inverse_sqrt_degree_values();
        assert_eq!(s[2], 0.0);
        assert!(s.iter().all(|v| v.is_finite()));

        let affinity = b.affinity(0.5).unwrap();
        assert_eq!(affinity.get(2, 2), 0.5);
        for (_, _, v) in affinity.triplets() {
            assert!(v.is_finite());
        }
    }

    #[test]
    fn affinity_of_connected_pair() {
        // Normalized Laplacian of a single edge is [[1,-1],[-1,1]].
        let b = builder(2, &[(0, 1)]);
        let affinity = b.affinity(0.25).unwrap();
        assert!((affinity.get(0, 0) - 1.25).abs() < 1e-12);
        assert!((affinity.get(0, 1) + 1.0).abs() < 1e-12);
        assert!(affinity.is_symmetric(1e-12));
    }

    #[test]
    fn affinity_spectrum_sits_above_its_target() {
        use crate::eigen::{EigenSolver, SolverOptions};
        // 300-node path: the low affinity eigenvalues crowd just above σ
        let edges: Vec<(usize, usize)> = (0..299).map(|i| (i, i + 1)).collect();
        let b = builder(300, &edges);
        let sigma = 0.5;
        let solver = EigenSolver::new(SolverOptions::default().or_target(affinity_target(sigma)));
        let pairs = solver.smallest(&b.affinity(sigma).unwrap(), 3).unwrap();
        assert!((pairs.values[0] - sigma).abs() < 1e-8, "{:?}", pairs.values);
        assert!(pairs.values[1] > sigma);
        assert!(affinity_target(sigma) < sigma);
    }

    #[test]
    fn non_positive_shift_is_rejected() {
        let b = builder(2, &[(0, 1)]);
        assert!(b.affinity(0.0).is_err());
        assert!(b.affinity(f64::NAN).is_err());
    }

    #[test]
    fn self_loop_keeps_rows_balanced() {
        let b = builder(2, &[(0, 0), (0, 1)]);
        let sums = b.laplacian().unwrap().row_sums();
        assert!(sums.iter().all(|s| s.abs() < 1e-12), "{:?}", sums);
    }

    proptest! {
        #[test]
        fn laplacian_is_symmetric_with_zero_row_sums(
            n in 1usize..30,
            raw in proptest::collection::vec((0usize..30, 0usize..30), 0..120),
        ) {
            let edges: Vec<(usize, usize)> = raw
                .into_iter()
                .map(|(a, b)| (a % n, b % n))
                .collect();
            let b = builder(n, &edges);
            let l = b.laplacian().unwrap();
            prop_assert!(l.is_symmetric(1e-12));
            for s in l.row_sums() {
                prop_assert!(s.abs() < 1e-9, "row sum {}", s);
            }
            let affinity = b.affinity(0.5).unwrap();
            prop_assert!(affinity.is_symmetric(1e-12));
        }
    }
}
