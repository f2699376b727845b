//! Square sparse matrices over a node index.
//!
//! Thin wrapper around a `sprs` CSR matrix. Only the operations the
//! Laplacian pipeline and the eigensolver need are exposed: triplet
//! construction (duplicates summed), diagonal scaling, shifts, principal
//! submatrices and matrix-vector products.

use crate::error::{Result, SolverError};
use sprs::{CsMat, TriMat};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// An n×n sparse matrix addressed by `(row, col)`. Zero entries are not stored.
#[derive(Debug, Clone)]
pub struct SparseMatrix {
    inner: CsMat<f64>,
}

impl SparseMatrix {
    /// Build from `(row, col, value)` triplets. Duplicate positions are summed;
    /// positions that end up exactly zero are dropped.
    pub fn from_triplets<I>(n: usize, triplets: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        let mut tri = TriMat::new((n, n));
        for (row, col, value) in triplets {
            if row >= n || col >= n {
                return Err(SolverError::DimensionMismatch {
                    expected: n,
                    got: row.max(col) + 1,
                }
                .into());
            }
            if value != 0.0 {
                tri.add_triplet(row, col, value);
            }
        }
        Ok(Self::from_csr(tri.to_csr()))
    }

    /// Wrap a CSR result, dropping entries that summation cancelled out
    /// (e.g. a Laplacian self-loop).
    fn from_csr(inner: CsMat<f64>) -> Self {
        if inner.data().iter().all(|v| *v != 0.0) {
            return Self { inner };
        }
        let n = inner.rows();
        let mut pruned = TriMat::new((n, n));
        for (row, vec) in inner.outer_iterator().enumerate() {
            for (col, &value) in vec.iter() {
                if value != 0.0 {
                    pruned.add_triplet(row, col, value);
                }
            }
        }
        Self {
            inner: pruned.to_csr(),
        }
    }

    /// n×n zero matrix.
    pub fn zeros(n: usize) -> Self {
        Self {
            inner: TriMat::new((n, n)).to_csr(),
        }
    }

    /// Diagonal matrix with the given entries.
    pub fn diagonal(values: &[f64]) -> Self {
        let mut tri = TriMat::new((values.len(), values.len()));
        for (i, &v) in values.iter().enumerate() {
            if v != 0.0 {
                tri.add_triplet(i, i, v);
            }
        }
        Self { inner: tri.to_csr() }
    }

    /// n×n identity.
    pub fn identity(n: usize) -> Self {
        Self::diagonal(&vec![1.0; n])
    }

    /// Dimension n.
    pub fn dim(&self) -> usize {
        self.inner.rows()
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.inner.nnz()
    }

    /// Value at `(row, col)`, 0.0 when not stored or out of range.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        if row >= self.dim() || col >= self.dim() {
            return 0.0;
        }
        self.inner.get(row, col).copied().unwrap_or(0.0)
    }

    /// Stored entries as `(row, col, value)`, row-major.
    pub fn triplets(&self) -> Vec<(usize, usize, f64)> {
        let mut out = Vec::with_capacity(self.nnz());
        for (row, vec) in self.inner.outer_iterator().enumerate() {
            for (col, &value) in vec.iter() {
                out.push((row, col, value));
            }
        }
        out
    }

    /// Row sums.
    pub fn row_sums(&self) -> Vec<f64> {
        self.inner
            .outer_iterator()
            .map(|vec| vec.iter().map(|(_, v)| *v).sum())
            .collect()
    }

    /// Main diagonal.
    pub fn diagonal_values(&self) -> Vec<f64> {
        (0..self.dim()).map(|i| self.get(i, i)).collect()
    }

    pub fn transpose(&self) -> Self {
        Self::from_csr(self.inner.transpose_view().to_csr())
    }

    /// `self + other`.
    pub fn add(&self, other: &SparseMatrix) -> Result<Self> {
        self.check_dim(other.dim())?;
        let sum: CsMat<f64> = &self.inner + &other.inner;
        Ok(Self::from_csr(sum))
    }

    /// `self - other`.
    pub fn sub(&self, other: &SparseMatrix) -> Result<Self> {
        self.check_dim(other.dim())?;
        let difference: CsMat<f64> = &self.inner - &other.inner;
        Ok(Self::from_csr(difference))
    }

    /// `factor * self`.
    pub fn scale(&self, factor: f64) -> Self {
        Self::from_csr(self.inner.map(|v| v * factor))
    }

    /// `diag(s) · self · diag(s)`.
    pub fn scale_symmetric(&self, s: &[f64]) -> Result<Self> {
        self.check_dim(s.len())?;
        let entries = self
            .triplets()
            .into_iter()
            .map(|(r, c, v)| (r, c, s[r] * v * s[c]));
        Self::from_triplets(self.dim(), entries)
    }

    /// `self + shift · I`.
    pub fn shift_diagonal(&self, shift: f64) -> Self {
        let identity = Self::diagonal(&vec![shift; self.dim()]);
        let shifted: CsMat<f64> = &self.inner + &identity.inner;
        Self::from_csr(shifted)
    }

    /// Rows and columns `keep` (in that order) as a new `keep.len()` square matrix.
    pub fn principal_submatrix(&self, keep: &[usize]) -> Result<Self> {
        let n = self.dim();
        let mut local = vec![usize::MAX; n];
        for (new, &old) in keep.iter().enumerate() {
            if old >= n {
                return Err(SolverError::DimensionMismatch {
                    expected: n,
                    got: old + 1,
                }
                .into());
            }
            local[old] = new;
        }
        let mut entries = Vec::new();
        for (new_row, &old_row) in keep.iter().enumerate() {
            if let Some(vec) = self.inner.outer_view(old_row) {
                for (old_col, &value) in vec.iter() {
                    let new_col = local[old_col];
                    if new_col != usize::MAX {
                        entries.push((new_row, new_col, value));
                    }
                }
            }
        }
        Self::from_triplets(keep.len(), entries)
    }

    /// Whether `|a_ij - a_ji| <= tol` for every stored entry.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        self.triplets()
            .into_iter()
            .all(|(r, c, v)| (v - self.get(c, r)).abs() <= tol)
    }

    /// `y = self · x`.
    pub fn matvec(&self, x: &[f64]) -> Result<Vec<f64>> {
        self.check_dim(x.len())?;
        Ok(self.matvec_unchecked(x))
    }

    #[cfg(not(feature = "parallel"))]
    pub(crate) fn matvec_unchecked(&self, x: &[f64]) -> Vec<f64> {
        self.inner
            .outer_iterator()
            .map(|row| row.iter().map(|(c, v)| v * x[c]).sum())
            .collect()
    }

    #[cfg(feature = "parallel")]
    pub(crate) fn matvec_unchecked(&self, x: &[f64]) -> Vec<f64> {
        (0..self.dim())
            .into_par_iter()
            .map(|r| match self.inner.outer_view(r) {
                Some(row) => row.iter().map(|(c, v)| v * x[c]).sum(),
                None => 0.0,
            })
            .collect()
    }

    fn check_dim(&self, got: usize) -> Result<()> {
        if got != self.dim() {
            return Err(SolverError::DimensionMismatch {
                expected: self.dim(),
                got,
            }
            .into());
        }
        Ok(())
    }
}
