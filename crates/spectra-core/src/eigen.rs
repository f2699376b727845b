//! Shift-invert block Krylov eigensolver for sparse symmetric matrices.
//!
//! Computes the `k` eigenpairs of `M` closest to (and above) a target shift
//! `τ` by running a block Lanczos-type expansion on the operator
//! `(M - τI)^-1`, whose largest eigenvalues `θ` correspond to the wanted
//! `λ = τ + 1/θ`:
//!
//! 1. Start block: the caller's start vector (all-ones by default) followed by
//!    `k - 1` seeded pseudo-random vectors. The block lets repeated
//!    eigenvalues (one per connected component for a Laplacian) surface.
//! 2. Expansion: each basis vector `q` is mapped through the operator by a
//!    conjugate-gradient solve of `(M - τI) w = q`, and `w` is orthogonalized
//!    against the basis (classical Gram-Schmidt, applied twice). Directions
//!    lost to breakdown are replaced by fresh seeded vectors.
//! 3. Rayleigh-Ritz on `H = Qᵗ W` (dense, small) via `nalgebra`.
//! 4. Rayleigh quotients give `λ`; true residuals `||Mx - λx||` decide
//!    convergence. Unconverged runs restart from the current Ritz vectors
//!    until the restart budget is spent, then fail with
//!    `SolverError::NotConverged`.
//!
//! Output eigenvalues are ascending; each eigenvector is unit norm with its
//! largest-magnitude entry made positive.

use crate::error::{Result, SolverError, SpectraError};
use crate::sparse::SparseMatrix;
use crate::types::EigenDecomposition;
use nalgebra::{DMatrix, SymmetricEigen};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Relative norm below which an orthogonalized vector counts as lost.
const BREAKDOWN_TOLERANCE: f64 = 1e-10;

/// Attempts at drawing a replacement vector after breakdown.
const REPLACEMENT_ATTEMPTS: usize = 8;

/// Initial vector for the first block column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartVector {
    /// The all-ones vector.
    #[default]
    Ones,
    /// A caller-supplied vector; must match the matrix dimension and be non-zero.
    Custom(Vec<f64>),
}

/// Solver parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverOptions {
    /// Shift `τ`. `M - τI` must be positive definite, i.e. `τ` below the spectrum.
    /// Unset means 0 for a bare solve; the affinity stages fill in a shift just
    /// below `σ` (see `laplacian::affinity_target`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
    /// Relative residual tolerance: `||Mx - λx|| <= tolerance * max(1, |λ|)`.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Restart cycles allowed after the first one.
    #[serde(default = "default_max_restarts")]
    pub max_restarts: usize,
    /// Krylov basis size per cycle (raised to at least `2k + 1`, capped at `n`).
    #[serde(default = "default_krylov_dimension")]
    pub krylov_dimension: usize,
    /// Seed for the supplementary block vectors.
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub start: StartVector,
    /// Relative residual tolerance of the inner conjugate-gradient solves.
    #[serde(default = "default_cg_tolerance")]
    pub cg_tolerance: f64,
    /// Inner iteration cap; `None` means `10n + 100`.
    #[serde(default)]
    pub cg_max_iterations: Option<usize>,
}

fn default_tolerance() -> f64 { 1e-8 }
fn default_max_restarts() -> usize { 50 }
fn default_krylov_dimension() -> usize { 24 }
fn default_seed() -> u64 { 42 }
fn default_cg_tolerance() -> f64 { 1e-12 }

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            target: None,
            tolerance: default_tolerance(),
            max_restarts: default_max_restarts(),
            krylov_dimension: default_krylov_dimension(),
            seed: default_seed(),
            start: StartVector::Ones,
            cg_tolerance: default_cg_tolerance(),
            cg_max_iterations: None,
        }
    }
}

impl SolverOptions {
    pub fn with_target(mut self, target: f64) -> Self {
        self.target = Some(target);
        self
    }

    /// Use `target` unless a shift was set explicitly.
    pub fn or_target(mut self, target: f64) -> Self {
        self.target.get_or_insert(target);
        self
    }

    /// Shift the solver will apply.
    pub fn shift(&self) -> f64 {
        self.target.unwrap_or(0.0)
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_restarts(mut self, max_restarts: usize) -> Self {
        self.max_restarts = max_restarts;
        self
    }

    pub fn with_krylov_dimension(mut self, dimension: usize) -> Self {
        self.krylov_dimension = dimension;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_start(mut self, start: StartVector) -> Self {
        self.start = start;
        self
    }

    /// Reject parameters no run could succeed with.
    pub fn validate(&self) -> Result<()> {
        if let Some(target) = self.target {
            if !target.is_finite() {
                return Err(SpectraError::invalid_parameters(format!(
                    "target must be finite, got {}",
                    target
                )));
            }
        }
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(SpectraError::invalid_parameters(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if !(self.cg_tolerance > 0.0 && self.cg_tolerance < 1.0) {
            return Err(SpectraError::invalid_parameters(format!(
                "cg_tolerance must be in (0, 1), got {}",
                self.cg_tolerance
            )));
        }
        if self.krylov_dimension == 0 {
            return Err(SpectraError::invalid_parameters("krylov_dimension must be at least 1"));
        }
        if self.cg_max_iterations == Some(0) {
            return Err(SpectraError::invalid_parameters("cg_max_iterations must be at least 1"));
        }
        Ok(())
    }
}

/// Computes a few eigenpairs of a sparse symmetric matrix nearest a shift.
#[derive(Debug, Clone, Default)]
pub struct EigenSolver {
    options: SolverOptions,
}

impl EigenSolver {
    pub fn new(options: SolverOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// The `k` smallest eigenpairs of `matrix` above `options.target`.
    pub fn smallest(&self, matrix: &SparseMatrix, k: usize) -> Result<EigenDecomposition> {
        self.options.validate()?;
        let n = matrix.dim();
        if k == 0 || k > n {
            return Err(SpectraError::invalid_parameters(format!(
                "requested {} eigenpairs of a {}x{} matrix",
                k, n, n
            )));
        }
        let scale = matrix
            .triplets()
            .iter()
            .fold(1.0_f64, |acc, (_, _, v)| acc.max(v.abs()));
        if !matrix.is_symmetric(1e-9 * scale) {
            return Err(SpectraError::invalid_parameters("matrix is not symmetric"));
        }

        let start = match &self.options.start {
            StartVector::Ones => vec![1.0; n],
            StartVector::Custom(v) => {
                if v.len() != n {
                    return Err(SolverError::DimensionMismatch {
                        expected: n,
                        got: v.len(),
                    }
                    .into());
                }
                v.clone()
            }
        };
        let start_norm = norm(&start);
        if !(start_norm > 0.0 && start_norm.is_finite()) {
            return Err(SpectraError::invalid_parameters(
                "start vector must be finite and non-zero",
            ));
        }

        let op = ShiftInvert {
            matrix,
            target: self.options.shift(),
            tolerance: self.options.cg_tolerance,
            max_iterations: self.options.cg_max_iterations.unwrap_or(10 * n + 100),
        };
        let dimension = self.options.krylov_dimension.max(2 * k + 1).min(n);
        let mut rng = StdRng::seed_from_u64(self.options.seed);

        let mut block = Vec::with_capacity(k);
        block.push(start);
        for _ in 1..k {
            block.push(random_vector(&mut rng, n));
        }

        let mut linear_iterations = 0;
        let mut residual = f64::INFINITY;
        let mut converged = 0;
        let cycles = self.options.max_restarts + 1;

        for cycle in 1..=cycles {
            let (basis, images) =
                expand(&op, block, dimension, &mut rng, &mut linear_iterations)?;
            let ritz = rayleigh_ritz(&basis, &images, k);

            let mut pairs = Vec::with_capacity(k);
            for (theta, vector) in ritz {
                if !(theta > 0.0 && theta.is_finite()) {
                    return Err(SolverError::NotPositiveDefinite {
                        target: self.options.shift(),
                    }
                    .into());
                }
                // Rayleigh quotient: more accurate than `τ + 1/θ` under inexact solves.
                let mx = matrix.matvec_unchecked(&vector);
                let lambda = dot(&vector, &mx);
                let r = mx
                    .iter()
                    .zip(&vector)
                    .map(|(a, x)| (a - lambda * x).powi(2))
                    .sum::<f64>()
                    .sqrt();
                pairs.push((lambda, vector, r));
            }

            converged = pairs
                .iter()
                .filter(|(lambda, _, r)| *r <= self.options.tolerance * lambda.abs().max(1.0))
                .count();
            residual = pairs.iter().map(|(_, _, r)| *r).fold(0.0, f64::max);
            debug!(cycle, converged, residual, dimension, "eigensolver cycle");

            if converged == k {
                return Ok(finish(pairs, cycle, residual, linear_iterations));
            }
            block = pairs.into_iter().map(|(_, v, _)| v).collect();
        }

        Err(SolverError::NotConverged {
            residual,
            iterations: cycles,
            converged,
        }
        .into())
    }
}

/// `(M - τI)^-1` applied through conjugate gradients.
struct ShiftInvert<'a> {
    matrix: &'a SparseMatrix,
    target: f64,
    tolerance: f64,
    max_iterations: usize,
}

impl ShiftInvert<'_> {
    fn shifted_matvec(&self, x: &[f64]) -> Vec<f64> {
        let mut y = self.matrix.matvec_unchecked(x);
        if self.target != 0.0 {
            for (yi, xi) in y.iter_mut().zip(x) {
                *yi -= self.target * xi;
            }
        }
        y
    }

    /// Solve `(M - τI) x = b`, returning `x` and the iterations used.
    fn apply(&self, b: &[f64]) -> Result<(Vec<f64>, usize)> {
        let n = b.len();
        let mut x = vec![0.0; n];
        let b_norm = norm(b);
        if b_norm == 0.0 {
            return Ok((x, 0));
        }
        let mut r = b.to_vec();
        let mut p = r.clone();
        let mut rs = dot(&r, &r);

        for iteration in 1..=self.max_iterations {
            let ap = self.shifted_matvec(&p);
            let curvature = dot(&p, &ap);
            if !(curvature > 0.0 && curvature.is_finite()) {
                return Err(SolverError::NotPositiveDefinite {
                    target: self.target,
                }
                .into());
            }
            let alpha = rs / curvature;
            for i in 0..n {
                x[i] += alpha * p[i];
                r[i] -= alpha * ap[i];
            }
            let rs_next = dot(&r, &r);
            if rs_next.sqrt() <= self.tolerance * b_norm {
                return Ok((x, iteration));
            }
            let beta = rs_next / rs;
            for i in 0..n {
                p[i] = r[i] + beta * p[i];
            }
            rs = rs_next;
        }

        Err(SolverError::LinearSolveStalled {
            residual: rs.sqrt() / b_norm,
            iterations: self.max_iterations,
        }
        .into())
    }
}

/// Build an orthonormal basis of up to `dimension` vectors from `block` and
/// its images under the operator. Returns the basis and the image of every
/// basis vector.
fn expand(
    op: &ShiftInvert<'_>,
    block: Vec<Vec<f64>>,
    dimension: usize,
    rng: &mut StdRng,
    linear_iterations: &mut usize,
) -> Result<(Vec<Vec<f64>>, Vec<Vec<f64>>)> {
    let n = op.matrix.dim();
    let mut basis: Vec<Vec<f64>> = Vec::with_capacity(dimension);
    for v in block {
        if basis.len() == dimension {
            break;
        }
        push_or_replace(&mut basis, v, n, rng);
    }

    let mut images = Vec::with_capacity(dimension);
    let mut i = 0;
    while i < basis.len() {
        let (w, used) = op.apply(&basis[i])?;
        *linear_iterations += used;
        if basis.len() < dimension {
            push_or_replace(&mut basis, w.clone(), n, rng);
        }
        images.push(w);
        i += 1;
    }
    Ok((basis, images))
}

/// Orthogonalize `v` against `basis` and append it; if it collapses, append a
/// fresh seeded vector instead. Does nothing once the basis spans the space.
fn push_or_replace(basis: &mut Vec<Vec<f64>>, v: Vec<f64>, n: usize, rng: &mut StdRng) {
    if basis.len() >= n {
        return;
    }
    if let Some(q) = orthonormalize_against(basis, v) {
        basis.push(q);
        return;
    }
    for _ in 0..REPLACEMENT_ATTEMPTS {
        if let Some(q) = orthonormalize_against(basis, random_vector(rng, n)) {
            basis.push(q);
            return;
        }
    }
}

/// Two passes of classical Gram-Schmidt; `None` when the remainder is lost.
fn orthonormalize_against(basis: &[Vec<f64>], mut v: Vec<f64>) -> Option<Vec<f64>> {
    let original = norm(&v);
    if !(original > 0.0 && original.is_finite()) {
        return None;
    }
    for _ in 0..2 {
        for q in basis {
            let c = dot(q, &v);
            for (vi, qi) in v.iter_mut().zip(q) {
                *vi -= c * qi;
            }
        }
    }
    let remaining = norm(&v);
    if remaining <= BREAKDOWN_TOLERANCE * original {
        return None;
    }
    for vi in v.iter_mut() {
        *vi /= remaining;
    }
    Some(v)
}

/// Top-`k` Ritz pairs `(θ, x)` of the projected operator, θ descending.
fn rayleigh_ritz(basis: &[Vec<f64>], images: &[Vec<f64>], k: usize) -> Vec<(f64, Vec<f64>)> {
    let m = basis.len();
    let mut h = DMatrix::<f64>::zeros(m, m);
    for i in 0..m {
        for j in 0..m {
            h[(i, j)] = dot(&basis[i], &images[j]);
        }
    }
    // Inexact inner solves leave H slightly asymmetric.
    let h = (&h + h.transpose()) * 0.5;
    let eigen = SymmetricEigen::new(h);

    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&a, &b| {
        eigen.eigenvalues[b]
            .partial_cmp(&eigen.eigenvalues[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let n = basis.first().map_or(0, Vec::len);
    order
        .into_iter()
        .take(k)
        .map(|col| {
            let mut x = vec![0.0; n];
            for (j, q) in basis.iter().enumerate() {
                let y = eigen.eigenvectors[(j, col)];
                for (xi, qi) in x.iter_mut().zip(q) {
                    *xi += y * qi;
                }
            }
            let len = norm(&x);
            if len > 0.0 {
                for xi in x.iter_mut() {
                    *xi /= len;
                }
            }
            (eigen.eigenvalues[col], x)
        })
        .collect()
}

fn finish(
    mut pairs: Vec<(f64, Vec<f64>, f64)>,
    iterations: usize,
    residual: f64,
    linear_iterations: usize,
) -> EigenDecomposition {
    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    let mut values = Vec::with_capacity(pairs.len());
    let mut vectors = Vec::with_capacity(pairs.len());
    for (lambda, mut vector, _) in pairs {
        canonicalize_sign(&mut vector);
        values.push(lambda);
        vectors.push(vector);
    }
    EigenDecomposition {
        values,
        vectors,
        iterations,
        residual,
        linear_iterations,
    }
}

/// Flip `v` so that its largest-magnitude entry (first one on ties) is positive.
pub fn canonicalize_sign(v: &mut [f64]) {
    let mut pivot = 0.0_f64;
    for &x in v.iter() {
        if x.abs() > pivot.abs() {
            pivot = x;
        }
    }
    if pivot < 0.0 {
        for x in v.iter_mut() {
            *x = -*x;
        }
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn norm(v: &[f64]) -> f64 {
    dot(v, v).sqrt()
}

fn random_vector(rng: &mut StdRng, n: usize) -> Vec<f64> {
    (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect()
}
