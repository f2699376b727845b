//! # Spectra Core
//!
//! Core types and numerics for spectral analysis of dependency graphs.
//!
//! The pipeline this crate provides, leaves first:
//!
//! - **Topology** - the `DependencyGraph` storage contract
//! - **Symmetrizer** - directed adjacency to `C = (A + Aᵗ) / 2`
//! - **Laplacian** - degrees, `L = D - C`, `D^-1/2`, shifted affinity
//! - **Eigen** - shift-invert block Krylov solver for the smallest eigenpairs
//! - **Modularity** - cut quality for community bisection
//!
//! ## Quick Start
//!
//! ```rust
//! use spectra_core::prelude::*;
//!
//! // Laplacian of the path 0 - 1 - 2
//! let laplacian = SparseMatrix::from_triplets(3, vec![
//!     (0, 0, 1.0), (0, 1, -1.0),
//!     (1, 0, -1.0), (1, 1, 2.0), (1, 2, -1.0),
//!     (2, 1, -1.0), (2, 2, 1.0),
//! ]).unwrap();
//!
//! let solver = EigenSolver::new(SolverOptions::default().with_target(-0.1));
//! let pairs = solver.smallest(&laplacian, 2).unwrap();
//! assert!(pairs.values[0].abs() < 1e-8);
//! assert!((pairs.values[1] - 1.0).abs() < 1e-8);
//! ```

pub mod types;
pub mod topology;
pub mod error;
pub mod sparse;
pub mod symmetrize;
pub mod laplacian;
pub mod eigen;
pub mod modularity;
pub mod prelude;
