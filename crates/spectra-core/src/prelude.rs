//! Spectra Core Prelude - convenient imports for common usage.
//!
//! ```rust
//! use spectra_core::prelude::*;
//! ```

// Re-export commonly used types
pub use crate::types::{EigenDecomposition, NodeIndexMap, Position, RankedNode};

// Re-export the DependencyGraph trait
pub use crate::topology::DependencyGraph;

// Re-export matrices and builders
pub use crate::sparse::SparseMatrix;
pub use crate::symmetrize::{AdjacencyMatrix, ConnectivityMatrix};
pub use crate::laplacian::{affinity_target, LaplacianBuilder};

// Re-export the solver
pub use crate::eigen::{canonicalize_sign, EigenSolver, SolverOptions, StartVector};

// Re-export modularity helpers
pub use crate::modularity::{group_modularity, modularity_gain, partition_modularity};

// Re-export error types
pub use crate::error::{ConfigError, GraphError, Result, SolverError, SpectraError};
