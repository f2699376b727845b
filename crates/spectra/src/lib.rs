//! # Spectra
//!
//! Spectral analysis of large dependency graphs.
//!
//! Spectra reads a directed dependency graph, ranks nodes by how many
//! dependents they have, and uses the spectrum of the graph Laplacian to lay
//! the graph out in the plane and to split it into communities.
//!
//! ## Quick Start
//!
//! ```rust
//! use spectra::prelude::*;
//!
//! let mut graph = PetDependencyGraph::new();
//! let report = ingest_str(&mut graph, "\
//!     app http\napp json\njson http\nhttp app\n\
//!     cli args\ncli term\nterm args\nargs cli\n\
//!     app cli\n");
//! assert!(report.is_clean());
//!
//! let top = DegreeRanker::new(&graph).top_n(3);
//! assert_eq!(top.len(), 3);
//!
//! let result = SpectralPipeline::new(SpectralConfig::default())
//!     .run(&graph)
//!     .unwrap();
//! assert_eq!(result.communities.len(), 2);
//! assert_ne!(result.assignments["http"], result.assignments["args"]);
//! ```
//!
//! ## Architecture
//!
//! - [`spectra_core`] - Graph trait, sparse matrices, Laplacian, eigensolver, errors
//! - [`spectra_runtime`] - Graph store, ingestion, ranking, embedding, communities, pipeline
//!
//! ## Stages
//!
//! | Stage | Input | Output |
//! |-------|-------|--------|
//! | Ingest | edge-list lines | dependency graph |
//! | Rank | graph | nodes by in-degree, top-N selection |
//! | Symmetrize | adjacency `A` | connectivity `(A + Aᵗ)/2` |
//! | Laplacian | connectivity | `L`, `D^-1/2`, affinity `D^-1/2 L D^-1/2 + σI` |
//! | Solve | affinity | smallest eigenpairs (shift-invert Krylov) |
//! | Embed | eigenpairs | `(x, y)` per node |
//! | Bisect | connectivity | community label per node |
//!
//! ## Failure modes
//!
//! Malformed edge lines are skipped and counted. Removing an unknown node
//! is `GraphError::NodeNotFound`. An eigensolver that runs out of restarts
//! returns `SolverError::NotConverged` with the residual it reached, and the
//! caller may retry with another shift, pair count or start vector.

pub use spectra_core;
pub use spectra_runtime;

/// Prelude module for convenient imports.
///
/// ```rust
/// use spectra::prelude::*;
/// ```
pub mod prelude {
    pub use spectra_runtime::prelude::*;
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
