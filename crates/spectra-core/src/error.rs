//! Error types for Spectra operations.
//!
//! Structured errors instead of panics. Ingestion problems and zero-degree
//! nodes are handled where they occur; everything here propagates to the
//! caller, who decides whether to retry with other parameters.

use thiserror::Error;

/// Result type for Spectra operations.
pub type Result<T> = std::result::Result<T, SpectraError>;

/// Errors that can occur during Spectra operations.
#[derive(Debug, Clone, Error)]
pub enum SpectraError {
    /// Graph-related errors.
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
    /// Numerical errors from the eigensolver.
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),
    /// Configuration errors.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    /// Edge-list reading errors (not malformed lines, those are skipped).
    #[error("Ingest error: {0}")]
    Ingest(String),
    /// I/O errors (wrapped).
    #[error("I/O error: {0}")]
    Io(String),
    /// Serialization errors.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for SpectraError {
    fn from(e: std::io::Error) -> Self {
        SpectraError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for SpectraError {
    fn from(e: serde_json::Error) -> Self {
        SpectraError::Serialization(e.to_string())
    }
}

/// Graph-related errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// Node not found. Also the documented outcome of removing an absent node.
    #[error("Node not found: {0}")]
    NodeNotFound(String),
    /// Graph (or the selected subgraph) has no nodes.
    #[error("Graph is empty")]
    EmptyGraph,
    /// A node index was derived from an older revision of the graph.
    #[error("Stale node index: built at revision {index_revision}, graph is at {graph_revision}")]
    StaleIndex {
        index_revision: u64,
        graph_revision: u64,
    },
    /// Two derived artifacts were built from different node indices.
    #[error("Node index mismatch: expected index #{expected}, found #{found}")]
    IndexMismatch { expected: u64, found: u64 },
}

/// Numerical errors from the eigensolver and the stages that consume it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// Restart budget exhausted before every requested pair met the tolerance.
    #[error(
        "Did not converge after {iterations} restarts: residual {residual:.3e} ({converged} of requested pairs converged)"
    )]
    NotConverged {
        residual: f64,
        iterations: usize,
        converged: usize,
    },
    /// The inner conjugate-gradient solve ran out of iterations.
    #[error("Linear solve stalled after {iterations} iterations: residual {residual:.3e}")]
    LinearSolveStalled { residual: f64, iterations: usize },
    /// `M - target*I` is not positive definite.
    #[error("Shifted matrix is not positive definite (target {target})")]
    NotPositiveDefinite { target: f64 },
    /// Matrix and vector shapes do not agree.
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    /// Invalid solver parameters.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
    /// Too few non-trivial eigenpairs to produce the requested output.
    #[error("Insufficient spectrum: needed {needed} non-trivial eigenpairs, found {found}")]
    InsufficientSpectrum { needed: usize, found: usize },
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Invalid value.
    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
    /// Out of range.
    #[error("{field} out of range: {value} (must be {min}-{max})")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },
}

// Convenience constructors
impl SpectraError {
    pub fn node_not_found(name: impl Into<String>) -> Self {
        SpectraError::Graph(GraphError::NodeNotFound(name.into()))
    }

    pub fn invalid_parameters(msg: impl Into<String>) -> Self {
        SpectraError::Solver(SolverError::InvalidParameters(msg.into()))
    }

    pub fn invalid_config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        SpectraError::Config(ConfigError::InvalidValue {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        })
    }

    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, value: f64) -> Self {
        SpectraError::Config(ConfigError::OutOfRange {
            field: field.into(),
            min,
            max,
            value,
        })
    }

    /// True for errors a caller can recover from by retrying the solver
    /// with a different shift, pair count or start vector.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SpectraError::Solver(
                SolverError::NotConverged { .. }
                    | SolverError::LinearSolveStalled { .. }
                    | SolverError::InsufficientSpectrum { .. }
            )
        )
    }
}
