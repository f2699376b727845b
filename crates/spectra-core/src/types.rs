//! Shared types used across all Spectra crates.

use crate::error::GraphError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_INDEX_ID: AtomicU64 = AtomicU64::new(1);

/// Fixed bijection between node names and matrix positions `0..n`.
///
/// Created once per computation. Every matrix built from it carries its
/// `id`, and the index remembers the graph revision it was taken from so
/// that a mutated graph cannot be paired with old matrices.
#[derive(Debug, Clone)]
pub struct NodeIndexMap {
    id: u64,
    revision: u64,
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl NodeIndexMap {
    /// Build an index over `names` (in the given order) for a graph at `revision`.
    /// Duplicate names keep their first position.
    pub fn new(names: Vec<String>, revision: u64) -> Self {
        let mut positions = HashMap::with_capacity(names.len());
        let mut unique = Vec::with_capacity(names.len());
        for name in names {
            if !positions.contains_key(&name) {
                positions.insert(name.clone(), unique.len());
                unique.push(name);
            }
        }
        Self {
            id: NEXT_INDEX_ID.fetch_add(1, Ordering::Relaxed),
            revision,
            names: unique,
            positions,
        }
    }

    /// Unique identity of this index derivation.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Graph revision the index was derived from.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, position: usize) -> Option<&str> {
        self.names.get(position).map(String::as_str)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Fail with `StaleIndex` unless the graph is still at the indexed revision.
    pub fn ensure_current(&self, graph_revision: u64) -> Result<(), GraphError> {
        if self.revision != graph_revision {
            return Err(GraphError::StaleIndex {
                index_revision: self.revision,
                graph_revision,
            });
        }
        Ok(())
    }

    /// Fail with `IndexMismatch` unless `other_id` names this index.
    pub fn ensure_same(&self, other_id: u64) -> Result<(), GraphError> {
        if self.id != other_id {
            return Err(GraphError::IndexMismatch {
                expected: self.id,
                found: other_id,
            });
        }
        Ok(())
    }
}

/// A node together with its in-degree, as produced by the ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedNode {
    pub name: String,
    pub in_degree: usize,
}

/// A position in the 2D spectral layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Eigenpairs sorted by ascending eigenvalue, with solver diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct EigenDecomposition {
    /// Eigenvalues, ascending.
    pub values: Vec<f64>,
    /// Unit-norm eigenvectors aligned with `values`. Largest-magnitude entry is positive.
    pub vectors: Vec<Vec<f64>>,
    /// Restart cycles used.
    pub iterations: usize,
    /// Largest residual `||Mx - λx||` over the returned pairs.
    pub residual: f64,
    /// Total inner conjugate-gradient iterations.
    pub linear_iterations: usize,
}

impl EigenDecomposition {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(eigenvalue, eigenvector)` pairs in ascending order.
    pub fn pairs(&self) -> impl Iterator<Item = (f64, &[f64])> {
        self.values
            .iter()
            .copied()
            .zip(self.vectors.iter().map(Vec::as_slice))
    }
}
