//! # Spectra Runtime
//!
//! Graph storage and the spectral analysis pipeline.
//!
//! The runtime owns the concrete dependency graph (petgraph-backed), reads
//! edge lists into it, and runs the chain ranking → connectivity →
//! Laplacian → eigenpairs → layout and communities on top of the numerical
//! primitives in `spectra-core`.

pub mod topology_impl;
pub mod ingest;
pub mod ranking;
pub mod embedding;
pub mod community;
pub mod pipeline;
pub mod export;
pub mod prelude;
