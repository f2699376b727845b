//! Spectra Runtime Prelude - convenient imports for common usage.
//!
//! ```rust
//! use spectra_runtime::prelude::*;
//! ```

// Re-export graph store and ingestion
pub use crate::topology_impl::PetDependencyGraph;
pub use crate::ingest::{
    EdgeListIngester, IngestReport, SkippedLine,
    ingest_path, ingest_reader, ingest_str,
};

// Re-export analysis stages
pub use crate::ranking::DegreeRanker;
pub use crate::embedding::{EmbeddingProjector, SpectralEmbedding};
pub use crate::community::{
    BisectionConfig, Community, CommunityAssigner, CommunityAssignment, partition_by_sign,
};

// Re-export pipeline and export
pub use crate::pipeline::{
    Diagnostics, GraphSummary, NodePosition, SpectralConfig, SpectralPipeline, SpectralReport,
};
pub use crate::export::{load_report, report_to_json, save_report, write_ranking};

// Re-export from core
pub use spectra_core::prelude::*;
