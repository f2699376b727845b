//! CLI command implementations.

pub mod init;
pub mod stats;
pub mod rank;
pub mod layout;
pub mod communities;
pub mod run;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use spectra::prelude::*;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

use crate::config::{Config, Overrides};
use crate::GraphArgs;

/// Read the edge list and apply `--remove` flags.
///
/// Unknown names in `--remove` are reported and skipped.
pub fn load_graph(args: &GraphArgs) -> Result<PetDependencyGraph> {
    if !args.input.exists() {
        bail!("Edge list does not exist: {}", args.input.display());
    }

    let mut graph = PetDependencyGraph::new();
    let report = ingest_path(&mut graph, &args.input)
        .with_context(|| format!("Failed to read edge list: {}", args.input.display()))?;

    println!(
        "{} Loaded {} nodes, {} edges from {} lines",
        "→".blue(),
        graph.node_count().to_string().cyan(),
        graph.edge_count().to_string().cyan(),
        report.lines
    );
    if !report.is_clean() {
        println!(
            "  {} Skipped {} malformed lines",
            "•".yellow(),
            report.skipped_count().to_string().yellow()
        );
    }

    for name in &args.remove {
        match graph.remove_node(name) {
            Ok(edges) => println!(
                "  {} Removed {} ({} edges)",
                "✓".green(),
                name.cyan(),
                edges
            ),
            Err(SpectraError::Graph(GraphError::NodeNotFound(_))) => {
                warn!(node = %name, "Node to remove is not in the graph");
                println!("  {} No node named {}, nothing removed", "•".yellow(), name.yellow());
            }
            Err(e) => return Err(e.into()),
        }
    }

    if graph.node_count() == 0 {
        bail!("Graph is empty after loading {}", args.input.display());
    }
    Ok(graph)
}

/// Config file plus command-line overrides, validated.
pub fn load_config(path: Option<&Path>, overrides: &Overrides) -> Result<SpectralConfig> {
    let config = Config::load(path)?.spectral_config(overrides);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Spinner shown while a numerical stage runs.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Explain retryable solver failures before handing the error back.
pub fn solver_hint(err: &SpectraError) {
    if let SpectraError::Solver(SolverError::InsufficientSpectrum { .. }) = err {
        println!(
            "  {} Select more nodes ({}) so the layout has two non-trivial eigenpairs",
            "hint:".yellow(),
            "--top".cyan()
        );
    } else if err.is_retryable() {
        println!(
            "  {} Retry with a different {} or {}",
            "hint:".yellow(),
            "--sigma".cyan(),
            "--eigenpairs".cyan()
        );
    }
}
