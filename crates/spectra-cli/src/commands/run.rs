//! Run the full spectral pipeline and save a report.

use anyhow::{Context, Result};
use colored::Colorize;
use spectra::prelude::*;
use std::path::Path;

use super::{load_graph, solver_hint, spinner};
use crate::GraphArgs;

pub fn run(args: &GraphArgs, config: &SpectralConfig, output: &Path) -> Result<()> {
    let graph = load_graph(args)?;

    let pb = spinner("Running spectral pipeline...");
    let result = SpectralPipeline::new(config.clone()).run(&graph);
    pb.finish_and_clear();

    let report = match result {
        Ok(r) => r,
        Err(e) => {
            solver_hint(&e);
            return Err(e).context("Spectral pipeline failed");
        }
    };

    save_report(&report, output)
        .with_context(|| format!("Failed to write report: {}", output.display()))?;

    println!();
    println!("{} Pipeline complete!", "✓".green().bold());
    println!(
        "  Nodes analysed:  {} of {}",
        report.graph.selected.to_string().cyan(),
        report.graph.nodes
    );
    println!(
        "  Eigenvalues:     {}",
        report
            .eigenvalues
            .iter()
            .map(|v| format!("{:.6}", v))
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "  Solver:          {} restarts, residual {:.2e}",
        report.diagnostics.iterations, report.diagnostics.residual
    );
    println!(
        "  Communities:     {} (modularity {:.4})",
        report.communities.len().to_string().cyan(),
        report.modularity
    );
    if let Some(top) = report.ranking.first() {
        println!(
            "  Top dependency:  {} ({} dependents)",
            top.name.cyan(),
            top.in_degree
        );
    }
    println!();
    println!("{} Report written to {}", "✓".green(), output.display());

    Ok(())
}
