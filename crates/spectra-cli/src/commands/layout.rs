//! Compute the 2D spectral layout.

use anyhow::{Context, Result};
use colored::Colorize;
use spectra::prelude::*;
use std::path::Path;

use super::{load_graph, solver_hint, spinner};
use crate::GraphArgs;

pub fn run(args: &GraphArgs, config: &SpectralConfig, output: Option<&Path>) -> Result<()> {
    let graph = load_graph(args)?;
    let pipeline = SpectralPipeline::new(config.clone());
    let ranking = DegreeRanker::new(&graph).rank_by_in_degree();
    let index = pipeline.select(&graph, &ranking);

    let connectivity = ConnectivityMatrix::from_graph(&graph, &index)?;
    let laplacian = LaplacianBuilder::new(connectivity);
    let isolated = laplacian.isolated().len();

    let projector =
        EmbeddingProjector::new(config.sigma).with_trivial_tolerance(config.trivial_tolerance);
    let pb = spinner(&format!(
        "Solving for {} eigenpairs of a {}x{} affinity...",
        projector.eigenpairs_for(&laplacian, config.eigenpairs),
        index.len(),
        index.len()
    ));
    let result = projector.embed(
        &laplacian,
        &EigenSolver::new(config.solver.clone()),
        config.eigenpairs,
    );
    pb.finish_and_clear();

    let embedding = match result {
        Ok(e) => e,
        Err(e) => {
            solver_hint(&e);
            return Err(e).context("Spectral layout failed");
        }
    };

    println!(
        "{} Converged in {} restarts (residual {:.2e}, {} inner iterations)",
        "✓".green(),
        embedding.iterations.to_string().cyan(),
        embedding.residual,
        embedding.linear_iterations
    );
    println!(
        "  Axes from eigenvalues {:.6} and {:.6}; {} trivial pairs skipped",
        embedding.axes[0], embedding.axes[1], embedding.trivial
    );
    if isolated > 0 {
        println!("  {} {} isolated nodes placed at the origin", "•".yellow(), isolated);
    }

    let positions: Vec<NodePosition> = embedding
        .named_positions(&index)?
        .into_iter()
        .map(|(name, p)| NodePosition {
            name: name.to_string(),
            x: p.x,
            y: p.y,
        })
        .collect();

    match output {
        Some(path) => {
            let json = serde_json::to_string_pretty(&positions)?;
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{} Layout written to {}", "✓".green(), path.display());
        }
        None => {
            println!();
            for p in positions.iter().take(20) {
                println!("  {:<36} {:>12.6} {:>12.6}", p.name.cyan(), p.x, p.y);
            }
            if positions.len() > 20 {
                println!("  {} {} more (use --output)", "…".dimmed(), positions.len() - 20);
            }
        }
    }

    Ok(())
}
