//! Detect communities by spectral bisection.

use anyhow::{Context, Result};
use colored::Colorize;
use spectra::prelude::*;

use super::{load_graph, solver_hint, spinner};
use crate::GraphArgs;

pub fn run(args: &GraphArgs, config: &SpectralConfig) -> Result<()> {
    let graph = load_graph(args)?;
    let pipeline = SpectralPipeline::new(config.clone());
    let ranking = DegreeRanker::new(&graph).rank_by_in_degree();
    let index = pipeline.select(&graph, &ranking);
    let connectivity = ConnectivityMatrix::from_graph(&graph, &index)?;

    let pb = spinner(&format!(
        "Bisecting {} nodes into at most {} communities...",
        index.len(),
        config.communities
    ));
    let result = CommunityAssigner::new(BisectionConfig {
        communities: config.communities,
        sigma: config.sigma,
        min_modularity_gain: config.min_modularity_gain,
    })
    .with_solver(config.solver.clone())
    .assign(&connectivity);
    pb.finish_and_clear();

    let assignment = match result {
        Ok(a) => a,
        Err(e) => {
            solver_hint(&e);
            return Err(e).context("Community detection failed");
        }
    };

    println!(
        "{} {} communities after {} bisections (modularity {:.4})",
        "✓".green(),
        assignment.num_communities().to_string().cyan(),
        assignment.bisections,
        assignment.modularity
    );
    println!();

    for community in assignment.communities(&index)? {
        println!(
            "{} {} ({} nodes)",
            "Community".blue().bold(),
            community.id.to_string().blue().bold(),
            community.size
        );
        let preview: Vec<&str> = community.members.iter().take(8).map(String::as_str).collect();
        let more = community.size.saturating_sub(preview.len());
        if more > 0 {
            println!("  {} {}", preview.join(", "), format!("+{} more", more).dimmed());
        } else {
            println!("  {}", preview.join(", "));
        }
    }

    Ok(())
}
