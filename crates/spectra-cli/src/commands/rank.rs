//! Rank nodes by in-degree.

use anyhow::{Context, Result};
use colored::Colorize;
use spectra::prelude::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use super::load_graph;
use crate::GraphArgs;

pub fn run(args: &GraphArgs, top: usize, output: Option<&Path>) -> Result<()> {
    let graph = load_graph(args)?;
    let ranking = DegreeRanker::new(&graph).rank_by_in_degree();

    println!();
    println!("{}", "Most depended-on nodes".white().bold());
    println!("{}", "─".repeat(50).dimmed());
    for (i, node) in ranking.iter().take(top).enumerate() {
        println!(
            "{:>4}. {:<36} {}",
            i + 1,
            node.name.cyan(),
            node.in_degree.to_string().green()
        );
    }
    if ranking.len() > top {
        println!("  {} {} more", "…".dimmed(), ranking.len() - top);
    }

    if let Some(path) = output {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write_ranking(&ranking, BufWriter::new(file))?;
        println!();
        println!("{} Ranking written to {}", "✓".green(), path.display());
    }

    Ok(())
}
