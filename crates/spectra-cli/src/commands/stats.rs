//! Show graph statistics.

use anyhow::Result;
use colored::Colorize;
use spectra::prelude::*;

use super::load_graph;
use crate::GraphArgs;

pub fn run(args: &GraphArgs) -> Result<()> {
    let graph = load_graph(args)?;
    let ranking = DegreeRanker::new(&graph).rank_by_in_degree();

    let nodes = graph.node_count();
    let edges = graph.edge_count();
    let components = graph.connected_components();
    let self_loops = graph.edges().iter().filter(|(a, b)| a == b).count();
    let roots = ranking.iter().filter(|r| r.in_degree == 0).count();
    let max_in = ranking.first().map(|r| r.in_degree).unwrap_or(0);
    let avg_in = if nodes > 0 { edges as f64 / nodes as f64 } else { 0.0 };

    println!();
    println!("{}", "Spectra Graph Statistics".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!();

    println!("{}", "Graph Structure".blue().bold());
    println!("  Total nodes:       {}", nodes.to_string().cyan());
    println!("  Total edges:       {}", edges.to_string().cyan());
    println!("  Components:        {}", components.to_string().cyan());
    println!("  Self-loops:        {}", self_loops.to_string().cyan());
    println!();

    println!("{}", "In-degree".blue().bold());
    println!("  Max in-degree:     {}", max_in.to_string().cyan());
    println!("  Avg in-degree:     {:.2}", avg_in);
    println!("  Unreferenced:      {}", roots.to_string().cyan());
    println!();

    // Density of the directed graph
    if nodes > 1 {
        let max_edges = nodes * (nodes - 1);
        let density = edges as f64 / max_edges as f64;
        println!("{}", "Density".blue().bold());
        println!("  Graph density:     {:.6}", density);
    }

    println!();
    println!("{}", "═".repeat(40).dimmed());

    Ok(())
}
