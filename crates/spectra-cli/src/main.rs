//! Spectra CLI - spectral analysis of dependency graphs.

mod commands;
mod config;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Overrides;

#[derive(Parser)]
#[command(name = "spectra")]
#[command(author, version, about = "Spectra - spectral layout and communities for dependency graphs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: spectra.toml in this or a parent directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

/// Edge list plus nodes to drop before analysis.
#[derive(Args)]
pub struct GraphArgs {
    /// Edge list: one "<dependent> <dependency>" pair per line
    input: PathBuf,

    /// Remove a node (and its edges) before analysis; repeatable
    #[arg(short, long = "remove", value_name = "NODE")]
    remove: Vec<String>,
}

/// Spectral parameters that override the config file.
#[derive(Args, Default)]
pub struct SpectralArgs {
    /// Analyse only the N most depended-on nodes
    #[arg(short = 'n', long)]
    top: Option<usize>,

    /// Affinity shift
    #[arg(long)]
    sigma: Option<f64>,

    /// Eigenpairs to compute
    #[arg(short = 'k', long)]
    eigenpairs: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default spectra.toml
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Show graph statistics
    Stats {
        #[command(flatten)]
        graph: GraphArgs,
    },

    /// Rank nodes by in-degree
    Rank {
        #[command(flatten)]
        graph: GraphArgs,

        /// Number of nodes to show
        #[arg(short = 'n', long, default_value = "20")]
        top: usize,

        /// Write the full ranking as a tab-separated file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compute 2D spectral coordinates
    Layout {
        #[command(flatten)]
        graph: GraphArgs,

        #[command(flatten)]
        spectral: SpectralArgs,

        /// Write coordinates as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Split the graph into communities by spectral bisection
    Communities {
        #[command(flatten)]
        graph: GraphArgs,

        #[command(flatten)]
        spectral: SpectralArgs,

        /// Maximum number of communities
        #[arg(long)]
        count: Option<usize>,

        /// Reject splits that gain no more modularity than this
        #[arg(long)]
        min_gain: Option<f64>,
    },

    /// Run the full pipeline and write a report
    Run {
        #[command(flatten)]
        graph: GraphArgs,

        #[command(flatten)]
        spectral: SpectralArgs,

        /// Maximum number of communities
        #[arg(long)]
        count: Option<usize>,

        /// Reject splits that gain no more modularity than this
        #[arg(long)]
        min_gain: Option<f64>,

        /// Report file
        #[arg(short, long, default_value = "spectra-report.json")]
        output: PathBuf,
    },
}

impl SpectralArgs {
    fn overrides(&self, count: Option<usize>, min_gain: Option<f64>) -> Overrides {
        Overrides {
            top_n: self.top,
            sigma: self.sigma,
            eigenpairs: self.eigenpairs,
            communities: count,
            min_modularity_gain: min_gain,
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Stats { graph } => commands::stats::run(&graph),
        Commands::Rank { graph, top, output } => {
            commands::rank::run(&graph, top, output.as_deref())
        }
        Commands::Layout { graph, spectral, output } => {
            let config = commands::load_config(config_path, &spectral.overrides(None, None))?;
            commands::layout::run(&graph, &config, output.as_deref())
        }
        Commands::Communities { graph, spectral, count, min_gain } => {
            let config = commands::load_config(config_path, &spectral.overrides(count, min_gain))?;
            commands::communities::run(&graph, &config)
        }
        Commands::Run { graph, spectral, count, min_gain, output } => {
            let config = commands::load_config(config_path, &spectral.overrides(count, min_gain))?;
            commands::run::run(&graph, &config, &output)
        }
    }
}
