use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::Engine;

#[derive(Parser)]
#[command(name = "codetell")]
#[command(about = "Heuristic call-graph analysis and plain-language method summaries")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        /// Target directory (defaults to current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Describe a method in plain language
    Describe {
        /// Method to describe, matched against qualified names
        method: String,

        /// Source directory to analyze (overrides configuration)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Rank methods by call-graph importance
    Rank {
        /// Source directory to analyze (overrides configuration)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Number of methods to list
        #[arg(short, long, default_value_t = 20)]
        top: usize,
    },

    /// List the methods a method calls
    Calls {
        /// Method to resolve, matched against qualified names
        method: String,

        /// Source directory to analyze (overrides configuration)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Export the call graph as JSON
    Graph {
        /// Source directory to analyze (overrides configuration)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn execute(self, mut engine: Engine) -> Result<()> {
        match self.command {
            Commands::Init { path } => engine.init(path).await,
            Commands::Describe { method, path } => engine.describe(&method, path).await,
            Commands::Rank { path, top } => engine.rank(path, top).await,
            Commands::Calls { method, path } => engine.calls(&method, path).await,
            Commands::Graph { path, output } => engine.graph(path, output).await,
        }
    }
}
