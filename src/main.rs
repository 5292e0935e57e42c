//! lsif-moniker CLI - builds moniker identity graphs from program facts

mod commands;

use clap::{Parser, Subcommand};
use lsif_moniker::config::{default_config_path, load_config};
use lsif_moniker::output::OutputFormat;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "lsif-moniker")]
#[command(version)]
#[command(about = "Build LSIF moniker and visibility graphs from program facts")]
#[command(long_about = r#"
lsif-moniker turns the facts reported by a program analyzer into an LSIF
identity graph:
  • Stable monikers for every exported symbol
  • Merged declarations (overloads, interface + namespace, augmentations)
  • Local digests for private symbols
  • attach edges for re-exports and export assignments

Example usage:
  lsif-moniker index --facts program.json --out dump.lsif
  lsif-moniker stats --facts program.json
  lsif-moniker init
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (defaults to ./lsif-moniker.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the graph for a facts file
    Index {
        /// Facts file produced by the program adapter
        #[arg(short, long)]
        facts: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Moniker scheme
        #[arg(short, long)]
        scheme: Option<String>,
    },

    /// Show element counts without writing the graph
    Stats {
        /// Facts file produced by the program adapter
        #[arg(short, long)]
        facts: PathBuf,
    },

    /// Write a default config file
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let result = run(cli);
    if let Err(e) = &result {
        lsif_moniker::ui::error(&e.to_string());
    }
    result
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?.unwrap_or_default();
    let mut options = config.indexer_options();

    match cli.command {
        Commands::Index { facts, out, format, scheme } => {
            if let Some(scheme) = scheme {
                options.scheme = scheme;
            }
            let format = format.or(config.format).unwrap_or_default();
            commands::run_index(&facts, out, format, options, config.root)
        }

        Commands::Stats { facts } => commands::run_stats(&facts, options, config.root),

        Commands::Init { force } => {
            let path = cli.config.unwrap_or_else(default_config_path);
            commands::run_init(&path, force)
        }
    }
}
