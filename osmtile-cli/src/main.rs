//! osmtile CLI - Command-line interface
//!
//! Queries road graphs, water and parks around a point through the osmtile
//! tile cache, and inspects or clears that cache.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use osmtile::logging::{default_log_dir, default_log_file, init_logging};
use tracing::debug;

use commands::cache::CacheAction;
use commands::query::QueryArgs;
use commands::tiles::TilesArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "osmtile")]
#[command(version = osmtile::VERSION)]
#[command(
    about = "Cached OpenStreetMap road, water and park data for circular regions",
    long_about = None
)]
struct Cli {
    /// Path to config.ini [default: ~/.osmtile/config.ini]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for the log file [default: ~/.osmtile/logs]
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch or load the merged data around a point and print a summary
    Query(QueryArgs),

    /// List the tiles covering a query without fetching anything
    Tiles(TilesArgs),

    /// Inspect or clear the tile cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_dir = cli.log_dir.clone().unwrap_or_else(default_log_dir);
    let _guard = match init_logging(&log_dir, default_log_file()) {
        Ok(guard) => guard,
        Err(e) => CliError::LoggingInit(e.to_string()).exit(),
    };
    debug!(version = osmtile::VERSION, "osmtile starting");

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = cli.config.as_ref();
    match cli.command {
        Commands::Query(args) => commands::query::run(config, args),
        Commands::Tiles(args) => commands::tiles::run(config, args),
        Commands::Cache { action } => commands::cache::run(config, action),
    }
}
