mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "difymirror",
    about = "Mirror a plugin marketplace into a version-controlled snapshot",
    version,
    propagate_version = true
)]
struct Cli {
    /// Mirror root (default: auto-detect from .difymirror/ or .git/)
    #[arg(long, global = true, env = "DIFYMIRROR_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a mirror in the current directory
    Init,

    /// Run the sync job once (manual trigger)
    Sync {
        /// Commit but do not push
        #[arg(long)]
        no_push: bool,

        /// Fetch and diff, but do not commit
        #[arg(long)]
        dry_run: bool,
    },

    /// Run the sync job on a fixed recurrence (scheduled trigger)
    Watch {
        /// Interval between runs, e.g. 30s, 15m, 6h
        #[arg(long, value_parser = cmd::watch::parse_interval)]
        every: Duration,
    },

    /// Show mirror contents and pending changes
    Status,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Watch { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Sync { no_push, dry_run } => cmd::sync::run(&root, no_push, dry_run, cli.json),
        Commands::Watch { every } => cmd::watch::run(&root, every),
        Commands::Status => cmd::status::run(&root, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
