//! Monopoly CLI - play, simulate and batch-run board games.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Monopoly - a deterministic property-trading board game engine
#[derive(Parser, Debug)]
#[command(name = "monopoly")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log more to stderr (-v info, -vv debug, -vvv trace); RUST_LOG wins
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Play interactively, every seat from this terminal
    Play {
        #[command(flatten)]
        setup: cli::SetupArgs,

        /// Dice animation length in milliseconds (default: 600)
        #[arg(long, default_value = "600")]
        roll_ms: u64,
    },

    /// Run one seeded game with scripted agents
    Simulate {
        #[command(flatten)]
        setup: cli::SetupArgs,

        /// Cash the scripted agents keep in hand (default: 150)
        #[arg(long, default_value = "150")]
        reserve: i64,

        /// Print every event, not just the result
        #[arg(short, long)]
        events: bool,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Run many seeded games in parallel and aggregate statistics
    Batch {
        #[command(flatten)]
        setup: cli::SetupArgs,

        /// Number of games to run (default: 1000)
        #[arg(short, long, default_value = "1000")]
        games: u64,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Cash the scripted agents keep in hand (default: 150)
        #[arg(long, default_value = "150")]
        reserve: i64,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::BatchFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Load a board layout and check it is playable
    Validate {
        /// Layout name
        #[arg(default_value = monopoly::board::DEFAULT_LAYOUT)]
        layout: String,

        /// Directory holding <layout>.layout and <layout>.terrains
        #[arg(long)]
        map_dir: Option<PathBuf>,
    },
}

/// Install the stderr log subscriber.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("monopoly={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let result = match args.command {
        Commands::Play { setup, roll_ms } => cli::play::execute(&setup, roll_ms),

        Commands::Simulate {
            setup,
            reserve,
            events,
            format,
        } => cli::simulate::execute(&setup, reserve, events, format),

        Commands::Batch {
            setup,
            games,
            threads,
            reserve,
            format,
            progress,
        } => cli::batch::execute(&setup, games, threads, reserve, format, progress),

        Commands::Validate { layout, map_dir } => {
            cli::validate::execute(&layout, map_dir.as_ref())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
