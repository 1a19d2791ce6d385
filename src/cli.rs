//! CLI command implementations for Monopoly.

pub(crate) mod batch;
pub(crate) mod play;
pub(crate) mod simulate;
pub(crate) mod validate;

mod output;

use clap::ValueEnum;
use monopoly::board::{BoardLoader, BuiltinLoader, DEFAULT_LAYOUT, DirectoryLoader};
use monopoly::{GameConfig, GameError, LoadError, Rules};
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Output format for the `simulate` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Output format for the `batch` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum BatchFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
    /// CSV format.
    Csv,
}

/// Options every game-running command shares.
#[derive(clap::Args, Debug, Clone)]
pub(crate) struct SetupArgs {
    /// Number of agents (2-8)
    #[arg(short = 'n', long, default_value = "4")]
    pub(crate) agents: u8,

    /// Random seed (default: random)
    #[arg(short, long)]
    pub(crate) seed: Option<u64>,

    /// Stop after this many rounds (0: no limit)
    #[arg(short = 'r', long, default_value = "1000")]
    pub(crate) max_rounds: u32,

    /// Layout name
    #[arg(short, long, default_value = DEFAULT_LAYOUT)]
    pub(crate) layout: String,

    /// Directory holding <layout>.layout and <layout>.terrains
    /// (default: built-in layouts)
    #[arg(long)]
    pub(crate) map_dir: Option<PathBuf>,

    /// JSON rules file; absent fields keep their defaults
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
}

impl SetupArgs {
    /// Game configuration for these options, with `seed` overriding the
    /// one given on the command line.
    pub(crate) fn config(&self, seed: u64) -> Result<GameConfig, CliError> {
        let rules = match &self.rules {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|e| {
                    CliError::new(format!("Failed to read {}: {e}", path.display()))
                })?;
                Rules::from_json(&text)?
            }
            None => Rules::default(),
        };
        let max_rounds = (self.max_rounds > 0).then_some(self.max_rounds);
        Ok(GameConfig {
            agents: self.agents,
            seed,
            max_rounds,
            layout: self.layout.clone(),
            rules,
        })
    }

    /// Loader for the chosen layout source.
    pub(crate) fn loader(&self) -> Box<dyn BoardLoader + Sync> {
        loader_for(self.map_dir.as_ref())
    }

    /// The given seed, or one taken from the clock.
    pub(crate) fn seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs() ^ u64::from(d.subsec_nanos()))
                .unwrap_or(42)
        })
    }
}

/// Built-in layouts, or layouts read from `dir`.
pub(crate) fn loader_for(dir: Option<&PathBuf>) -> Box<dyn BoardLoader + Sync> {
    match dir {
        Some(dir) => Box::new(DirectoryLoader::new(dir.clone())),
        None => Box::new(BuiltinLoader),
    }
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<GameError> for CliError {
    fn from(e: GameError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<LoadError> for CliError {
    fn from(e: LoadError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(format!("JSON error: {e}"))
    }
}
