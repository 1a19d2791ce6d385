//! Batch command implementation.

// Games per second is display-only
#![allow(clippy::cast_precision_loss)]

use super::output::{BatchStats, JsonBatchResult, format_batch_csv, format_batch_text};
use super::{BatchFormat, CliError, SetupArgs};
use indicatif::{ProgressBar, ProgressStyle};
use monopoly::Game;
use monopoly::board::Board;
use monopoly::presenter::AutoPilot;
use rayon::prelude::*;
use std::time::Instant;
use tracing::warn;

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} games ({per_sec})";

/// Execute the batch command.
///
/// # Errors
///
/// Returns an error if the board cannot be loaded or the configuration is
/// invalid.
pub(crate) fn execute(
    setup: &SetupArgs,
    games: u64,
    threads: Option<usize>,
    reserve: i64,
    format: BatchFormat,
    progress: bool,
) -> Result<(), CliError> {
    let base_seed = setup.seed();
    let template = setup.config(base_seed)?;

    // Load the board once; every game starts from a clone.
    let board = Board::load(&*setup.loader(), &template.layout, &template.rules)?;
    // Reject a bad configuration before any game starts
    Game::with_board(template.clone(), board.clone())?;

    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let pb = if progress {
        let pb = ProgressBar::new(games);
        let style = ProgressStyle::default_bar()
            .template(PROGRESS_TEMPLATE)
            .map_err(|e| CliError::new(format!("Bad progress template: {e}")))?
            .progress_chars("=>-");
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let seats = usize::from(template.agents);

    // Each thread folds into its own stats, merged at the end
    let stats = (0..games)
        .into_par_iter()
        .fold(
            || BatchStats::new(seats),
            |mut local, i| {
                let mut config = template.clone();
                config.seed = base_seed.wrapping_add(i);
                let seed = config.seed;
                let outcome = Game::with_board(config, board.clone())
                    .and_then(|mut game| game.run(&mut AutoPilot::new(reserve)));
                match outcome {
                    Ok(result) => local.add_result(&result),
                    Err(e) => {
                        warn!(seed, error = %e, "game failed");
                        local.failures += 1;
                    }
                }
                if let Some(pb) = &pb {
                    pb.inc(1);
                }
                local
            },
        )
        .reduce(
            || BatchStats::new(seats),
            |mut a, b| {
                a.merge(&b);
                a
            },
        );

    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }

    let duration = start.elapsed();
    let games_per_sec = if duration.as_secs_f64() > 0.0 {
        stats.games_played as f64 / duration.as_secs_f64()
    } else {
        0.0
    };

    match format {
        BatchFormat::Text => {
            println!("Base seed: {base_seed}");
            println!();
            print!("{}", format_batch_text(&stats));
            println!();
            println!(
                "Duration: {:.2}s ({games_per_sec:.0} games/sec)",
                duration.as_secs_f64()
            );
        }
        BatchFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonBatchResult::from_stats(&stats))?;
            println!("{json}");
        }
        BatchFormat::Csv => {
            print!("{}", format_batch_csv(&stats));
        }
    }

    Ok(())
}
