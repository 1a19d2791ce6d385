//! Output formatting utilities for CLI.

// Averages over game counts are display-only
#![allow(clippy::cast_precision_loss)]

use std::fmt::Write;

use monopoly::game::{EndReason, GameResult};
use monopoly::presenter::Localizer;
use serde::Serialize;

/// Format a game result as human-readable text.
pub(super) fn format_text(result: &GameResult, text: &dyn Localizer) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Game Result (seed: {})", result.seed);
    match result.winner {
        Some(winner) => {
            let _ = writeln!(output, "  Winner: {}", text.agent_name(winner));
        }
        None => output.push_str("  Winner: none\n"),
    }
    let ending = match result.reason {
        EndReason::LastSolvent => "last solvent agent",
        EndReason::RoundLimit => "round limit",
    };
    let _ = writeln!(output, "  Rounds: {} ({ending})\n", result.rounds);

    for agent in &result.agents {
        let _ = write!(
            output,
            "  {}: M{} cash, M{} net worth",
            text.agent_name(agent.id),
            agent.funds,
            agent.net_worth
        );
        if !agent.alive {
            output.push_str(" [bankrupt]");
        }
        output.push('\n');
        if !agent.holdings.is_empty() {
            let names: Vec<String> = agent
                .holdings
                .iter()
                .map(|p| text.space_name(*p))
                .collect();
            let _ = writeln!(output, "    {}", names.join(", "));
        }
    }

    output
}

/// Statistics aggregated over many games.
#[derive(Debug, Default, Clone)]
pub(super) struct BatchStats {
    /// Total games played.
    pub(super) games_played: u64,
    /// Games that failed with an error.
    pub(super) failures: u64,
    /// Win count per seat.
    pub(super) wins: Vec<u64>,
    /// Games nobody won.
    pub(super) draws: u64,
    /// Games stopped by the round limit.
    pub(super) round_limited: u64,
    /// Total net worth per seat.
    total_worth: Vec<i64>,
    /// Total rounds across all games.
    total_rounds: u64,
}

impl BatchStats {
    /// Create new stats for n agents.
    pub(super) fn new(agents: usize) -> Self {
        Self {
            wins: vec![0; agents],
            total_worth: vec![0; agents],
            ..Self::default()
        }
    }

    /// Add a game result to the stats.
    pub(super) fn add_result(&mut self, result: &GameResult) {
        self.games_played += 1;
        self.total_rounds += u64::from(result.rounds);
        if result.reason == EndReason::RoundLimit {
            self.round_limited += 1;
        }

        match result.winner.and_then(|w| usize::from(w).checked_sub(1)) {
            Some(seat) if seat < self.wins.len() => self.wins[seat] += 1,
            _ => self.draws += 1,
        }

        for (total, agent) in self.total_worth.iter_mut().zip(&result.agents) {
            *total += agent.net_worth;
        }
    }

    /// Merge stats gathered on another thread.
    pub(super) fn merge(&mut self, other: &Self) {
        self.games_played += other.games_played;
        self.failures += other.failures;
        self.draws += other.draws;
        self.round_limited += other.round_limited;
        self.total_rounds += other.total_rounds;
        for (a, b) in self.wins.iter_mut().zip(&other.wins) {
            *a += b;
        }
        for (a, b) in self.total_worth.iter_mut().zip(&other.total_worth) {
            *a += b;
        }
    }

    /// Win rate for a seat (0.0-1.0).
    pub(super) fn win_rate(&self, seat: usize) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.wins.get(seat).copied().unwrap_or(0) as f64 / self.games_played as f64
    }

    /// Average final net worth for a seat.
    pub(super) fn avg_worth(&self, seat: usize) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_worth.get(seat).copied().unwrap_or(0) as f64 / self.games_played as f64
    }

    /// Average game length.
    pub(super) fn avg_rounds(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_rounds as f64 / self.games_played as f64
    }

    fn seats(&self) -> usize {
        self.wins.len()
    }
}

/// JSON-serializable batch result.
#[derive(Debug, Serialize)]
pub(super) struct JsonBatchResult {
    games_played: u64,
    failures: u64,
    draws: u64,
    round_limited: u64,
    avg_rounds: f64,
    agents: Vec<JsonBatchAgent>,
}

/// JSON-serializable per-seat batch stats.
#[derive(Debug, Serialize)]
struct JsonBatchAgent {
    /// Seat (1-based).
    agent: usize,
    wins: u64,
    win_rate: f64,
    avg_net_worth: f64,
}

impl JsonBatchResult {
    /// Create from stats.
    pub(super) fn from_stats(stats: &BatchStats) -> Self {
        let agents = (0..stats.seats())
            .map(|i| JsonBatchAgent {
                agent: i + 1,
                wins: stats.wins.get(i).copied().unwrap_or(0),
                win_rate: stats.win_rate(i),
                avg_net_worth: stats.avg_worth(i),
            })
            .collect();

        Self {
            games_played: stats.games_played,
            failures: stats.failures,
            draws: stats.draws,
            round_limited: stats.round_limited,
            avg_rounds: stats.avg_rounds(),
            agents,
        }
    }
}

/// Format batch stats as human-readable text.
pub(super) fn format_batch_text(stats: &BatchStats) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Batch Results ({} games)", stats.games_played);
    output.push_str("========================================\n\n");

    output.push_str("Win Rates:\n");
    for seat in 0..stats.seats() {
        let wins = stats.wins.get(seat).copied().unwrap_or(0);
        let rate = stats.win_rate(seat) * 100.0;
        let _ = writeln!(output, "  Player {}: {rate:.1}% ({wins} wins)", seat + 1);
    }
    let draw_rate = if stats.games_played == 0 {
        0.0
    } else {
        stats.draws as f64 / stats.games_played as f64 * 100.0
    };
    let _ = writeln!(output, "  No winner: {} ({draw_rate:.1}%)\n", stats.draws);

    output.push_str("Average Net Worth:\n");
    for seat in 0..stats.seats() {
        let _ = writeln!(output, "  Player {}: M{:.0}", seat + 1, stats.avg_worth(seat));
    }

    let _ = writeln!(
        output,
        "\nAverage Game Length: {:.0} rounds ({} hit the round limit)",
        stats.avg_rounds(),
        stats.round_limited
    );
    if stats.failures > 0 {
        let _ = writeln!(output, "Failed games: {}", stats.failures);
    }

    output
}

/// Format batch stats as CSV.
pub(super) fn format_batch_csv(stats: &BatchStats) -> String {
    let mut output = String::new();

    output.push_str("agent,wins,win_rate,avg_net_worth\n");
    for seat in 0..stats.seats() {
        let _ = writeln!(
            output,
            "{},{},{:.4},{:.2}",
            seat + 1,
            stats.wins.get(seat).copied().unwrap_or(0),
            stats.win_rate(seat),
            stats.avg_worth(seat)
        );
    }

    output
}
