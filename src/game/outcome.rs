//! The game loop and its result.

use serde::Serialize;
use tracing::info;

use crate::error::EngineResult;
use crate::game::invariants::assert_invariants;
use crate::game::{AgentId, Game};
use crate::presenter::{Message, Presenter};
use crate::rules::Money;

/// Why a game stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// At most one agent is still solvent.
    LastSolvent,
    /// The round limit ran out.
    RoundLimit,
}

/// One agent's standing at the end of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentSummary {
    /// Agent id.
    pub id: AgentId,
    /// Cash on hand.
    pub funds: Money,
    /// Funds plus property value.
    pub net_worth: Money,
    /// Still in the game.
    pub alive: bool,
    /// Board position.
    pub position: usize,
    /// Owned positions in display order.
    pub holdings: Vec<usize>,
}

/// Result of a finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameResult {
    /// Seed the game ran with.
    pub seed: u64,
    /// Rounds played.
    pub rounds: u32,
    /// Winner, if any agent is left.
    pub winner: Option<AgentId>,
    /// Why the game stopped.
    pub reason: EndReason,
    /// Every agent, in seating order.
    pub agents: Vec<AgentSummary>,
}

impl Game {
    /// Give every living agent one turn, in seating order.
    ///
    /// Stops early once at most one agent is left.
    ///
    /// # Errors
    ///
    /// Returns the first error a turn raises.
    pub fn play_round(&mut self, presenter: &mut dyn Presenter) -> EngineResult<()> {
        self.round += 1;
        let ids: Vec<AgentId> = self.agents.iter().map(|a| a.id).collect();
        for id in ids {
            if self.living_count() <= 1 {
                break;
            }
            self.play_turn(id, presenter)?;
            assert_invariants(self);
        }
        Ok(())
    }

    /// Play rounds until the game is over.
    ///
    /// # Errors
    ///
    /// Returns the first error a turn raises.
    pub fn run(&mut self, presenter: &mut dyn Presenter) -> EngineResult<GameResult> {
        while !self.is_over() {
            self.play_round(presenter)?;
        }
        let result = self.result();
        info!(
            seed = result.seed,
            rounds = result.rounds,
            winner = ?result.winner,
            "game over"
        );
        // Agent 0 stands for nobody when the game ends without a winner.
        let to = result.winner.unwrap_or_default();
        presenter.announce(
            self,
            to,
            &Message::GameOver {
                winner: result.winner,
            },
        );
        Ok(result)
    }

    /// The last solvent agent, or with several left the richest one by net
    /// worth (lowest id on ties).
    #[must_use]
    pub fn winner(&self) -> Option<AgentId> {
        self.living_agents()
            .filter_map(|id| self.net_worth(id).map(|worth| (worth, id)))
            .max_by(|(wa, ia), (wb, ib)| wa.cmp(wb).then(ib.cmp(ia)))
            .map(|(_, id)| id)
    }

    /// Snapshot of the game as it stands.
    #[must_use]
    pub fn result(&self) -> GameResult {
        let reason = if self.living_count() <= 1 {
            EndReason::LastSolvent
        } else {
            EndReason::RoundLimit
        };
        let agents = self
            .agents
            .iter()
            .map(|a| AgentSummary {
                id: a.id,
                funds: a.funds,
                net_worth: self.net_worth(a.id).unwrap_or(a.funds),
                alive: a.alive,
                position: a.position,
                holdings: a.holdings.clone(),
            })
            .collect();
        GameResult {
            seed: self.seed(),
            rounds: self.round,
            winner: self.winner(),
            reason,
            agents,
        }
    }
}
