//! Game layer.
//!
//! Implements the rules on top of the board:
//! - Agents with funds, holdings and jail state
//! - Movement, landing effects and card effects
//! - Property economy (rent, buying, mortgages, improvements)
//! - The per-turn action state machine and the round-robin game loop

mod agent;
mod config;
mod economy;
mod effects;
mod invariants;
mod movement;
mod outcome;
mod state;
mod turn;

pub use agent::{Agent, AgentId, MAX_AGENTS, MIN_AGENTS, holding_key};
pub use config::GameConfig;
pub use invariants::{Breach, assert_invariants, check_invariants};
pub use outcome::{AgentSummary, EndReason, GameResult};
pub use state::{Game, Roll};
pub use turn::{ActionKind, TurnAction, TurnFlow, TurnState};
