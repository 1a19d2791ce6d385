// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Monopoly: a deterministic, turn-based property-trading board game engine.
//!
//! Tokens move around a cyclic board of spaces; landing on a space pays
//! rent, taxes or draws a card, and agents buy, mortgage and improve
//! properties until one solvent agent is left.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Game loop / turn state machine    │
//! ├─────────────────────────────────────┤
//! │  Movement, effects, economy         │
//! ├──────────────┬──────────────────────┤
//! │ Board layout │ Dice, card decks     │
//! └──────────────┴──────────────────────┘
//! ```
//!
//! Every roll and shuffle draws from the single seeded [`GameRng`] owned
//! by [`Game`], so a seed and a deterministic [`Presenter`] fix the whole
//! game.
//!
//! ```
//! use monopoly::{Game, GameConfig};
//! use monopoly::presenter::AutoPilot;
//!
//! let mut game = Game::new(GameConfig::new(2, 7).with_max_rounds(Some(20)))?;
//! let result = game.run(&mut AutoPilot::default())?;
//! assert!(result.rounds <= 20);
//! # Ok::<(), monopoly::GameError>(())
//! ```

pub mod board;
pub mod cards;
pub mod dice;
pub mod error;
pub mod game;
pub mod presenter;
pub mod rules;

/// The random source behind every roll and shuffle.
pub type GameRng = rand_chacha::ChaCha8Rng;

pub use error::{EngineResult, GameError, InvariantViolation, LoadError, RuleViolation};

// Re-export key game types at crate root for convenience
pub use board::{Board, Space, SpaceType};
pub use game::{ActionKind, Agent, AgentId, Game, GameConfig, GameResult, TurnAction, TurnState};
pub use presenter::{Message, Presenter};
pub use rules::{Money, Rules};

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_rng_is_seeded() {
        let mut a = GameRng::seed_from_u64(3);
        let mut b = GameRng::seed_from_u64(3);
        let xs: Vec<u32> = (0..8).map(|_| a.random()).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.random()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_error_display() {
        let err = GameError::Bankrupt { agent: 2 };
        assert!(err.to_string().contains('2'));
    }
}
