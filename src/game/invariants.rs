//! Game invariants - sanity checks that detect bugs.
//!
//! These should NEVER trigger in a correctly implemented game. They tie
//! the board's ownership records to the agents' holdings and bound every
//! improvement by the rules.

use crate::board::SpaceKind;
use crate::game::{Game, holding_key};
use crate::rules::BankruptcyPolicy;

/// A broken invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breach {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for Breach {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for Breach {}

/// Check all game invariants.
///
/// Returns every breach found, or an empty list if all invariants hold.
/// Meant to run between actions, when no rent multiplier is pending.
#[must_use]
pub fn check_invariants(game: &Game) -> Vec<Breach> {
    let mut breaches = Vec::new();
    let mut breach = |message: String| breaches.push(Breach { message });
    let board = game.board();
    let rules = game.rules();

    for space in board.spaces() {
        let position = space.position;
        let Some(deed) = space.deed() else {
            continue;
        };
        if let Some(owner) = deed.owner {
            match game.agent(owner) {
                None => breach(format!("Space {position} owned by unknown agent {owner}")),
                Some(agent) => {
                    if !agent.holdings.contains(&position) {
                        breach(format!("Space {position} missing from agent {owner}'s holdings"));
                    }
                    if !agent.alive && rules.bankruptcy == BankruptcyPolicy::ReturnToBank {
                        breach(format!("Bankrupt agent {owner} still owns space {position}"));
                    }
                }
            }
        } else if deed.mortgaged {
            breach(format!("Unowned space {position} is mortgaged"));
        }

        let SpaceKind::Terrain(terrain) = &space.kind else {
            continue;
        };
        if terrain.hotels > 1 || terrain.houses > rules.max_houses {
            breach(format!(
                "Terrain {position} holds {} houses and {} hotels",
                terrain.houses, terrain.hotels
            ));
        }
        if terrain.hotels > 0 && terrain.houses > 0 {
            breach(format!("Terrain {position} keeps houses under its hotel"));
        }
        if terrain.is_improved() {
            let grouped = deed.owner.is_some_and(|o| board.owns_group(o, terrain.group));
            if !grouped || deed.mortgaged {
                breach(format!("Terrain {position} improved without a clear full group"));
            }
        }
    }

    for agent in game.agents() {
        let id = agent.id;
        if agent.alive && agent.funds < 0 {
            breach(format!("Agent {id} is in the game with funds {}", agent.funds));
        }
        if agent.position >= board.len() {
            breach(format!("Agent {id} stands off the board at {}", agent.position));
        }
        if agent.in_jail && agent.position != board.jail_position() {
            breach(format!("Agent {id} is jailed away from the jail"));
        }
        if agent.rent_multiplier != 1 {
            breach(format!("Agent {id} keeps rent multiplier {}", agent.rent_multiplier));
        }
        for position in &agent.holdings {
            if board.space(*position).owner() != Some(id) {
                breach(format!("Agent {id} holds space {position} it does not own"));
            }
        }
        let ordered = agent
            .holdings
            .windows(2)
            .all(|w| holding_key(board.space(w[0])) <= holding_key(board.space(w[1])));
        if !ordered {
            breach(format!("Agent {id} holdings out of order: {:?}", agent.holdings));
        }
    }

    breaches
}

/// Assert all game invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(game: &Game) {
    let breaches = check_invariants(game);
    if !breaches.is_empty() {
        let messages: Vec<_> = breaches.iter().map(|b| b.message.as_str()).collect();
        panic!("Game invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_game: &Game) {}
