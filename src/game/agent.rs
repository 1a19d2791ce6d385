//! Agent state management.

use serde::Serialize;

use crate::board::{Space, SpaceType};
use crate::rules::Money;

/// Unique identifier for an agent. Agents are numbered from 1.
pub type AgentId = u8;

/// Maximum number of agents in a game.
pub const MAX_AGENTS: usize = 8;

/// Minimum number of agents in a game.
pub const MIN_AGENTS: usize = 2;

/// State for a single agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Agent {
    /// Unique identifier for this agent.
    pub id: AgentId,
    /// Cash. Goes negative only on the payment that bankrupts the agent.
    pub funds: Money,
    /// Board position.
    pub position: usize,
    /// Whether the agent is still in the game.
    pub alive: bool,
    /// Whether the agent is in jail (as opposed to visiting).
    pub in_jail: bool,
    /// Failed escape attempts during the current stay in jail.
    pub jail_turns: u8,
    /// Get-out-of-jail cards held.
    pub jail_cards: u32,
    /// Multiplier applied to the next rent, reset after every move.
    pub rent_multiplier: u32,
    /// Owned positions: terrains by position, then railroads, then companies.
    pub holdings: Vec<usize>,
}

impl Agent {
    /// Create an agent at position 0 with the given funds.
    #[must_use]
    pub const fn new(id: AgentId, funds: Money) -> Self {
        Self {
            id,
            funds,
            position: 0,
            alive: true,
            in_jail: false,
            jail_turns: 0,
            jail_cards: 0,
            rent_multiplier: 1,
            holdings: Vec::new(),
        }
    }

    /// Credit funds.
    pub fn give(&mut self, amount: Money) {
        self.funds += amount;
    }

    /// Debit funds. Returns false if the agent is now insolvent.
    pub fn debit(&mut self, amount: Money) -> bool {
        self.funds -= amount;
        self.funds >= 0
    }

    /// True if a voluntary expense of `amount` is covered.
    #[must_use]
    pub const fn can_afford(&self, amount: Money) -> bool {
        self.funds >= amount
    }

    /// Lock the agent up at the jail position.
    pub fn imprison(&mut self, jail: usize) {
        self.in_jail = true;
        self.jail_turns = 0;
        self.position = jail;
    }

    /// Let the agent out of jail, resetting the attempt counter.
    pub fn release(&mut self) {
        self.in_jail = false;
        self.jail_turns = 0;
    }

    /// Mark the agent as out of the game.
    pub fn eliminate(&mut self) {
        self.alive = false;
        self.in_jail = false;
        self.rent_multiplier = 1;
    }

    /// Record a newly owned space, keeping holdings in display order.
    pub fn acquire<'a>(&mut self, position: usize, lookup: impl Fn(usize) -> &'a Space) {
        self.holdings.push(position);
        self.holdings.sort_by_key(|p| holding_key(lookup(*p)));
    }
}

/// Display order of a holding: terrains first, then railroads, then
/// companies, each by position.
#[must_use]
pub fn holding_key(space: &Space) -> (u8, usize) {
    let rank = match space.space_type() {
        SpaceType::Terrain => 0,
        SpaceType::Railroad => 1,
        SpaceType::Company => 2,
        _ => 3,
    };
    (rank, space.position)
}
