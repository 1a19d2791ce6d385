//! Error types for the game engine.
//!
//! Failures fall into four classes with different handling:
//! - [`LoadError`]: bad or missing board data, fatal before a game exists.
//! - [`InvariantViolation`]: an action the engine should never have been
//!   asked to perform. These are programming defects.
//! - [`RuleViolation`]: a legal-looking request the rules refuse. Reported
//!   to the agent, the turn continues.
//! - [`GameError::Bankrupt`]: a forced payment drove an agent below zero.
//!   Ends that agent's turn, the game continues.

use serde::Serialize;
use thiserror::Error;

use crate::game::AgentId;

/// Errors raised while loading a board layout or terrain table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The named layout does not exist.
    #[error("board layout '{0}' not found")]
    NotFound(String),
    /// A layout line names a space type the engine does not know.
    #[error("line {line}: unknown space type '{kind}'")]
    UnknownSpaceType {
        /// 1-based line number in the layout source.
        line: usize,
        /// The offending type token.
        kind: String,
    },
    /// A group/id reference is missing or not a number.
    #[error("line {line}: malformed reference '{text}'")]
    MalformedReference {
        /// 1-based line number in the source.
        line: usize,
        /// The text that failed to parse.
        text: String,
    },
    /// A terrain row has the wrong number of columns or a non-numeric value.
    #[error("line {line}: malformed terrain row")]
    MalformedTerrainRow {
        /// 1-based line number in the terrain table.
        line: usize,
    },
    /// The layout references a terrain with no economics row.
    #[error("no terrain data for {group}:{id}")]
    MissingTerrainData {
        /// 1-based group number.
        group: u8,
        /// 1-based id within the group.
        id: u8,
    },
    /// A tax space references an amount the rules do not define.
    #[error("tax {id} has no amount in the rules")]
    UnknownTax {
        /// 1-based tax id.
        id: u8,
    },
    /// A railroad id exceeds the rent table.
    #[error("railroad {id} exceeds the railroad rent table")]
    UnknownRailroad {
        /// 1-based railroad id.
        id: u8,
    },
    /// A company id exceeds the company multiplier table.
    #[error("company {id} exceeds the company multiplier table")]
    UnknownCompany {
        /// 1-based company id.
        id: u8,
    },
    /// A space that must exist exactly once is absent.
    #[error("layout has no {0} space")]
    MissingSpace(&'static str),
    /// A space that must exist exactly once appears more than once.
    #[error("layout has more than one {0} space")]
    DuplicateSpace(&'static str),
    /// The same ownable reference appears twice.
    #[error("line {line}: duplicate reference '{text}'")]
    DuplicateReference {
        /// 1-based line number in the layout source.
        line: usize,
        /// The repeated reference.
        text: String,
    },
    /// A card sends agents to a space the layout does not have.
    #[error("card destination {0} does not exist on this board")]
    UnknownDestination(String),
    /// Reading a layout from disk failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that could not be read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Programming defects: requests that valid input can never produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// The action is not permitted in the current turn state.
    #[error("action not available in the current turn state")]
    ActionUnavailable,
    /// The position does not hold an ownable space.
    #[error("space {0} is not ownable")]
    NotOwnable(usize),
    /// The position does not hold a terrain.
    #[error("space {0} is not a terrain")]
    NotTerrain(usize),
    /// A lookup named a space the board does not have.
    #[error("no such space on the board")]
    NoSuchSpace,
    /// Rent was requested on a space with no owner.
    #[error("rent requested on unowned space {0}")]
    RentOnUnowned(usize),
    /// A die was stepped while not rolling.
    #[error("die stepped while not rolling")]
    DiceNotRolling,
    /// No agent with this id takes part in the game.
    #[error("unknown agent {0}")]
    UnknownAgent(AgentId),
    /// A presenter answered with an index outside the offered options.
    #[error("choice {index} out of range for {len} options")]
    ChoiceOutOfRange {
        /// Index returned by the presenter.
        index: usize,
        /// Number of options offered.
        len: usize,
    },
}

/// Actions the rules refuse. The agent is told and the turn goes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum RuleViolation {
    /// The space is owned already or cannot be bought.
    #[error("space is not for sale")]
    NotForSale,
    /// The agent does not own the space.
    #[error("space is not owned by this agent")]
    NotOwner,
    /// The space is mortgaged already.
    #[error("space is already mortgaged")]
    AlreadyMortgaged,
    /// Lifting a mortgage that does not exist.
    #[error("space is not mortgaged")]
    NotMortgaged,
    /// Building requires owning the whole color group.
    #[error("the whole color group must be owned to build")]
    IncompleteGroup,
    /// No more houses or hotels fit on this terrain.
    #[error("improvement limit reached")]
    ImprovementLimit,
    /// Improved terrain cannot be mortgaged.
    #[error("space has improvements")]
    HasImprovements,
    /// Mortgaged terrain cannot be improved.
    #[error("space is mortgaged")]
    Mortgaged,
    /// The agent cannot cover a voluntary expense.
    #[error("cannot afford {cost} with {funds}")]
    CannotAfford {
        /// Price of the action.
        cost: i64,
        /// Funds available.
        funds: i64,
    },
}

/// Top-level engine error.
#[derive(Debug, Error)]
pub enum GameError {
    /// Board data could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// The engine was asked to do something impossible.
    #[error("invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),
    /// The rules refused an action.
    #[error("rule violation: {0}")]
    Rule(#[from] RuleViolation),
    /// A forced payment bankrupted the agent.
    #[error("agent {agent} is bankrupt")]
    Bankrupt {
        /// The agent that went bankrupt.
        agent: AgentId,
    },
    /// The agent count is outside the supported range.
    #[error("a game needs {min} to {max} agents, got {count}")]
    AgentCount {
        /// Requested number of agents.
        count: usize,
        /// Fewest agents allowed.
        min: usize,
        /// Most agents allowed.
        max: usize,
    },
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_display() {
        let err = LoadError::UnknownSpaceType {
            line: 3,
            kind: "casino".to_string(),
        };
        assert_eq!(err.to_string(), "line 3: unknown space type 'casino'");
    }

    #[test]
    fn test_rule_violation_wraps_into_game_error() {
        let err: GameError = RuleViolation::NotOwner.into();
        assert!(matches!(err, GameError::Rule(RuleViolation::NotOwner)));
        assert!(err.to_string().contains("not owned"));
    }
}
