//! Game configuration.

use serde::{Deserialize, Serialize};

use crate::board::DEFAULT_LAYOUT;
use crate::rules::Rules;

/// Configuration for a single game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of agents (2 to 8).
    pub agents: u8,
    /// Seed for every roll and shuffle.
    pub seed: u64,
    /// Stop after this many full rounds.
    pub max_rounds: Option<u32>,
    /// Layout name, resolved by a board loader.
    pub layout: String,
    /// Rules and amounts.
    pub rules: Rules,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            agents: 4,
            seed: 0,
            max_rounds: Some(1000),
            layout: DEFAULT_LAYOUT.to_string(),
            rules: Rules::default(),
        }
    }
}

impl GameConfig {
    /// Default configuration with the given agent count and seed.
    #[must_use]
    pub fn new(agents: u8, seed: u64) -> Self {
        Self {
            agents,
            seed,
            ..Self::default()
        }
    }

    /// Set the round limit.
    #[must_use]
    pub fn with_max_rounds(mut self, max_rounds: Option<u32>) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Replace the rules.
    #[must_use]
    pub fn with_rules(mut self, rules: Rules) -> Self {
        self.rules = rules;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.agents, 4);
        assert_eq!(config.layout, "usa");
        assert_eq!(config.max_rounds, Some(1000));
        assert_eq!(config.rules.starting_funds, 1500);
    }

    #[test]
    fn test_builders() {
        let config = GameConfig::new(2, 9).with_max_rounds(None);
        assert_eq!(config.agents, 2);
        assert_eq!(config.seed, 9);
        assert_eq!(config.max_rounds, None);
    }
}
