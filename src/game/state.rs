//! Game state management.

use std::collections::VecDeque;
use std::time::Duration;

use rand::SeedableRng;
use tracing::{debug, trace};

use crate::GameRng;
use crate::board::{Board, BoardLoader, BuiltinLoader, SpaceType};
use crate::cards::{CardDeck, CardEffect, DeckKind, Destination};
use crate::dice::DiceEnsemble;
use crate::error::{EngineResult, GameError, InvariantViolation, LoadError};
use crate::game::{Agent, AgentId, GameConfig, MAX_AGENTS, MIN_AGENTS};
use crate::presenter::Presenter;
use crate::rules::{Money, Rules};

/// Final faces of one dice roll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roll {
    /// Face of each die.
    pub faces: Vec<u8>,
    /// Sum of the faces.
    pub total: u32,
    /// Exactly two dice showing the same face.
    pub double: bool,
}

impl Roll {
    /// Build a roll from final faces.
    #[must_use]
    pub fn from_faces(faces: Vec<u8>) -> Self {
        let total = faces.iter().map(|f| u32::from(*f)).sum();
        let double = matches!(faces.as_slice(), [a, b] if a == b);
        Self {
            faces,
            total,
            double,
        }
    }
}

/// Complete game state.
///
/// Owns the board, the agents, both decks, the dice and the single random
/// source every roll and shuffle draws from.
#[derive(Debug, Clone)]
pub struct Game {
    pub(crate) board: Board,
    pub(crate) agents: Vec<Agent>,
    pub(crate) chance: CardDeck,
    pub(crate) community_chest: CardDeck,
    pub(crate) dice: DiceEnsemble,
    pub(crate) rng: GameRng,
    pub(crate) rules: Rules,
    pub(crate) round: u32,
    seed: u64,
    max_rounds: Option<u32>,
    queued_rolls: VecDeque<Vec<u8>>,
    roll_time: Duration,
}

impl Game {
    /// Create a game on a built-in layout.
    ///
    /// # Errors
    ///
    /// Returns an error if the layout cannot be loaded or the agent count
    /// is out of range.
    pub fn new(config: GameConfig) -> EngineResult<Self> {
        Self::with_loader(config, &BuiltinLoader)
    }

    /// Create a game, resolving the layout through `loader`.
    ///
    /// # Errors
    ///
    /// Returns an error if the layout cannot be loaded or the agent count
    /// is out of range.
    pub fn with_loader(config: GameConfig, loader: &dyn BoardLoader) -> EngineResult<Self> {
        let board = Board::load(loader, &config.layout, &config.rules)?;
        Self::with_board(config, board)
    }

    /// Create a game on an already built board with the standard decks.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::AgentCount`] for fewer than 2 or more than 8
    /// agents, and [`LoadError::UnknownDestination`] if a card points at a
    /// space the board lacks.
    pub fn with_board(config: GameConfig, board: Board) -> EngineResult<Self> {
        let count = usize::from(config.agents);
        if !(MIN_AGENTS..=MAX_AGENTS).contains(&count) {
            return Err(GameError::AgentCount {
                count,
                min: MIN_AGENTS,
                max: MAX_AGENTS,
            });
        }

        let start = board.start_position();
        let agents = (1..=config.agents)
            .map(|id| {
                let mut agent = Agent::new(id, config.rules.starting_funds);
                agent.position = start;
                agent
            })
            .collect();

        let mut game = Self {
            board,
            agents,
            chance: CardDeck::chance(),
            community_chest: CardDeck::community_chest(),
            dice: DiceEnsemble::pair(),
            rng: GameRng::seed_from_u64(config.seed),
            rules: config.rules,
            round: 0,
            seed: config.seed,
            max_rounds: config.max_rounds,
            queued_rolls: VecDeque::new(),
            roll_time: Duration::ZERO,
        };
        game.prepare_decks()?;
        debug!(seed = game.seed, agents = count, spaces = game.board.len(), "game created");
        Ok(game)
    }

    /// Replace both decks and shuffle them.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::UnknownDestination`] if a card points at a
    /// space the board lacks.
    pub fn with_decks(mut self, chance: CardDeck, community_chest: CardDeck) -> EngineResult<Self> {
        self.chance = chance;
        self.community_chest = community_chest;
        self.prepare_decks()?;
        Ok(self)
    }

    /// Check both decks against the board, then shuffle them.
    fn prepare_decks(&mut self) -> Result<(), LoadError> {
        self.validate_deck(&self.chance)?;
        self.validate_deck(&self.community_chest)?;
        self.chance.shuffle(&mut self.rng);
        self.community_chest.shuffle(&mut self.rng);
        Ok(())
    }

    fn validate_deck(&self, deck: &CardDeck) -> Result<(), LoadError> {
        for effect in (0..deck.len()).filter_map(|i| deck.card(i)) {
            match effect {
                CardEffect::Teleport(destination) => {
                    if self.resolve_destination(destination).is_none() {
                        return Err(LoadError::UnknownDestination(format!("{destination:?}")));
                    }
                }
                CardEffect::TeleportNearest(kind)
                | CardEffect::SetRentMultiplierThenGoNearest { kind, .. } => {
                    if self.board.count_type(kind) == 0 {
                        return Err(LoadError::UnknownDestination(format!(
                            "nearest {}",
                            kind.token()
                        )));
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Board position a teleport card sends agents to.
    #[must_use]
    pub fn resolve_destination(&self, destination: Destination) -> Option<usize> {
        match destination {
            Destination::Position(p) => (p < self.board.len()).then_some(p),
            Destination::Terrain { group, id } => self.board.terrain_position(group, id),
            Destination::Railroad(id) => self.board.railroad_position(id),
        }
    }

    /// The board.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// The rules in force.
    #[must_use]
    pub const fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Every agent, dead or alive, in turn order.
    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// An agent by id.
    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(usize::from(id).checked_sub(1)?)
    }

    /// Mutable access to an agent, for setting up scenarios.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(usize::from(id).checked_sub(1)?)
    }

    pub(crate) fn agent_entry(&mut self, id: AgentId) -> Result<&mut Agent, InvariantViolation> {
        self.agent_mut(id).ok_or(InvariantViolation::UnknownAgent(id))
    }

    pub(crate) fn agent_ref(&self, id: AgentId) -> Result<&Agent, InvariantViolation> {
        self.agent(id).ok_or(InvariantViolation::UnknownAgent(id))
    }

    /// A deck by kind.
    #[must_use]
    pub const fn deck(&self, kind: DeckKind) -> &CardDeck {
        match kind {
            DeckKind::Chance => &self.chance,
            DeckKind::CommunityChest => &self.community_chest,
        }
    }

    /// Seed the game was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Rounds started so far.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Round limit, if any.
    #[must_use]
    pub const fn max_rounds(&self) -> Option<u32> {
        self.max_rounds
    }

    /// Ids of agents still in the game.
    pub fn living_agents(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.agents.iter().filter(|a| a.alive).map(|a| a.id)
    }

    /// Number of agents still in the game.
    #[must_use]
    pub fn living_count(&self) -> usize {
        self.agents.iter().filter(|a| a.alive).count()
    }

    /// Check if the game is over.
    #[must_use]
    pub fn is_over(&self) -> bool {
        // Round limit reached
        if self.max_rounds.is_some_and(|max| self.round >= max) {
            return true;
        }

        // One solvent agent (or none) left
        self.living_count() <= 1
    }

    /// Funds plus the value of everything the agent owns.
    #[must_use]
    pub fn net_worth(&self, id: AgentId) -> Option<Money> {
        let agent = self.agent(id)?;
        Some(agent.funds + self.board.property_value(id))
    }

    /// Pause given to the dice animation of each roll.
    pub fn set_roll_time(&mut self, roll_time: Duration) {
        self.roll_time = roll_time;
    }

    /// Load predetermined dice faces, consumed in order before any
    /// physical roll.
    pub fn queue_rolls<I>(&mut self, rolls: I)
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        self.queued_rolls.extend(rolls);
    }

    /// Number of queued rolls not yet consumed.
    #[must_use]
    pub fn queued_rolls(&self) -> usize {
        self.queued_rolls.len()
    }

    /// Roll the dice, or take the next queued roll.
    pub(crate) fn roll_dice(&mut self, presenter: &mut dyn Presenter) -> Roll {
        if let Some(faces) = self.queued_rolls.pop_front() {
            return Roll::from_faces(faces);
        }
        let samples = self.dice.roll_to_rest(&mut self.rng, self.roll_time);
        trace!(samples = samples.len(), "dice settled");
        presenter.animate_dice(&samples);
        Roll::from_faces(self.dice.values())
    }

    /// Number of spaces of a type the agent owns.
    #[must_use]
    pub fn owned_count(&self, id: AgentId, kind: SpaceType) -> usize {
        self.board.count_owned(id, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{parse_layout, parse_terrains};
    use crate::presenter::AutoPilot;

    #[test]
    fn test_roll_from_faces() {
        let roll = Roll::from_faces(vec![3, 3]);
        assert_eq!(roll.total, 6);
        assert!(roll.double);
        assert!(!Roll::from_faces(vec![3, 4]).double);
        assert!(!Roll::from_faces(vec![2, 2, 2]).double);
    }

    #[test]
    fn test_new_game() {
        let game = Game::new(GameConfig::new(4, 7)).unwrap();
        assert_eq!(game.agents().len(), 4);
        assert_eq!(game.agent(4).unwrap().id, 4);
        assert!(game.agent(0).is_none());
        assert!(game.agent(5).is_none());
        assert!(game.agents().iter().all(|a| a.funds == 1500 && a.position == 0));
        assert_eq!(game.deck(DeckKind::Chance).remaining(), 16);
        assert_eq!(game.round(), 0);
        assert!(!game.is_over());
    }

    #[test]
    fn test_standard_decks_shuffled_once_from_seed() {
        let game = Game::new(GameConfig::new(2, 9)).unwrap();
        let mut rng = GameRng::seed_from_u64(9);
        let mut chance = CardDeck::chance();
        chance.shuffle(&mut rng);
        let mut chest = CardDeck::community_chest();
        chest.shuffle(&mut rng);

        let order = |deck: &CardDeck| {
            let mut deck = deck.clone();
            let mut rng = GameRng::seed_from_u64(0);
            (0..deck.len())
                .map(|_| deck.draw(&mut rng).unwrap().index)
                .collect::<Vec<_>>()
        };
        assert_eq!(order(game.deck(DeckKind::Chance)), order(&chance));
        assert_eq!(order(game.deck(DeckKind::CommunityChest)), order(&chest));
    }

    #[test]
    fn test_agent_count_bounds() {
        for count in [0, 1, 9] {
            let err = Game::new(GameConfig::new(count, 0)).unwrap_err();
            assert!(matches!(err, GameError::AgentCount { .. }));
        }
        assert!(Game::new(GameConfig::new(8, 0)).is_ok());
    }

    #[test]
    fn test_unknown_layout() {
        let config = GameConfig {
            layout: "atlantis".to_string(),
            ..GameConfig::default()
        };
        assert!(matches!(
            Game::new(config),
            Err(GameError::Load(LoadError::NotFound(_)))
        ));
    }

    #[test]
    fn test_card_destinations_validated() {
        let layout = parse_layout("start\njail\nterrain 1:1\nchance\n").unwrap();
        let terrains = parse_terrains("1:1 brown 60 2 10 30 90 160 250 50\n").unwrap();
        let board = Board::build(&layout, &terrains, &Rules::default()).unwrap();
        let err = Game::with_board(GameConfig::new(2, 0), board).unwrap_err();
        assert!(matches!(
            err,
            GameError::Load(LoadError::UnknownDestination(_))
        ));
    }

    #[test]
    fn test_queued_rolls_come_first() {
        let mut game = Game::new(GameConfig::new(2, 0)).unwrap();
        let mut pilot = AutoPilot::default();
        game.queue_rolls([vec![6, 6], vec![1, 2]]);
        assert_eq!(game.roll_dice(&mut pilot), Roll::from_faces(vec![6, 6]));
        assert_eq!(game.roll_dice(&mut pilot).total, 3);
        assert_eq!(game.queued_rolls(), 0);
        let physical = game.roll_dice(&mut pilot);
        assert!((2..=12).contains(&physical.total));
    }

    #[test]
    fn test_same_seed_same_dice() {
        let rolls = |seed| {
            let mut game = Game::new(GameConfig::new(2, seed)).unwrap();
            let mut pilot = AutoPilot::default();
            (0..20).map(|_| game.roll_dice(&mut pilot).faces).collect::<Vec<_>>()
        };
        assert_eq!(rolls(5), rolls(5));
        assert_ne!(rolls(5), rolls(6));
    }

    #[test]
    fn test_net_worth_counts_property() {
        let mut game = Game::new(GameConfig::new(2, 0)).unwrap();
        game.board.space_mut(39).deed_mut().unwrap().owner = Some(1);
        game.agent_mut(1).unwrap().holdings.push(39);
        assert_eq!(game.net_worth(1), Some(1500 + 400));
        assert_eq!(game.net_worth(3), None);
    }
}
