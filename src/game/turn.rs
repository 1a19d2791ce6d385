//! The turn state machine.
//!
//! A turn is a loop of choice and action: the presenter picks one of the
//! actions [`Game::available_actions`] offers, [`Game::apply_action`]
//! carries it out, and the loop repeats until the agent finishes or goes
//! bankrupt.

use serde::Serialize;
use tracing::debug;

use crate::error::{EngineResult, GameError, InvariantViolation};
use crate::game::{AgentId, Game, Roll};
use crate::presenter::{JailReason, Message, Presenter, Question};

/// Per-turn variables, created at turn start and dropped at turn end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnState {
    /// Another roll is allowed.
    pub can_roll: bool,
    /// The presenter should redraw before the next choice.
    pub refresh: bool,
    /// The agent rolled at least once this turn.
    pub has_rolled: bool,
    /// Consecutive doubles rolled this turn.
    pub doubles: u8,
}

impl TurnState {
    /// State at the start of a turn: one roll allowed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            can_roll: true,
            refresh: false,
            has_rolled: false,
            doubles: 0,
        }
    }
}

impl Default for TurnState {
    fn default() -> Self {
        Self::new()
    }
}

/// Kinds of action offered to an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Roll and move.
    Roll,
    /// Try to roll a double out of jail.
    RollFromJail,
    /// Pay bail, then roll and move.
    PayBail,
    /// Spend a get-out-of-jail card, then roll and move.
    UseJailCard,
    /// Buy the space the agent stands on.
    Buy,
    /// Mortgage an owned space.
    Mortgage,
    /// Lift a mortgage.
    LiftMortgage,
    /// Build a house or hotel.
    Build,
    /// End the turn.
    Finish,
}

/// An action with its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnAction {
    /// Roll the dice and move.
    Roll,
    /// Try for a double to leave jail.
    RollFromJail,
    /// Pay bail, then roll once.
    PayBail,
    /// Spend a get-out-of-jail card, then roll once.
    UseJailCard,
    /// Buy the space the agent stands on.
    Buy,
    /// Mortgage the owned space at this position.
    Mortgage(usize),
    /// Lift the mortgage on the space at this position.
    LiftMortgage(usize),
    /// Improve the terrain at `position`.
    Build {
        /// Terrain position.
        position: usize,
        /// Build a hotel instead of a house.
        hotel: bool,
    },
    /// End the turn.
    Finish,
}

impl TurnAction {
    /// The kind this action belongs to.
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Roll => ActionKind::Roll,
            Self::RollFromJail => ActionKind::RollFromJail,
            Self::PayBail => ActionKind::PayBail,
            Self::UseJailCard => ActionKind::UseJailCard,
            Self::Buy => ActionKind::Buy,
            Self::Mortgage(_) => ActionKind::Mortgage,
            Self::LiftMortgage(_) => ActionKind::LiftMortgage,
            Self::Build { .. } => ActionKind::Build,
            Self::Finish => ActionKind::Finish,
        }
    }
}

/// Whether the turn goes on after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnFlow {
    /// Offer the next choice.
    Continue,
    /// The agent ended the turn.
    Finished,
}

impl Game {
    /// Actions open to `agent` in the current turn state, in menu order.
    #[must_use]
    pub fn available_actions(&self, agent: AgentId, state: &TurnState) -> Vec<ActionKind> {
        let Some(a) = self.agent(agent) else {
            return Vec::new();
        };
        if !a.alive {
            return Vec::new();
        }

        let mut actions = Vec::new();
        if a.in_jail {
            if !state.has_rolled {
                actions.push(ActionKind::RollFromJail);
                if a.can_afford(self.rules.bail) {
                    actions.push(ActionKind::PayBail);
                }
                if a.jail_cards > 0 {
                    actions.push(ActionKind::UseJailCard);
                }
            }
        } else if state.can_roll {
            actions.push(ActionKind::Roll);
        }

        if self.purchase_offer(agent).is_some() {
            actions.push(ActionKind::Buy);
        }
        for kind in [ActionKind::Mortgage, ActionKind::LiftMortgage, ActionKind::Build] {
            if !self.candidates(agent, kind).is_empty() {
                actions.push(kind);
            }
        }
        if state.has_rolled {
            actions.push(ActionKind::Finish);
        }
        actions
    }

    /// Carry out one action.
    ///
    /// A bankruptcy is settled here, according to the rules' policy,
    /// before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation::ActionUnavailable`] for an action not
    /// currently offered, a [`crate::error::RuleViolation`] for a refused
    /// one, and [`GameError::Bankrupt`] if the action bankrupted the agent.
    pub fn apply_action(
        &mut self,
        agent: AgentId,
        state: &mut TurnState,
        action: TurnAction,
        presenter: &mut dyn Presenter,
    ) -> EngineResult<TurnFlow> {
        if !self.available_actions(agent, state).contains(&action.kind()) {
            return Err(InvariantViolation::ActionUnavailable.into());
        }
        debug!(agent, action = ?action, "action");
        let result = self.perform(agent, state, action, presenter);
        if let Err(GameError::Bankrupt { agent: bankrupt }) = result {
            self.settle_bankruptcy(bankrupt, presenter);
        }
        result
    }

    fn perform(
        &mut self,
        agent: AgentId,
        state: &mut TurnState,
        action: TurnAction,
        presenter: &mut dyn Presenter,
    ) -> EngineResult<TurnFlow> {
        match action {
            TurnAction::Roll => self.roll_turn(agent, state, presenter)?,
            TurnAction::RollFromJail => self.roll_from_jail(agent, state, presenter)?,
            TurnAction::PayBail => {
                let amount = self.rules.bail;
                self.check_afford(agent, amount)?;
                presenter.announce(self, agent, &Message::PaidBail { amount });
                self.pay(agent, amount, None)?;
                self.leave_jail(agent, state, presenter)?;
            }
            TurnAction::UseJailCard => {
                let a = self.agent_entry(agent)?;
                a.jail_cards = a.jail_cards.saturating_sub(1);
                presenter.announce(self, agent, &Message::UsedJailCard);
                self.leave_jail(agent, state, presenter)?;
            }
            TurnAction::Buy => {
                if let Some((position, price)) = self.purchase_offer(agent)
                    && presenter.confirm(self, agent, &Question::Buy { position, price })
                {
                    self.buy(agent, presenter)?;
                    state.refresh = true;
                }
            }
            TurnAction::Mortgage(position) => {
                self.mortgage(agent, position, presenter)?;
                state.refresh = true;
            }
            TurnAction::LiftMortgage(position) => {
                self.lift_mortgage(agent, position, presenter)?;
                state.refresh = true;
            }
            TurnAction::Build { position, hotel } => {
                self.build(agent, position, hotel, presenter)?;
                state.refresh = true;
            }
            TurnAction::Finish => return Ok(TurnFlow::Finished),
        }
        Ok(TurnFlow::Continue)
    }

    fn roll_turn(
        &mut self,
        agent: AgentId,
        state: &mut TurnState,
        presenter: &mut dyn Presenter,
    ) -> EngineResult<()> {
        let roll = self.roll_and_announce(agent, presenter);
        state.has_rolled = true;
        state.can_roll = false;
        if roll.double {
            state.doubles += 1;
        }

        state.refresh |= self.play(agent, &roll, presenter)?;
        if roll.double && state.doubles >= self.rules.max_doubles {
            if !self.agent_ref(agent)?.in_jail {
                let message = Message::WentToJail {
                    reason: JailReason::Doubles,
                };
                presenter.announce(self, agent, &message);
                self.go_to_jail(agent)?;
            }
            state.refresh = true;
            return Ok(());
        }

        if roll.double && !self.agent_ref(agent)?.in_jail {
            state.can_roll = true;
            presenter.announce(self, agent, &Message::PlayAgain);
        }
        Ok(())
    }

    fn roll_from_jail(
        &mut self,
        agent: AgentId,
        state: &mut TurnState,
        presenter: &mut dyn Presenter,
    ) -> EngineResult<()> {
        state.has_rolled = true;
        state.can_roll = false;

        if self.agent_ref(agent)?.jail_turns >= self.rules.max_jail_turns {
            let amount = self.rules.bail;
            presenter.announce(self, agent, &Message::ForcedBail { amount });
            self.pay(agent, amount, None)?;
            return self.leave_jail(agent, state, presenter);
        }

        let roll = self.roll_and_announce(agent, presenter);
        if roll.double {
            self.agent_entry(agent)?.release();
            presenter.announce(self, agent, &Message::Released);
            state.refresh |= self.play(agent, &roll, presenter)?;
            return Ok(());
        }

        let a = self.agent_entry(agent)?;
        a.jail_turns += 1;
        let attempts = a.jail_turns;
        presenter.announce(self, agent, &Message::JailAttemptFailed { attempts });
        Ok(())
    }

    /// Release, then roll once and move whatever the roll shows.
    fn leave_jail(
        &mut self,
        agent: AgentId,
        state: &mut TurnState,
        presenter: &mut dyn Presenter,
    ) -> EngineResult<()> {
        self.agent_entry(agent)?.release();
        presenter.announce(self, agent, &Message::Released);
        state.has_rolled = true;
        state.can_roll = false;
        let roll = self.roll_and_announce(agent, presenter);
        state.refresh |= self.play(agent, &roll, presenter)?;
        Ok(())
    }

    fn roll_and_announce(&mut self, agent: AgentId, presenter: &mut dyn Presenter) -> Roll {
        let roll = self.roll_dice(presenter);
        debug!(agent, total = roll.total, double = roll.double, "rolled");
        let message = Message::Rolled {
            faces: roll.faces.clone(),
            total: roll.total,
            double: roll.double,
        };
        presenter.announce(self, agent, &message);
        roll
    }

    /// Turn an offered action kind into a full action, asking the
    /// presenter for a space where one is needed. `None` means the agent
    /// cancelled.
    fn select_action(
        &self,
        agent: AgentId,
        kind: ActionKind,
        presenter: &mut dyn Presenter,
    ) -> EngineResult<Option<TurnAction>> {
        let action = match kind {
            ActionKind::Roll => TurnAction::Roll,
            ActionKind::RollFromJail => TurnAction::RollFromJail,
            ActionKind::PayBail => TurnAction::PayBail,
            ActionKind::UseJailCard => TurnAction::UseJailCard,
            ActionKind::Buy => TurnAction::Buy,
            ActionKind::Finish => TurnAction::Finish,
            ActionKind::Mortgage | ActionKind::LiftMortgage | ActionKind::Build => {
                let candidates = self.candidates(agent, kind);
                let Some(index) = presenter.choose_space(self, agent, kind, &candidates) else {
                    return Ok(None);
                };
                let position = *candidates.get(index).ok_or(InvariantViolation::ChoiceOutOfRange {
                    index,
                    len: candidates.len(),
                })?;
                match kind {
                    ActionKind::Mortgage => TurnAction::Mortgage(position),
                    ActionKind::LiftMortgage => TurnAction::LiftMortgage(position),
                    _ => {
                        let max_houses = self.rules.max_houses;
                        let hotel = self
                            .board
                            .space(position)
                            .terrain()
                            .is_some_and(|t| t.houses >= max_houses);
                        TurnAction::Build { position, hotel }
                    }
                }
            }
        };
        Ok(Some(action))
    }

    /// Run one agent's whole turn.
    ///
    /// Refused actions are announced and the turn goes on. A bankruptcy
    /// ends the turn and is not an error here.
    ///
    /// # Errors
    ///
    /// Returns an [`InvariantViolation`] if the presenter picks an option
    /// that does not exist.
    pub fn play_turn(&mut self, agent: AgentId, presenter: &mut dyn Presenter) -> EngineResult<()> {
        if !self.agent_ref(agent)?.alive {
            return Ok(());
        }
        presenter.announce(self, agent, &Message::TurnStarted { round: self.round });

        let mut state = TurnState::new();
        loop {
            if std::mem::take(&mut state.refresh) {
                presenter.refresh(self, agent);
            }
            let options = self.available_actions(agent, &state);
            if options.is_empty() {
                break;
            }
            let index = presenter.present_choice(self, agent, &options);
            let kind = *options.get(index).ok_or(InvariantViolation::ChoiceOutOfRange {
                index,
                len: options.len(),
            })?;
            let Some(action) = self.select_action(agent, kind, presenter)? else {
                continue;
            };

            match self.apply_action(agent, &mut state, action, presenter) {
                Ok(TurnFlow::Continue) => {}
                Ok(TurnFlow::Finished) | Err(GameError::Bankrupt { .. }) => break,
                Err(GameError::Rule(reason)) => {
                    presenter.announce(self, agent, &Message::Refused { reason });
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDeck, DeckKind};
    use crate::game::GameConfig;
    use crate::presenter::AutoPilot;

    /// A game whose decks are empty, so card spaces do nothing.
    fn quiet_game() -> Game {
        Game::new(GameConfig::new(2, 5))
            .unwrap()
            .with_decks(
                CardDeck::new(DeckKind::Chance, Vec::new()),
                CardDeck::new(DeckKind::CommunityChest, Vec::new()),
            )
            .unwrap()
    }

    /// Picks options by kind from a fixed script, then finishes.
    struct Script {
        picks: Vec<ActionKind>,
        messages: Vec<Message>,
    }

    impl Script {
        fn new(picks: &[ActionKind]) -> Self {
            Self {
                picks: picks.iter().rev().copied().collect(),
                messages: Vec::new(),
            }
        }
    }

    impl Presenter for Script {
        fn announce(&mut self, _game: &Game, _agent: AgentId, message: &Message) {
            self.messages.push(message.clone());
        }

        fn present_choice(
            &mut self,
            _game: &Game,
            _agent: AgentId,
            options: &[ActionKind],
        ) -> usize {
            let wanted = self.picks.pop().unwrap_or(ActionKind::Finish);
            options.iter().position(|o| *o == wanted).unwrap_or(options.len())
        }

        fn present_number_choice(
            &mut self,
            _game: &Game,
            _agent: AgentId,
            _min: usize,
            _max: usize,
        ) -> usize {
            1
        }

        fn confirm(&mut self, _game: &Game, _agent: AgentId, _question: &Question) -> bool {
            true
        }
    }

    #[test]
    fn test_turn_starts_with_roll_only() {
        let game = quiet_game();
        let state = TurnState::new();
        assert_eq!(game.available_actions(1, &state), vec![ActionKind::Roll]);
    }

    #[test]
    fn test_plain_roll_offers_finish() {
        let mut game = quiet_game();
        let mut pilot = AutoPilot::default();
        let mut state = TurnState::new();
        game.queue_rolls([vec![2, 4]]);
        let flow = game.apply_action(1, &mut state, TurnAction::Roll, &mut pilot).unwrap();
        assert_eq!(flow, TurnFlow::Continue);
        assert_eq!(game.agent(1).unwrap().position, 6);
        let actions = game.available_actions(1, &state);
        assert!(!actions.contains(&ActionKind::Roll));
        assert!(actions.contains(&ActionKind::Buy));
        assert!(actions.contains(&ActionKind::Finish));
    }

    #[test]
    fn test_double_grants_another_roll() {
        let mut game = quiet_game();
        let mut pilot = AutoPilot::default().recording();
        let mut state = TurnState::new();
        game.queue_rolls([vec![3, 3]]);
        game.apply_action(1, &mut state, TurnAction::Roll, &mut pilot).unwrap();
        assert!(state.can_roll);
        assert_eq!(state.doubles, 1);
        assert!(game.available_actions(1, &state).contains(&ActionKind::Roll));
        assert!(pilot.messages().iter().any(|(_, m)| *m == Message::PlayAgain));
    }

    #[test]
    fn test_third_double_goes_to_jail() {
        let mut game = quiet_game();
        let mut pilot = AutoPilot::default();
        let mut state = TurnState::new();
        game.queue_rolls([vec![1, 1], vec![2, 2], vec![3, 3]]);
        for _ in 0..3 {
            game.apply_action(1, &mut state, TurnAction::Roll, &mut pilot).unwrap();
        }
        let agent = game.agent(1).unwrap();
        assert!(agent.in_jail);
        assert_eq!(agent.position, 10);
        assert!(!state.can_roll);
        assert_eq!(game.available_actions(1, &state), vec![ActionKind::Finish]);
    }

    #[test]
    fn test_finish_needs_a_roll() {
        let mut game = quiet_game();
        let mut pilot = AutoPilot::default();
        let mut state = TurnState::new();
        let err = game
            .apply_action(1, &mut state, TurnAction::Finish, &mut pilot)
            .unwrap_err();
        assert!(matches!(
            err,
            GameError::Invariant(InvariantViolation::ActionUnavailable)
        ));
    }

    #[test]
    fn test_jail_escape_attempts() {
        let mut game = quiet_game();
        let mut pilot = AutoPilot::default();
        game.go_to_jail(1).unwrap();

        let mut state = TurnState::new();
        let offered = game.available_actions(1, &state);
        assert_eq!(offered, vec![ActionKind::RollFromJail, ActionKind::PayBail]);

        game.queue_rolls([vec![1, 2]]);
        game.apply_action(1, &mut state, TurnAction::RollFromJail, &mut pilot)
            .unwrap();
        assert!(game.agent(1).unwrap().in_jail);
        assert_eq!(game.agent(1).unwrap().jail_turns, 1);
        assert_eq!(game.available_actions(1, &state), vec![ActionKind::Finish]);

        let mut state = TurnState::new();
        game.queue_rolls([vec![4, 4]]);
        game.apply_action(1, &mut state, TurnAction::RollFromJail, &mut pilot)
            .unwrap();
        let agent = game.agent(1).unwrap();
        assert!(!agent.in_jail);
        assert_eq!(agent.position, 18);
        assert!(!state.can_roll);
    }

    #[test]
    fn test_forced_bail_after_failed_attempts() {
        let mut game = quiet_game();
        let mut pilot = AutoPilot::default();
        game.go_to_jail(1).unwrap();
        game.agent_mut(1).unwrap().jail_turns = 3;
        let mut state = TurnState::new();
        game.queue_rolls([vec![1, 2]]);
        game.apply_action(1, &mut state, TurnAction::RollFromJail, &mut pilot)
            .unwrap();
        let agent = game.agent(1).unwrap();
        assert!(!agent.in_jail);
        assert_eq!(agent.position, 13);
        assert_eq!(agent.funds, 1450);
    }

    #[test]
    fn test_pay_bail_and_jail_card() {
        let mut game = quiet_game();
        let mut pilot = AutoPilot::default();
        game.go_to_jail(1).unwrap();
        let mut state = TurnState::new();
        game.queue_rolls([vec![1, 3]]);
        game.apply_action(1, &mut state, TurnAction::PayBail, &mut pilot).unwrap();
        assert_eq!(game.agent(1).unwrap().position, 14);
        assert_eq!(game.agent(1).unwrap().funds, 1450);

        game.go_to_jail(2).unwrap();
        game.agent_mut(2).unwrap().jail_cards = 1;
        let mut state = TurnState::new();
        assert!(game.available_actions(2, &state).contains(&ActionKind::UseJailCard));
        game.queue_rolls([vec![2, 2]]);
        game.apply_action(2, &mut state, TurnAction::UseJailCard, &mut pilot)
            .unwrap();
        let agent = game.agent(2).unwrap();
        assert!(!agent.in_jail);
        assert_eq!(agent.jail_cards, 0);
        assert_eq!(agent.position, 14);
        assert!(!state.can_roll);
    }

    #[test]
    fn test_autopilot_turn_buys_and_finishes() {
        let mut game = quiet_game();
        let mut pilot = AutoPilot::default();
        game.queue_rolls([vec![1, 2]]);
        game.play_turn(1, &mut pilot).unwrap();
        let agent = game.agent(1).unwrap();
        assert_eq!(agent.position, 3);
        assert_eq!(agent.holdings, vec![3]);
        assert_eq!(agent.funds, 1440);
        assert_eq!(game.queued_rolls(), 0);
    }

    #[test]
    fn test_refused_action_keeps_turn_going() {
        let mut game = quiet_game();
        game.board.space_mut(1).deed_mut().unwrap().owner = Some(1);
        game.agent_mut(1).unwrap().holdings.push(1);
        game.board.space_mut(1).deed_mut().unwrap().mortgaged = true;
        game.agent_mut(1).unwrap().funds = 10;

        let mut script = Script::new(&[ActionKind::LiftMortgage, ActionKind::Roll]);
        game.queue_rolls([vec![1, 4]]);
        game.play_turn(1, &mut script).unwrap();
        assert!(script.messages.iter().any(|m| matches!(m, Message::Refused { .. })));
        assert_eq!(game.agent(1).unwrap().position, 5);
    }

    #[test]
    fn test_bad_choice_is_an_invariant_violation() {
        let mut game = quiet_game();
        let mut script = Script::new(&[ActionKind::Build]);
        let err = game.play_turn(1, &mut script).unwrap_err();
        assert!(matches!(
            err,
            GameError::Invariant(InvariantViolation::ChoiceOutOfRange { index: 1, len: 1 })
        ));
    }

    #[test]
    fn test_bankruptcy_ends_turn() {
        let mut game = quiet_game();
        let mut pilot = AutoPilot::default().recording();
        game.agent_mut(1).unwrap().funds = 100;
        game.queue_rolls([vec![1, 3]]);
        game.play_turn(1, &mut pilot).unwrap();
        assert!(!game.agent(1).unwrap().alive);
        assert!(
            pilot
                .messages()
                .iter()
                .any(|(_, m)| matches!(m, Message::Bankrupt { .. }))
        );
        assert!(game.available_actions(1, &TurnState::new()).is_empty());
    }
}
