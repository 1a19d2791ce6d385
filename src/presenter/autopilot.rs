//! Non-interactive presenter with a fixed scripted policy.

use crate::game::{ActionKind, AgentId, Game};
use crate::presenter::{Message, Presenter, Question};
use crate::rules::Money;

/// Cash an [`AutoPilot`] keeps back unless told otherwise.
pub const DEFAULT_RESERVE: Money = 150;

/// Plays every agent with the same script: leave jail with a card when it
/// has one, buy and build while it keeps a cash reserve, roll whenever
/// allowed, then finish.
///
/// Announced messages are recorded when recording is on.
#[derive(Debug, Clone)]
pub struct AutoPilot {
    reserve: Money,
    record: bool,
    messages: Vec<(AgentId, Message)>,
}

impl Default for AutoPilot {
    fn default() -> Self {
        Self::new(DEFAULT_RESERVE)
    }
}

impl AutoPilot {
    /// A non-recording autopilot keeping `reserve` in cash.
    #[must_use]
    pub const fn new(reserve: Money) -> Self {
        Self {
            reserve,
            record: false,
            messages: Vec::new(),
        }
    }

    /// Turn message recording on.
    #[must_use]
    pub fn recording(mut self) -> Self {
        self.record = true;
        self
    }

    /// Cash kept back.
    #[must_use]
    pub const fn reserve(&self) -> Money {
        self.reserve
    }

    /// Messages recorded so far.
    #[must_use]
    pub fn messages(&self) -> &[(AgentId, Message)] {
        &self.messages
    }

    /// Drain the recorded messages.
    pub fn take_messages(&mut self) -> Vec<(AgentId, Message)> {
        std::mem::take(&mut self.messages)
    }

    fn keeps_reserve(&self, game: &Game, agent: AgentId, cost: Money) -> bool {
        game.agent(agent)
            .is_some_and(|a| a.funds >= cost && a.funds - cost >= self.reserve)
    }

    fn wants_buy(&self, game: &Game, agent: AgentId) -> bool {
        game.purchase_offer(agent)
            .is_some_and(|(_, price)| self.keeps_reserve(game, agent, price))
    }

    /// First candidate of `action` that keeps the reserve.
    fn affordable(&self, game: &Game, agent: AgentId, action: ActionKind) -> Option<usize> {
        game.candidates(agent, action)
            .into_iter()
            .position(|p| {
                game.action_cost(action, p)
                    .is_some_and(|cost| self.keeps_reserve(game, agent, cost))
            })
    }
}

impl Presenter for AutoPilot {
    fn announce(&mut self, _game: &Game, agent: AgentId, message: &Message) {
        if self.record {
            self.messages.push((agent, message.clone()));
        }
    }

    fn present_choice(&mut self, game: &Game, agent: AgentId, options: &[ActionKind]) -> usize {
        let preference = [
            ActionKind::UseJailCard,
            ActionKind::Buy,
            ActionKind::LiftMortgage,
            ActionKind::Build,
            ActionKind::Roll,
            ActionKind::RollFromJail,
            ActionKind::Finish,
        ];

        for wanted in preference {
            let Some(index) = options.iter().position(|o| *o == wanted) else {
                continue;
            };
            let take = match wanted {
                ActionKind::Buy => self.wants_buy(game, agent),
                ActionKind::LiftMortgage | ActionKind::Build => {
                    self.affordable(game, agent, wanted).is_some()
                }
                _ => true,
            };
            if take {
                return index;
            }
        }
        0
    }

    fn present_number_choice(
        &mut self,
        _game: &Game,
        _agent: AgentId,
        min: usize,
        _max: usize,
    ) -> usize {
        min
    }

    fn confirm(&mut self, game: &Game, agent: AgentId, question: &Question) -> bool {
        match question {
            Question::Buy { price, .. } => self.keeps_reserve(game, agent, *price),
        }
    }

    fn choose_space(
        &mut self,
        game: &Game,
        agent: AgentId,
        action: ActionKind,
        candidates: &[usize],
    ) -> Option<usize> {
        match action {
            ActionKind::LiftMortgage | ActionKind::Build => self.affordable(game, agent, action),
            _ if candidates.is_empty() => None,
            _ => Some(0),
        }
    }
}
