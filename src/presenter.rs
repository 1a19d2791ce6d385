//! Contracts between the engine and whatever shows the game.
//!
//! The engine never formats text. It announces structured [`Message`]s,
//! asks for decisions through a [`Presenter`], and leaves wording to a
//! [`Localizer`]. Every call is synchronous: the engine blocks until the
//! presenter answers.

mod autopilot;
mod text;

use serde::Serialize;

pub use autopilot::{AutoPilot, DEFAULT_RESERVE};
pub use text::TextTable;

use crate::cards::DeckKind;
use crate::dice::EnsembleSample;
use crate::error::RuleViolation;
use crate::game::{ActionKind, AgentId, Game};
use crate::rules::Money;

/// Why an agent went to jail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JailReason {
    /// Landed on the go-to-jail space.
    Space,
    /// Drew a go-to-jail card.
    Card,
    /// Rolled too many doubles in one turn.
    Doubles,
}

/// Something that happened, announced to the presenter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum Message {
    /// An agent's turn begins.
    TurnStarted {
        /// Current round, from 1.
        round: u32,
    },
    /// Dice came to rest.
    Rolled {
        /// Final faces.
        faces: Vec<u8>,
        /// Sum of the faces.
        total: u32,
        /// Whether the roll was a double.
        double: bool,
    },
    /// The agent's token moved.
    Moved {
        /// Position before the move.
        from: usize,
        /// Position after the move.
        to: usize,
    },
    /// Salary collected for passing start.
    Salary {
        /// Amount collected.
        amount: Money,
    },
    /// Rent paid to another agent.
    PaidRent {
        /// Space the rent was charged for.
        position: usize,
        /// Agent receiving the rent.
        owner: AgentId,
        /// Rent charged.
        amount: Money,
    },
    /// Tax paid to the bank.
    PaidTax {
        /// Tax space.
        position: usize,
        /// Tax charged.
        amount: Money,
    },
    /// A card was drawn.
    DrewCard {
        /// Deck drawn from.
        deck: DeckKind,
        /// Card index within the deck.
        index: usize,
    },
    /// The agent paid the bank because of a card.
    Paid {
        /// Amount paid.
        amount: Money,
    },
    /// The bank paid the agent because of a card.
    Received {
        /// Amount received.
        amount: Money,
    },
    /// The agent was locked up.
    WentToJail {
        /// What sent them there.
        reason: JailReason,
    },
    /// A roll from jail was not a double.
    JailAttemptFailed {
        /// Failed attempts so far.
        attempts: u8,
    },
    /// Bail was forced after too many failed attempts.
    ForcedBail {
        /// Bail charged.
        amount: Money,
    },
    /// Bail paid voluntarily.
    PaidBail {
        /// Bail charged.
        amount: Money,
    },
    /// A get-out-of-jail card was spent.
    UsedJailCard,
    /// A get-out-of-jail card was kept.
    GotJailCard,
    /// The agent left jail.
    Released,
    /// A double grants another roll.
    PlayAgain,
    /// A space was bought.
    Bought {
        /// Space bought.
        position: usize,
        /// Price paid.
        price: Money,
    },
    /// A space was mortgaged.
    Mortgaged {
        /// Space mortgaged.
        position: usize,
        /// Amount received.
        amount: Money,
    },
    /// A mortgage was lifted.
    MortgageLifted {
        /// Space freed.
        position: usize,
        /// Amount paid.
        amount: Money,
    },
    /// A house or hotel was built.
    Built {
        /// Terrain improved.
        position: usize,
        /// True for a hotel.
        hotel: bool,
        /// Amount paid.
        cost: Money,
    },
    /// The rules refused an action.
    Refused {
        /// Why.
        reason: RuleViolation,
    },
    /// The agent went bankrupt.
    Bankrupt {
        /// Spaces returned to the bank.
        released: Vec<usize>,
    },
    /// The game ended.
    GameOver {
        /// Winning agent, if any.
        winner: Option<AgentId>,
    },
}

/// A message parameter, typed so a localizer can name spaces and cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    /// A plain number.
    Number(i64),
    /// A board position.
    Space(usize),
    /// An agent.
    Agent(AgentId),
    /// A card.
    Card(DeckKind, usize),
    /// Preformatted text.
    Text(String),
}

impl Message {
    /// Localization key.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::TurnStarted { .. } => "turn_started",
            Self::Rolled { double: true, .. } => "rolled_double",
            Self::Rolled { .. } => "rolled",
            Self::Moved { .. } => "moved",
            Self::Salary { .. } => "salary",
            Self::PaidRent { .. } => "paid_rent",
            Self::PaidTax { .. } => "paid_tax",
            Self::DrewCard { .. } => "drew_card",
            Self::Paid { .. } => "paid",
            Self::Received { .. } => "received",
            Self::WentToJail {
                reason: JailReason::Doubles,
            } => "jail_doubles",
            Self::WentToJail { .. } => "went_to_jail",
            Self::JailAttemptFailed { .. } => "jail_attempt_failed",
            Self::ForcedBail { .. } => "forced_bail",
            Self::PaidBail { .. } => "paid_bail",
            Self::UsedJailCard => "used_jail_card",
            Self::GotJailCard => "got_jail_card",
            Self::Released => "released",
            Self::PlayAgain => "play_again",
            Self::Bought { .. } => "bought",
            Self::Mortgaged { .. } => "mortgaged",
            Self::MortgageLifted { .. } => "mortgage_lifted",
            Self::Built { hotel: true, .. } => "built_hotel",
            Self::Built { .. } => "built_house",
            Self::Refused { .. } => "refused",
            Self::Bankrupt { .. } => "bankrupt",
            Self::GameOver { winner: None } => "game_over_draw",
            Self::GameOver { .. } => "game_over",
        }
    }

    /// Named parameters for the message template.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, Param)> {
        match self {
            Self::TurnStarted { round } => vec![("round", Param::Number(i64::from(*round)))],
            Self::Rolled { faces, total, .. } => {
                let faces = faces
                    .iter()
                    .map(u8::to_string)
                    .collect::<Vec<_>>()
                    .join("+");
                vec![
                    ("faces", Param::Text(faces)),
                    ("total", Param::Number(i64::from(*total))),
                ]
            }
            Self::Moved { from, to } => {
                vec![("from", Param::Space(*from)), ("to", Param::Space(*to))]
            }
            Self::Salary { amount }
            | Self::Paid { amount }
            | Self::Received { amount }
            | Self::ForcedBail { amount }
            | Self::PaidBail { amount } => vec![("amount", Param::Number(*amount))],
            Self::PaidRent {
                position,
                owner,
                amount,
            } => vec![
                ("position", Param::Space(*position)),
                ("owner", Param::Agent(*owner)),
                ("amount", Param::Number(*amount)),
            ],
            Self::PaidTax { position, amount }
            | Self::Mortgaged { position, amount }
            | Self::MortgageLifted { position, amount } => vec![
                ("position", Param::Space(*position)),
                ("amount", Param::Number(*amount)),
            ],
            Self::DrewCard { deck, index } => vec![("card", Param::Card(*deck, *index))],
            Self::JailAttemptFailed { attempts } => {
                vec![("attempts", Param::Number(i64::from(*attempts)))]
            }
            Self::Bought { position, price } => vec![
                ("position", Param::Space(*position)),
                ("price", Param::Number(*price)),
            ],
            Self::Built { position, cost, .. } => vec![
                ("position", Param::Space(*position)),
                ("cost", Param::Number(*cost)),
            ],
            Self::Refused { reason } => vec![("reason", Param::Text(reason.to_string()))],
            Self::GameOver {
                winner: Some(winner),
            } => vec![("winner", Param::Agent(*winner))],
            Self::WentToJail { .. }
            | Self::UsedJailCard
            | Self::GotJailCard
            | Self::Released
            | Self::PlayAgain
            | Self::Bankrupt { .. }
            | Self::GameOver { winner: None } => Vec::new(),
        }
    }
}

/// A yes/no question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "question")]
pub enum Question {
    /// Buy the space the agent stands on?
    Buy {
        /// Space offered.
        position: usize,
        /// Asking price.
        price: Money,
    },
}

/// Shows the game and collects decisions.
///
/// The game is passed to every call so an implementation can inspect any
/// state it needs without holding a reference to it.
pub trait Presenter {
    /// Show a message concerning an agent.
    fn announce(&mut self, game: &Game, agent: AgentId, message: &Message);

    /// Pick one of `options`, returning its index.
    fn present_choice(&mut self, game: &Game, agent: AgentId, options: &[ActionKind]) -> usize;

    /// Pick a number in `min..=max`.
    fn present_number_choice(
        &mut self,
        game: &Game,
        agent: AgentId,
        min: usize,
        max: usize,
    ) -> usize;

    /// Answer a yes/no question.
    fn confirm(&mut self, game: &Game, agent: AgentId, question: &Question) -> bool;

    /// Pick a space for `action` among `candidates`, returning an index
    /// into `candidates`, or `None` to cancel.
    ///
    /// The default asks for a number where 0 cancels and `i` selects
    /// `candidates[i - 1]`.
    fn choose_space(
        &mut self,
        game: &Game,
        agent: AgentId,
        action: ActionKind,
        candidates: &[usize],
    ) -> Option<usize> {
        let _ = action;
        self.present_number_choice(game, agent, 0, candidates.len())
            .checked_sub(1)
    }

    /// Redraw after a visible change. Does nothing by default.
    fn refresh(&mut self, game: &Game, agent: AgentId) {
        let _ = (game, agent);
    }

    /// Animate intermediate dice faces. Does nothing by default.
    fn animate_dice(&mut self, samples: &[EnsembleSample]) {
        let _ = samples;
    }
}

/// Resolves message keys and parameters to display text.
pub trait Localizer {
    /// Display name of a board position.
    fn space_name(&self, position: usize) -> String;

    /// Text of a card.
    fn card_text(&self, deck: DeckKind, index: usize) -> String;

    /// Display name of an agent.
    fn agent_name(&self, agent: AgentId) -> String;

    /// Full text of a message concerning `agent`.
    fn render(&self, agent: AgentId, message: &Message) -> String;
}
