//! Chance and Community Chest decks.
//!
//! Cards are data: each one is a [`CardEffect`] descriptor interpreted by
//! the game when drawn. A [`CardDeck`] is drawn without replacement and
//! reshuffled only once every card of the current pass has come out.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::board::SpaceType;

/// Which deck a card comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeckKind {
    /// Chance deck.
    Chance,
    /// Community Chest deck.
    CommunityChest,
}

/// Where a teleport card sends the agent.
///
/// Group and ids are 1-based, as written in layout files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    /// An absolute board position.
    Position(usize),
    /// A terrain by group and id.
    Terrain {
        /// Color group.
        group: u8,
        /// Id within the group.
        id: u8,
    },
    /// A railroad by id.
    Railroad(u8),
}

/// What a card does to the agent drawing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardEffect {
    /// Move directly to a destination; salary if the move wraps.
    Teleport(Destination),
    /// Move forward to the nearest space of a type.
    TeleportNearest(SpaceType),
    /// Multiply the next rent, then move to the nearest space of a type.
    SetRentMultiplierThenGoNearest {
        /// Rent multiplier applied on arrival.
        multiplier: u32,
        /// Type of space to look for.
        kind: SpaceType,
    },
    /// Move backwards a number of spaces.
    MoveBack(u32),
    /// Bank pays the agent.
    ReceiveFromBank(i64),
    /// Agent pays the bank.
    PayBank(i64),
    /// Agent pays the bank this amount for every agent still in the game.
    PayPerAgent(i64),
    /// Bank pays the agent this amount for every agent still in the game.
    ReceivePerAgent(i64),
    /// Agent pays for every house and hotel they own.
    Repairs {
        /// Cost per house.
        per_house: i64,
        /// Cost per hotel.
        per_hotel: i64,
    },
    /// Go straight to jail.
    GoToJail,
    /// Keep a get-out-of-jail token.
    GrantJailCard,
}

/// A card that has just been drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardDraw {
    /// Index of the card within its deck's card list.
    pub index: usize,
    /// The card's effect.
    pub effect: CardEffect,
}

/// A shuffled deck drawn in order, cycling through a fresh permutation
/// every pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardDeck {
    kind: DeckKind,
    cards: Vec<CardEffect>,
    order: Vec<usize>,
    cursor: usize,
}

impl CardDeck {
    /// Create an unshuffled deck. Call [`CardDeck::shuffle`] before play.
    #[must_use]
    pub fn new(kind: DeckKind, cards: Vec<CardEffect>) -> Self {
        let order = (0..cards.len()).collect();
        Self {
            kind,
            cards,
            order,
            cursor: 0,
        }
    }

    /// The standard 16-card Chance deck.
    #[must_use]
    pub fn chance() -> Self {
        Self::new(DeckKind::Chance, chance_cards())
    }

    /// The standard 16-card Community Chest deck.
    #[must_use]
    pub fn community_chest() -> Self {
        Self::new(DeckKind::CommunityChest, community_chest_cards())
    }

    /// Which deck this is.
    #[must_use]
    pub const fn kind(&self) -> DeckKind {
        self.kind
    }

    /// Number of cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// True if the deck holds no cards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cards left before the next reshuffle.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.order.len().saturating_sub(self.cursor)
    }

    /// Card effect by index.
    #[must_use]
    pub fn card(&self, index: usize) -> Option<CardEffect> {
        self.cards.get(index).copied()
    }

    /// Start a new pass over a random permutation of every card.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.order.shuffle(rng);
        self.cursor = 0;
    }

    /// Draw the next card, reshuffling first if the pass is exhausted.
    ///
    /// Returns `None` only for an empty deck.
    pub fn draw<R: Rng>(&mut self, rng: &mut R) -> Option<CardDraw> {
        if self.cards.is_empty() {
            return None;
        }
        if self.cursor >= self.order.len() {
            self.shuffle(rng);
        }
        let index = self.order[self.cursor];
        self.cursor += 1;
        Some(CardDraw {
            index,
            effect: self.cards[index],
        })
    }
}

/// Chance cards, in reference order.
#[must_use]
pub fn chance_cards() -> Vec<CardEffect> {
    use CardEffect::{
        GoToJail, GrantJailCard, MoveBack, PayBank, PayPerAgent, ReceiveFromBank, Repairs,
        SetRentMultiplierThenGoNearest, Teleport,
    };

    vec![
        Teleport(Destination::Terrain { group: 8, id: 2 }),
        Teleport(Destination::Position(0)),
        Teleport(Destination::Terrain { group: 5, id: 3 }),
        Teleport(Destination::Terrain { group: 3, id: 1 }),
        SetRentMultiplierThenGoNearest {
            multiplier: 2,
            kind: SpaceType::Railroad,
        },
        SetRentMultiplierThenGoNearest {
            multiplier: 2,
            kind: SpaceType::Railroad,
        },
        SetRentMultiplierThenGoNearest {
            multiplier: 10,
            kind: SpaceType::Company,
        },
        ReceiveFromBank(50),
        GrantJailCard,
        MoveBack(3),
        GoToJail,
        Repairs {
            per_house: 25,
            per_hotel: 100,
        },
        PayBank(15),
        Teleport(Destination::Railroad(1)),
        PayPerAgent(50),
        ReceiveFromBank(150),
    ]
}

/// Community Chest cards, in reference order.
#[must_use]
pub fn community_chest_cards() -> Vec<CardEffect> {
    use CardEffect::{
        GoToJail, GrantJailCard, PayBank, ReceiveFromBank, ReceivePerAgent, Repairs, Teleport,
    };

    vec![
        Teleport(Destination::Position(0)),
        ReceiveFromBank(200),
        PayBank(50),
        ReceiveFromBank(50),
        GrantJailCard,
        GoToJail,
        ReceiveFromBank(100),
        ReceiveFromBank(20),
        ReceivePerAgent(10),
        ReceiveFromBank(100),
        PayBank(100),
        PayBank(50),
        ReceiveFromBank(25),
        Repairs {
            per_house: 40,
            per_hotel: 115,
        },
        ReceiveFromBank(10),
        ReceiveFromBank(100),
    ]
}
