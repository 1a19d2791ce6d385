//! Landing effects and card effects.

use tracing::debug;

use crate::board::SpaceKind;
use crate::cards::{CardEffect, DeckKind};
use crate::error::{EngineResult, InvariantViolation};
use crate::game::{AgentId, Game};
use crate::presenter::{JailReason, Message, Presenter};
use crate::rules::Money;

impl Game {
    /// Resolve the space an agent stands on.
    ///
    /// Returns true iff the landing had a visible effect. Buying is never
    /// automatic: an unowned space does nothing here.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GameError::Bankrupt`] if rent, tax or a card
    /// bankrupts the agent.
    pub fn on_land(
        &mut self,
        agent: AgentId,
        roll_total: u32,
        presenter: &mut dyn Presenter,
    ) -> EngineResult<bool> {
        let current = self.agent_ref(agent)?;
        let multiplier = current.rent_multiplier;
        let space = self.board.space(current.position);
        let position = space.position;

        match &space.kind {
            SpaceKind::Start | SpaceKind::Jail | SpaceKind::FreeParking => Ok(false),
            SpaceKind::GoToJail => {
                let message = Message::WentToJail {
                    reason: JailReason::Space,
                };
                presenter.announce(self, agent, &message);
                self.go_to_jail(agent)?;
                Ok(true)
            }
            SpaceKind::Tax { amount, .. } => {
                let amount = *amount;
                presenter.announce(self, agent, &Message::PaidTax { position, amount });
                self.pay(agent, amount, None)?;
                Ok(true)
            }
            SpaceKind::Terrain(_) | SpaceKind::Railroad(_) | SpaceKind::Company(_) => {
                let Some(deed) = space.deed() else {
                    return Err(InvariantViolation::NotOwnable(position).into());
                };
                let Some(owner) = deed.owner else {
                    return Ok(false);
                };
                let collects = self.agent(owner).is_some_and(|o| o.alive);
                if owner == agent || deed.mortgaged || !collects {
                    return Ok(false);
                }
                let amount = self.rent(position, roll_total, multiplier)?;
                debug!(agent, owner, position, amount, "rent due");
                presenter.announce(self, agent, &Message::PaidRent { position, owner, amount });
                self.pay(agent, amount, Some(owner))?;
                Ok(true)
            }
            SpaceKind::Chance => self.draw_card(agent, DeckKind::Chance, presenter),
            SpaceKind::CommunityChest => self.draw_card(agent, DeckKind::CommunityChest, presenter),
        }
    }

    fn draw_card(
        &mut self,
        agent: AgentId,
        kind: DeckKind,
        presenter: &mut dyn Presenter,
    ) -> EngineResult<bool> {
        let deck = match kind {
            DeckKind::Chance => &mut self.chance,
            DeckKind::CommunityChest => &mut self.community_chest,
        };
        let Some(draw) = deck.draw(&mut self.rng) else {
            return Ok(false);
        };
        debug!(agent, deck = ?kind, card = draw.index, "card drawn");
        presenter.announce(
            self,
            agent,
            &Message::DrewCard {
                deck: kind,
                index: draw.index,
            },
        );
        self.apply_card(agent, draw.effect, presenter)?;
        Ok(true)
    }

    /// Apply a card effect to an agent.
    ///
    /// Movement effects only move the token; the landing chain resolves
    /// the new space afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GameError::Bankrupt`] if a payment bankrupts the
    /// agent, and [`InvariantViolation::NoSuchSpace`] for a destination the
    /// board lacks.
    pub fn apply_card(
        &mut self,
        agent: AgentId,
        effect: CardEffect,
        presenter: &mut dyn Presenter,
    ) -> EngineResult<()> {
        match effect {
            CardEffect::Teleport(destination) => {
                let target = self
                    .resolve_destination(destination)
                    .ok_or(InvariantViolation::NoSuchSpace)?;
                self.goto(agent, target, presenter)
            }
            CardEffect::TeleportNearest(kind) => self.go_to_nearest(agent, kind, presenter),
            CardEffect::SetRentMultiplierThenGoNearest { multiplier, kind } => {
                self.agent_entry(agent)?.rent_multiplier = multiplier;
                self.go_to_nearest(agent, kind, presenter)
            }
            CardEffect::MoveBack(steps) => self.move_back(agent, steps, presenter),
            CardEffect::ReceiveFromBank(amount) => self.receive(agent, amount, presenter),
            CardEffect::PayBank(amount) => self.pay_bank(agent, amount, presenter),
            CardEffect::PayPerAgent(amount) => {
                let total = amount * self.living_money();
                self.pay_bank(agent, total, presenter)
            }
            CardEffect::ReceivePerAgent(amount) => {
                let total = amount * self.living_money();
                self.receive(agent, total, presenter)
            }
            CardEffect::Repairs {
                per_house,
                per_hotel,
            } => {
                let (houses, hotels) = self.board.improvements_of(agent);
                let total = Money::from(houses) * per_house + Money::from(hotels) * per_hotel;
                self.pay_bank(agent, total, presenter)
            }
            CardEffect::GoToJail => {
                let message = Message::WentToJail {
                    reason: JailReason::Card,
                };
                presenter.announce(self, agent, &message);
                self.go_to_jail(agent)
            }
            CardEffect::GrantJailCard => {
                self.agent_entry(agent)?.jail_cards += 1;
                presenter.announce(self, agent, &Message::GotJailCard);
                Ok(())
            }
        }
    }

    /// Living agent count as money, for per-agent cards.
    fn living_money(&self) -> Money {
        Money::try_from(self.living_count()).unwrap_or(Money::MAX)
    }

    fn receive(
        &mut self,
        agent: AgentId,
        amount: Money,
        presenter: &mut dyn Presenter,
    ) -> EngineResult<()> {
        self.give(agent, amount)?;
        presenter.announce(self, agent, &Message::Received { amount });
        Ok(())
    }

    fn pay_bank(
        &mut self,
        agent: AgentId,
        amount: Money,
        presenter: &mut dyn Presenter,
    ) -> EngineResult<()> {
        presenter.announce(self, agent, &Message::Paid { amount });
        self.pay(agent, amount, None)
    }
}
