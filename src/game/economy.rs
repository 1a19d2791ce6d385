//! Property economy: payments, rent, purchases, mortgages and improvements.
//!
//! Voluntary expenses (buying, building, lifting a mortgage, bail) are
//! checked up front and refused with [`RuleViolation::CannotAfford`].
//! Forced payments (rent, tax, cards) always go through and bankrupt the
//! payer if they leave it below zero.

use tracing::info;

use crate::board::{SpaceKind, SpaceType, Terrain};
use crate::error::{EngineResult, GameError, InvariantViolation, RuleViolation};
use crate::game::{ActionKind, AgentId, Game};
use crate::presenter::{Message, Presenter};
use crate::rules::{BankruptcyPolicy, Money, Rules};

impl Game {
    /// Credit an agent from the bank.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation::UnknownAgent`] for a bad id.
    pub fn give(&mut self, agent: AgentId, amount: Money) -> EngineResult<()> {
        self.agent_entry(agent)?.give(amount);
        Ok(())
    }

    /// Debit an agent, crediting `to` in full if given.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Bankrupt`] if the payer ends below zero. The
    /// payer is then marked dead; the payee is credited regardless.
    pub fn pay(&mut self, agent: AgentId, amount: Money, to: Option<AgentId>) -> EngineResult<()> {
        let solvent = self.agent_entry(agent)?.debit(amount);
        if let Some(payee) = to {
            self.agent_entry(payee)?.give(amount);
        }
        if solvent {
            return Ok(());
        }
        self.agent_entry(agent)?.eliminate();
        Err(GameError::Bankrupt { agent })
    }

    /// Apply the bankruptcy policy to an agent that just went bankrupt.
    pub(crate) fn settle_bankruptcy(&mut self, agent: AgentId, presenter: &mut dyn Presenter) {
        let released = match self.rules.bankruptcy {
            BankruptcyPolicy::ReturnToBank => {
                if let Some(a) = self.agent_mut(agent) {
                    a.holdings.clear();
                }
                self.board.release(agent)
            }
            BankruptcyPolicy::Freeze => Vec::new(),
        };
        info!(agent, released = released.len(), "agent bankrupt");
        presenter.announce(self, agent, &Message::Bankrupt { released });
    }

    /// Rent due on an owned space.
    ///
    /// `roll_total` is the dice total that brought the agent here and
    /// `multiplier` the agent's transient rent multiplier.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation::NotOwnable`] for spaces without a
    /// deed and [`InvariantViolation::RentOnUnowned`] for unowned ones.
    pub fn rent(
        &self,
        position: usize,
        roll_total: u32,
        multiplier: u32,
    ) -> Result<Money, InvariantViolation> {
        let space = self.board.space(position);
        let position = space.position;
        let deed = space.deed().ok_or(InvariantViolation::NotOwnable(position))?;
        let owner = deed.owner.ok_or(InvariantViolation::RentOnUnowned(position))?;
        let multiplier = Money::from(multiplier);
        let roll_total = Money::from(roll_total);

        let rent = match &space.kind {
            SpaceKind::Terrain(terrain) => {
                terrain.base_rent(self.board.owns_group(owner, terrain.group)) * multiplier
            }
            SpaceKind::Railroad(_) => {
                let count = self.board.count_owned(owner, SpaceType::Railroad);
                table_entry(&self.rules.railroad_rents, count) * multiplier
            }
            SpaceKind::Company(_) if multiplier != 1 => roll_total * multiplier,
            SpaceKind::Company(_) => {
                let count = self.board.count_owned(owner, SpaceType::Company);
                roll_total * table_entry(&self.rules.company_multipliers, count)
            }
            _ => return Err(InvariantViolation::NotOwnable(position)),
        };
        Ok(rent)
    }

    /// The space an agent stands on and its price, if it is for sale.
    #[must_use]
    pub fn purchase_offer(&self, agent: AgentId) -> Option<(usize, Money)> {
        let space = self.board.space(self.agent(agent)?.position);
        let deed = space.deed().filter(|d| d.is_for_sale())?;
        Some((space.position, deed.price))
    }

    /// Buy the space the agent stands on.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation::NotOwnable`] off ownable spaces,
    /// [`RuleViolation::NotForSale`] if it is owned and
    /// [`RuleViolation::CannotAfford`] if the agent is short.
    pub fn buy(&mut self, agent: AgentId, presenter: &mut dyn Presenter) -> EngineResult<()> {
        let position = self.agent_ref(agent)?.position;
        let space = self.board.space(position);
        let deed = space.deed().ok_or(InvariantViolation::NotOwnable(position))?;
        if !deed.is_for_sale() {
            return Err(RuleViolation::NotForSale.into());
        }
        let price = deed.price;
        self.check_afford(agent, price)?;

        self.pay(agent, price, None)?;
        if let Some(deed) = self.board.space_mut(position).deed_mut() {
            deed.owner = Some(agent);
        }
        let board = &self.board;
        if let Some(a) = self.agents.iter_mut().find(|a| a.id == agent) {
            a.acquire(position, |p| board.space(p));
        }

        info!(agent, position, price, "space bought");
        presenter.announce(self, agent, &Message::Bought { position, price });
        Ok(())
    }

    /// Mortgage an owned, unimproved space for half its price.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleViolation`] if the agent does not own the space, it
    /// is mortgaged already or it carries buildings.
    pub fn mortgage(
        &mut self,
        agent: AgentId,
        position: usize,
        presenter: &mut dyn Presenter,
    ) -> EngineResult<()> {
        let space = self.board.space(position);
        let position = space.position;
        let deed = space.deed().ok_or(InvariantViolation::NotOwnable(position))?;
        if !deed.is_owned_by(agent) {
            return Err(RuleViolation::NotOwner.into());
        }
        if deed.mortgaged {
            return Err(RuleViolation::AlreadyMortgaged.into());
        }
        if space.terrain().is_some_and(Terrain::is_improved) {
            return Err(RuleViolation::HasImprovements.into());
        }
        let amount = Rules::mortgage_value(deed.price);

        if let Some(deed) = self.board.space_mut(position).deed_mut() {
            deed.mortgaged = true;
        }
        self.give(agent, amount)?;
        presenter.announce(self, agent, &Message::Mortgaged { position, amount });
        Ok(())
    }

    /// Lift a mortgage, paying the lift cost.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleViolation`] if the agent does not own the space, it
    /// is not mortgaged or the agent cannot pay.
    pub fn lift_mortgage(
        &mut self,
        agent: AgentId,
        position: usize,
        presenter: &mut dyn Presenter,
    ) -> EngineResult<()> {
        let space = self.board.space(position);
        let position = space.position;
        let deed = space.deed().ok_or(InvariantViolation::NotOwnable(position))?;
        if !deed.is_owned_by(agent) {
            return Err(RuleViolation::NotOwner.into());
        }
        if !deed.mortgaged {
            return Err(RuleViolation::NotMortgaged.into());
        }
        let amount = self.rules.lift_cost(deed.price);
        self.check_afford(agent, amount)?;

        self.pay(agent, amount, None)?;
        if let Some(deed) = self.board.space_mut(position).deed_mut() {
            deed.mortgaged = false;
        }
        presenter.announce(self, agent, &Message::MortgageLifted { position, amount });
        Ok(())
    }

    /// Build a house, or a hotel on a terrain holding the maximum number
    /// of houses.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation::NotTerrain`] off terrains, and a
    /// [`RuleViolation`] if the agent lacks the group, the terrain is
    /// mortgaged, the requested improvement does not fit, or the agent
    /// cannot pay.
    pub fn build(
        &mut self,
        agent: AgentId,
        position: usize,
        hotel: bool,
        presenter: &mut dyn Presenter,
    ) -> EngineResult<()> {
        let space = self.board.space(position);
        let position = space.position;
        let terrain = space.terrain().ok_or(InvariantViolation::NotTerrain(position))?;
        if !terrain.deed.is_owned_by(agent) {
            return Err(RuleViolation::NotOwner.into());
        }
        if terrain.deed.mortgaged {
            return Err(RuleViolation::Mortgaged.into());
        }
        if !self.board.owns_group(agent, terrain.group) {
            return Err(RuleViolation::IncompleteGroup.into());
        }
        let fits = if hotel {
            terrain.houses == self.rules.max_houses && terrain.hotels == 0
        } else {
            terrain.houses < self.rules.max_houses && terrain.hotels == 0
        };
        if !fits {
            return Err(RuleViolation::ImprovementLimit.into());
        }
        let cost = terrain.house_price;
        self.check_afford(agent, cost)?;

        self.pay(agent, cost, None)?;
        if let Some(terrain) = self.board.space_mut(position).terrain_mut() {
            if hotel {
                terrain.houses = 0;
                terrain.hotels = 1;
            } else {
                terrain.houses += 1;
            }
        }
        info!(agent, position, hotel, cost, "improvement built");
        presenter.announce(self, agent, &Message::Built { position, hotel, cost });
        Ok(())
    }

    /// Spaces an agent could use `action` on right now.
    #[must_use]
    pub fn candidates(&self, agent: AgentId, action: ActionKind) -> Vec<usize> {
        let Some(a) = self.agent(agent) else {
            return Vec::new();
        };
        a.holdings
            .iter()
            .copied()
            .filter(|p| {
                let space = self.board.space(*p);
                let Some(deed) = space.deed() else {
                    return false;
                };
                match action {
                    ActionKind::Mortgage => {
                        !deed.mortgaged && !space.terrain().is_some_and(Terrain::is_improved)
                    }
                    ActionKind::LiftMortgage => deed.mortgaged,
                    ActionKind::Build => space.terrain().is_some_and(|t| {
                        !deed.mortgaged
                            && t.hotels == 0
                            && self.board.owns_group(agent, t.group)
                    }),
                    _ => false,
                }
            })
            .collect()
    }

    /// What `action` on `position` would cost or pay, as a positive cost.
    #[must_use]
    pub fn action_cost(&self, action: ActionKind, position: usize) -> Option<Money> {
        let space = self.board.space(position);
        let deed = space.deed()?;
        match action {
            ActionKind::Buy => Some(deed.price),
            ActionKind::Mortgage => Some(-Rules::mortgage_value(deed.price)),
            ActionKind::LiftMortgage => Some(self.rules.lift_cost(deed.price)),
            ActionKind::Build => space.terrain().map(|t| t.house_price),
            _ => None,
        }
    }

    pub(crate) fn check_afford(&self, agent: AgentId, cost: Money) -> EngineResult<()> {
        let funds = self.agent_ref(agent)?.funds;
        if funds < cost {
            return Err(RuleViolation::CannotAfford { cost, funds }.into());
        }
        Ok(())
    }
}

/// Entry for `count` owned spaces in a table indexed by count - 1. Counts
/// past the end use the last entry.
fn table_entry(table: &[Money], count: usize) -> Money {
    let index = count.saturating_sub(1).min(table.len().saturating_sub(1));
    table.get(index).copied().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameConfig;
    use crate::presenter::AutoPilot;

    fn game() -> Game {
        Game::new(GameConfig::new(2, 3)).unwrap()
    }

    fn own(game: &mut Game, agent: AgentId, positions: &[usize]) {
        for &p in positions {
            game.board.space_mut(p).deed_mut().unwrap().owner = Some(agent);
            let board = &game.board;
            game.agents[usize::from(agent) - 1].acquire(p, |q| board.space(q));
        }
    }

    #[test]
    fn test_pay_bankrupts_but_credits_payee() {
        let mut game = game();
        game.agent_mut(1).unwrap().funds = 30;
        let err = game.pay(1, 50, Some(2)).unwrap_err();
        assert!(matches!(err, GameError::Bankrupt { agent: 1 }));
        assert!(!game.agent(1).unwrap().alive);
        assert_eq!(game.agent(1).unwrap().funds, -20);
        assert_eq!(game.agent(2).unwrap().funds, 1550);
    }

    #[test]
    fn test_pay_to_exactly_zero_survives() {
        let mut game = game();
        game.pay(1, 1500, None).unwrap();
        assert!(game.agent(1).unwrap().alive);
    }

    #[test]
    fn test_terrain_rent() {
        let mut game = game();
        own(&mut game, 1, &[6, 8]);
        assert_eq!(game.rent(6, 7, 1).unwrap(), 6);
        own(&mut game, 1, &[9]);
        assert_eq!(game.rent(6, 7, 1).unwrap(), 12);
        game.board.space_mut(6).terrain_mut().unwrap().houses = 2;
        assert_eq!(game.rent(6, 7, 1).unwrap(), 90);
        assert_eq!(game.rent(6, 7, 2).unwrap(), 180);
    }

    #[test]
    fn test_hotel_rent_ignores_stale_houses() {
        let mut game = game();
        own(&mut game, 1, &[37, 39]);
        let boardwalk = game.board.space_mut(39).terrain_mut().unwrap();
        boardwalk.houses = 3;
        boardwalk.hotels = 1;
        assert_eq!(game.rent(39, 4, 1).unwrap(), 2000);
        assert_eq!(game.rent(39, 4, 2).unwrap(), 4000);
    }

    #[test]
    fn test_railroad_rent_grows_with_count() {
        let mut game = game();
        let mut last = 0;
        for (i, p) in [5, 15, 25, 35].into_iter().enumerate() {
            own(&mut game, 2, &[p]);
            let rent = game.rent(5, 8, 1).unwrap();
            assert_eq!(rent, [25, 50, 100, 200][i]);
            assert!(rent > last);
            last = rent;
        }
        assert_eq!(game.rent(15, 8, 2).unwrap(), 400);
    }

    #[test]
    fn test_company_rent() {
        let mut game = game();
        own(&mut game, 2, &[12]);
        assert_eq!(game.rent(12, 7, 1).unwrap(), 14);
        own(&mut game, 2, &[28]);
        assert_eq!(game.rent(12, 7, 1).unwrap(), 70);
        assert_eq!(game.rent(28, 5, 10).unwrap(), 50);
    }

    #[test]
    fn test_rent_invariants() {
        let game = game();
        assert_eq!(game.rent(1, 2, 1), Err(InvariantViolation::RentOnUnowned(1)));
        assert_eq!(game.rent(4, 2, 1), Err(InvariantViolation::NotOwnable(4)));
    }

    #[test]
    fn test_buy() {
        let mut game = game();
        let mut pilot = AutoPilot::default();
        game.agent_mut(1).unwrap().position = 39;
        assert_eq!(game.purchase_offer(1), Some((39, 400)));
        game.buy(1, &mut pilot).unwrap();
        assert_eq!(game.agent(1).unwrap().funds, 1100);
        assert_eq!(game.agent(1).unwrap().holdings, vec![39]);
        assert_eq!(game.board.space(39).owner(), Some(1));
        assert_eq!(game.purchase_offer(1), None);

        game.agent_mut(2).unwrap().position = 39;
        assert!(matches!(
            game.buy(2, &mut pilot),
            Err(GameError::Rule(RuleViolation::NotForSale))
        ));
    }

    #[test]
    fn test_buy_refusals() {
        let mut game = game();
        let mut pilot = AutoPilot::default();
        game.agent_mut(1).unwrap().position = 4;
        assert!(matches!(
            game.buy(1, &mut pilot),
            Err(GameError::Invariant(InvariantViolation::NotOwnable(4)))
        ));

        game.agent_mut(1).unwrap().position = 39;
        game.agent_mut(1).unwrap().funds = 399;
        assert!(matches!(
            game.buy(1, &mut pilot),
            Err(GameError::Rule(RuleViolation::CannotAfford { cost: 400, funds: 399 }))
        ));
        assert!(game.agent(1).unwrap().alive);
    }

    #[test]
    fn test_holdings_keep_display_order() {
        let mut game = game();
        let mut pilot = AutoPilot::default();
        for p in [28, 5, 39, 1] {
            game.agent_mut(1).unwrap().position = p;
            game.buy(1, &mut pilot).unwrap();
        }
        assert_eq!(game.agent(1).unwrap().holdings, vec![1, 39, 5, 28]);
    }

    #[test]
    fn test_mortgage_round_trip_loses_the_fee() {
        let mut game = game();
        let mut pilot = AutoPilot::default();
        own(&mut game, 1, &[39]);
        game.mortgage(1, 39, &mut pilot).unwrap();
        assert_eq!(game.agent(1).unwrap().funds, 1700);
        assert!(matches!(
            game.mortgage(1, 39, &mut pilot),
            Err(GameError::Rule(RuleViolation::AlreadyMortgaged))
        ));
        game.lift_mortgage(1, 39, &mut pilot).unwrap();
        assert_eq!(game.agent(1).unwrap().funds, 1500 - 20);
        assert!(matches!(
            game.lift_mortgage(1, 39, &mut pilot),
            Err(GameError::Rule(RuleViolation::NotMortgaged))
        ));
    }

    #[test]
    fn test_mortgage_refusals() {
        let mut game = game();
        let mut pilot = AutoPilot::default();
        own(&mut game, 2, &[37, 39]);
        assert!(matches!(
            game.mortgage(1, 39, &mut pilot),
            Err(GameError::Rule(RuleViolation::NotOwner))
        ));
        game.board.space_mut(39).terrain_mut().unwrap().houses = 1;
        assert!(matches!(
            game.mortgage(2, 39, &mut pilot),
            Err(GameError::Rule(RuleViolation::HasImprovements))
        ));
        assert!(matches!(
            game.mortgage(2, 0, &mut pilot),
            Err(GameError::Invariant(InvariantViolation::NotOwnable(0)))
        ));
    }

    #[test]
    fn test_build_houses_then_hotel() {
        let mut game = game();
        let mut pilot = AutoPilot::default();
        own(&mut game, 1, &[1]);
        assert!(matches!(
            game.build(1, 1, false, &mut pilot),
            Err(GameError::Rule(RuleViolation::IncompleteGroup))
        ));
        own(&mut game, 1, &[3]);
        assert!(matches!(
            game.build(1, 1, true, &mut pilot),
            Err(GameError::Rule(RuleViolation::ImprovementLimit))
        ));
        for _ in 0..4 {
            game.build(1, 1, false, &mut pilot).unwrap();
        }
        assert!(matches!(
            game.build(1, 1, false, &mut pilot),
            Err(GameError::Rule(RuleViolation::ImprovementLimit))
        ));
        game.build(1, 1, true, &mut pilot).unwrap();

        let terrain = game.board.space(1).terrain().unwrap();
        assert_eq!((terrain.houses, terrain.hotels), (0, 1));
        assert_eq!(game.agent(1).unwrap().funds, 1500 - 5 * 50);
        assert!(game.candidates(1, ActionKind::Build).iter().all(|p| *p != 1));
        assert!(matches!(
            game.build(1, 1, true, &mut pilot),
            Err(GameError::Rule(RuleViolation::ImprovementLimit))
        ));
    }

    #[test]
    fn test_build_refusals() {
        let mut game = game();
        let mut pilot = AutoPilot::default();
        own(&mut game, 1, &[1, 3, 5]);
        assert!(matches!(
            game.build(1, 5, false, &mut pilot),
            Err(GameError::Invariant(InvariantViolation::NotTerrain(5)))
        ));
        game.mortgage(1, 3, &mut pilot).unwrap();
        assert!(matches!(
            game.build(1, 3, false, &mut pilot),
            Err(GameError::Rule(RuleViolation::Mortgaged))
        ));
        game.agent_mut(1).unwrap().funds = 10;
        assert!(matches!(
            game.build(1, 1, false, &mut pilot),
            Err(GameError::Rule(RuleViolation::CannotAfford { cost: 50, funds: 10 }))
        ));
    }

    #[test]
    fn test_candidates() {
        let mut game = game();
        let mut pilot = AutoPilot::default();
        own(&mut game, 1, &[1, 3, 5]);
        assert_eq!(game.candidates(1, ActionKind::Mortgage), vec![1, 3, 5]);
        assert_eq!(game.candidates(1, ActionKind::Build), vec![1, 3]);
        assert!(game.candidates(1, ActionKind::LiftMortgage).is_empty());

        game.mortgage(1, 5, &mut pilot).unwrap();
        assert_eq!(game.candidates(1, ActionKind::LiftMortgage), vec![5]);
        assert_eq!(game.action_cost(ActionKind::LiftMortgage, 5), Some(110));
        assert_eq!(game.action_cost(ActionKind::Build, 1), Some(50));
        assert_eq!(game.action_cost(ActionKind::Build, 0), None);
    }

    #[test]
    fn test_bankruptcy_returns_holdings_to_bank() {
        let mut game = game();
        let mut pilot = AutoPilot::default().recording();
        own(&mut game, 1, &[1, 3]);
        game.board.space_mut(1).terrain_mut().unwrap().houses = 2;
        let _ = game.pay(1, 5000, None);
        game.settle_bankruptcy(1, &mut pilot);

        assert!(game.agent(1).unwrap().holdings.is_empty());
        assert_eq!(game.board.space(1).owner(), None);
        assert_eq!(game.board.space(1).terrain().unwrap().houses, 0);
        assert_eq!(
            pilot.messages(),
            &[(1, Message::Bankrupt { released: vec![1, 3] })]
        );
    }

    #[test]
    fn test_bankruptcy_freeze_keeps_holdings() {
        let rules = Rules {
            bankruptcy: BankruptcyPolicy::Freeze,
            ..Rules::default()
        };
        let mut game = Game::new(GameConfig::new(2, 3).with_rules(rules)).unwrap();
        let mut pilot = AutoPilot::default();
        own(&mut game, 1, &[1]);
        let _ = game.pay(1, 5000, None);
        game.settle_bankruptcy(1, &mut pilot);
        assert_eq!(game.board.space(1).owner(), Some(1));
    }
}
