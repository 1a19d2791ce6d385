//! Token movement and the landing chain.

use tracing::debug;

use crate::board::SpaceType;
use crate::error::{EngineResult, InvariantViolation};
use crate::game::{AgentId, Game, Roll};
use crate::presenter::{Message, Presenter};

impl Game {
    /// Move forward `steps` spaces. Wrapping past or onto position 0 pays
    /// the salary once, however far the move goes.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation::UnknownAgent`] for a bad id.
    pub fn advance(
        &mut self,
        agent: AgentId,
        steps: u32,
        presenter: &mut dyn Presenter,
    ) -> EngineResult<()> {
        let len = self.board.len();
        let from = self.agent_ref(agent)?.position;
        let target = from + usize::try_from(steps).unwrap_or(usize::MAX - from);
        self.agent_entry(agent)?.position = target % len;
        if target >= len {
            self.pay_salary(agent, presenter)?;
        }
        self.announce_move(agent, from, presenter);
        Ok(())
    }

    /// Move backwards `steps` spaces. Wrapping below position 0 pays the
    /// salary when the rules say so.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation::UnknownAgent`] for a bad id.
    pub fn move_back(
        &mut self,
        agent: AgentId,
        steps: u32,
        presenter: &mut dyn Presenter,
    ) -> EngineResult<()> {
        let len = self.board.len();
        let from = self.agent_ref(agent)?.position;
        let steps = usize::try_from(steps).unwrap_or(usize::MAX) % len;
        let wrapped = steps > from;
        self.agent_entry(agent)?.position = (from + len - steps) % len;
        if wrapped && self.rules.salary_on_backward_wrap {
            self.pay_salary(agent, presenter)?;
        }
        self.announce_move(agent, from, presenter);
        Ok(())
    }

    /// Jump to an absolute position. A target behind the current position
    /// counts as having wrapped and pays the salary.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation::NoSuchSpace`] for a position off the
    /// board.
    pub fn goto(
        &mut self,
        agent: AgentId,
        target: usize,
        presenter: &mut dyn Presenter,
    ) -> EngineResult<()> {
        if target >= self.board.len() {
            return Err(InvariantViolation::NoSuchSpace.into());
        }
        let from = self.agent_ref(agent)?.position;
        self.agent_entry(agent)?.position = target;
        if target < from {
            self.pay_salary(agent, presenter)?;
        }
        self.announce_move(agent, from, presenter);
        Ok(())
    }

    /// Jump forward to the nearest space of a type.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation::NoSuchSpace`] if the board has no
    /// space of that type.
    pub fn go_to_nearest(
        &mut self,
        agent: AgentId,
        kind: SpaceType,
        presenter: &mut dyn Presenter,
    ) -> EngineResult<()> {
        let from = self.agent_ref(agent)?.position;
        let target = self
            .board
            .nearest(from, kind)
            .ok_or(InvariantViolation::NoSuchSpace)?;
        self.goto(agent, target, presenter)
    }

    /// Lock an agent up: straight to the jail position, no salary, and the
    /// jail space itself is not resolved.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation::UnknownAgent`] for a bad id.
    pub fn go_to_jail(&mut self, agent: AgentId) -> EngineResult<()> {
        let jail = self.board.jail_position();
        self.agent_entry(agent)?.imprison(jail);
        debug!(agent, "jailed");
        Ok(())
    }

    /// Move by a roll and resolve the landing chain.
    ///
    /// Returns true if anything visible happened on landing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GameError::Bankrupt`] if a forced payment on the
    /// way bankrupts the agent.
    pub fn play(
        &mut self,
        agent: AgentId,
        roll: &Roll,
        presenter: &mut dyn Presenter,
    ) -> EngineResult<bool> {
        self.advance(agent, roll.total, presenter)?;
        let result = self.resolve_landing(agent, roll.total, presenter);
        if let Ok(a) = self.agent_entry(agent) {
            a.rent_multiplier = 1;
        }
        result
    }

    /// Resolve the current space, then again while effects keep moving the
    /// agent. Stops once the agent stays put or lands in jail.
    fn resolve_landing(
        &mut self,
        agent: AgentId,
        roll_total: u32,
        presenter: &mut dyn Presenter,
    ) -> EngineResult<bool> {
        let mut refresh = false;
        let mut resolved = None;
        loop {
            let current = self.agent_ref(agent)?;
            if current.in_jail || resolved == Some(current.position) {
                break;
            }
            let position = current.position;
            resolved = Some(position);
            refresh |= self.on_land(agent, roll_total, presenter)?;
        }
        Ok(refresh)
    }

    fn pay_salary(&mut self, agent: AgentId, presenter: &mut dyn Presenter) -> EngineResult<()> {
        let amount = self.rules.salary;
        self.give(agent, amount)?;
        presenter.announce(self, agent, &Message::Salary { amount });
        Ok(())
    }

    fn announce_move(&self, agent: AgentId, from: usize, presenter: &mut dyn Presenter) {
        let Some(to) = self.agent(agent).map(|a| a.position) else {
            return;
        };
        debug!(agent, from, to, "moved");
        presenter.announce(self, agent, &Message::Moved { from, to });
    }
}
