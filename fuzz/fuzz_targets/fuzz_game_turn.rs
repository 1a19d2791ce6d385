#![no_main]

//! Turn action fuzzer.
//!
//! Drives a seeded game with arbitrary action sequences, offered or not,
//! and checks the ownership and funds invariants after every action.
//! Rejected actions are expected; broken invariants are not.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use monopoly::game::{TurnFlow, check_invariants};
use monopoly::presenter::AutoPilot;
use monopoly::{Game, GameConfig, GameError, TurnAction, TurnState};

/// A fuzzer-generated action.
#[derive(Arbitrary, Debug, Clone, Copy)]
enum FuzzAction {
    Roll,
    RollFromJail,
    PayBail,
    UseJailCard,
    Buy,
    Mortgage(u8),
    LiftMortgage(u8),
    Build { position: u8, hotel: bool },
    Finish,
}

impl FuzzAction {
    fn into_action(self) -> TurnAction {
        match self {
            Self::Roll => TurnAction::Roll,
            Self::RollFromJail => TurnAction::RollFromJail,
            Self::PayBail => TurnAction::PayBail,
            Self::UseJailCard => TurnAction::UseJailCard,
            Self::Buy => TurnAction::Buy,
            Self::Mortgage(p) => TurnAction::Mortgage(usize::from(p % 40)),
            Self::LiftMortgage(p) => TurnAction::LiftMortgage(usize::from(p % 40)),
            Self::Build { position, hotel } => TurnAction::Build {
                position: usize::from(position % 40),
                hotel,
            },
            Self::Finish => TurnAction::Finish,
        }
    }
}

#[derive(Arbitrary, Debug)]
struct GameTurnInput {
    agents: u8,
    seed: u64,
    /// Starting funds override, to reach bankruptcy quickly.
    funds: u16,
    actions: Vec<FuzzAction>,
}

fuzz_target!(|input: GameTurnInput| {
    let agents = 2 + input.agents % 7;
    let Ok(mut game) = Game::new(GameConfig::new(agents, input.seed)) else {
        return;
    };
    for id in 1..=agents {
        if let Some(agent) = game.agent_mut(id) {
            agent.funds = i64::from(input.funds);
        }
    }

    let mut pilot = AutoPilot::default();
    let mut seat = 1;
    let mut state = TurnState::new();

    for fuzz_action in input.actions.into_iter().take(500) {
        if game.living_count() <= 1 {
            break;
        }
        let outcome = game.apply_action(seat, &mut state, fuzz_action.into_action(), &mut pilot);
        let violations = check_invariants(&game);
        assert!(violations.is_empty(), "after {fuzz_action:?}: {violations:?}");

        let next_seat = matches!(outcome, Ok(TurnFlow::Finished) | Err(GameError::Bankrupt { .. }));
        if next_seat {
            state = TurnState::new();
            seat = game
                .living_agents()
                .find(|id| *id > seat)
                .or_else(|| game.living_agents().next())
                .unwrap_or(seat);
        }
    }
});
