//! End-to-end tests for game mechanics.
//!
//! These drive the public API through whole actions, turns and games with
//! forced dice, checking funds, ownership and jail state afterwards.
//!
//! Run with: cargo test --release game_integration

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::collections::HashSet;

use rand::SeedableRng;

use monopoly::board::{Board, BoardSource, BuiltinLoader, DEFAULT_LAYOUT, DirectoryLoader};
use monopoly::cards::{CardDeck, DeckKind};
use monopoly::game::{ActionKind, AgentId, EndReason, TurnAction, TurnState};
use monopoly::presenter::{AutoPilot, Message};
use monopoly::{Game, GameConfig, GameError, GameRng, Rules};

const USA_LAYOUT: &str = include_str!("../assets/map/usa.layout");
const USA_TERRAINS: &str = include_str!("../assets/map/usa.terrains");

/// The reference layout with two spaces swapped.
fn swapped_layout(a: usize, b: usize) -> String {
    let mut lines: Vec<&str> = USA_LAYOUT
        .lines()
        .filter(|l| !l.trim().is_empty() && !l.trim_start().starts_with('#'))
        .collect();
    lines.swap(a, b);
    lines.join("\n")
}

fn game_on(layout: &str, agents: u8) -> Game {
    let source = BoardSource::parse(layout, USA_TERRAINS).unwrap();
    let rules = Rules::default();
    let board = Board::build(&source.layout, &source.terrains, &rules).unwrap();
    Game::with_board(GameConfig::new(agents, 1), board).unwrap()
}

fn buy_at(game: &mut Game, agent: AgentId, position: usize, pilot: &mut AutoPilot) {
    game.agent_mut(agent).unwrap().position = position;
    game.buy(agent, pilot).unwrap();
}

#[test]
fn test_buy_after_rolling_twelve() {
    // Put a terrain priced 100 twelve steps from the start.
    let mut game = game_on(&swapped_layout(6, 12), 2);
    assert_eq!(game.board().space(12).deed().unwrap().price, 100);

    let mut pilot = AutoPilot::default();
    let mut state = TurnState::new();
    game.queue_rolls([vec![6, 6]]);
    game.apply_action(1, &mut state, TurnAction::Roll, &mut pilot).unwrap();
    assert_eq!(game.agent(1).unwrap().position, 12);
    assert!(game.available_actions(1, &state).contains(&ActionKind::Buy));

    game.apply_action(1, &mut state, TurnAction::Buy, &mut pilot).unwrap();
    assert_eq!(game.agent(1).unwrap().funds, 1400);
    assert_eq!(game.board().space(12).owner(), Some(1));
    assert_eq!(game.agent(1).unwrap().holdings, vec![12]);
}

#[test]
fn test_full_group_doubles_bare_rent() {
    let mut game = Game::new(GameConfig::new(2, 3)).unwrap();
    let mut pilot = AutoPilot::default();
    for position in [6, 8, 9] {
        buy_at(&mut game, 1, position, &mut pilot);
    }
    let before = game.agent(1).unwrap().funds;

    game.agent_mut(2).unwrap().position = 8;
    assert!(game.on_land(2, 5, &mut pilot).unwrap());
    let table_bare = 6;
    assert_eq!(game.agent(2).unwrap().funds, 1500 - 2 * table_bare);
    assert_eq!(game.agent(1).unwrap().funds, before + 2 * table_bare);
}

#[test]
fn test_three_doubles_send_agent_to_jail() {
    let mut game = Game::new(GameConfig::new(2, 3))
        .unwrap()
        .with_decks(
            CardDeck::new(DeckKind::Chance, Vec::new()),
            CardDeck::new(DeckKind::CommunityChest, Vec::new()),
        )
        .unwrap();
    let mut pilot = AutoPilot::default().recording();
    game.queue_rolls([vec![2, 2], vec![3, 3], vec![1, 1]]);

    let mut state = TurnState::new();
    for _ in 0..3 {
        assert!(game.available_actions(1, &state).contains(&ActionKind::Roll));
        game.apply_action(1, &mut state, TurnAction::Roll, &mut pilot).unwrap();
    }
    let agent = game.agent(1).unwrap();
    assert!(agent.in_jail);
    assert_eq!(agent.position, game.board().jail_position());
    assert!(!game.available_actions(1, &state).contains(&ActionKind::Roll));
    let play_agains = pilot
        .messages()
        .iter()
        .filter(|(_, m)| *m == Message::PlayAgain)
        .count();
    assert_eq!(play_agains, 2);
}

#[test]
fn test_full_deck_pass_has_no_repeats() {
    let mut rng = GameRng::seed_from_u64(77);
    for mut deck in [CardDeck::chance(), CardDeck::community_chest()] {
        assert_eq!(deck.len(), 16);
        deck.shuffle(&mut rng);
        let seen: HashSet<usize> = (0..16).map(|_| deck.draw(&mut rng).unwrap().index).collect();
        assert_eq!(seen.len(), 16);
    }
}

#[test]
fn test_mortgage_round_trip_costs_the_lift_fee() {
    let mut game = Game::new(GameConfig::new(2, 3)).unwrap();
    let mut pilot = AutoPilot::default();
    buy_at(&mut game, 1, 39, &mut pilot);
    let before = game.agent(1).unwrap().funds;

    game.mortgage(1, 39, &mut pilot).unwrap();
    assert_eq!(game.agent(1).unwrap().funds, before + 200);
    game.lift_mortgage(1, 39, &mut pilot).unwrap();
    assert_eq!(game.agent(1).unwrap().funds, before - 20);
    assert!(!game.board().space(39).deed().unwrap().mortgaged);
}

#[test]
fn test_bankrupt_owner_property_returns_to_bank() {
    let mut game = Game::new(GameConfig::new(3, 3)).unwrap();
    let mut pilot = AutoPilot::default();
    buy_at(&mut game, 2, 5, &mut pilot);

    game.agent_mut(2).unwrap().funds = 10;
    game.agent_mut(2).unwrap().position = 0;
    game.queue_rolls([vec![1, 3]]);
    let mut state = TurnState::new();
    let err = game
        .apply_action(2, &mut state, TurnAction::Roll, &mut pilot)
        .unwrap_err();
    assert!(matches!(err, GameError::Bankrupt { agent: 2 }));
    assert!(!game.agent(2).unwrap().alive);
    assert!(game.board().space(5).is_for_sale());
    assert!(game.agent(2).unwrap().holdings.is_empty());
}

#[test]
fn test_seeded_games_are_reproducible() {
    let config = GameConfig::new(4, 99).with_max_rounds(Some(80));
    let mut first_log = AutoPilot::default().recording();
    let mut second_log = AutoPilot::default().recording();
    let first = Game::new(config.clone()).unwrap().run(&mut first_log).unwrap();
    let second = Game::new(config).unwrap().run(&mut second_log).unwrap();
    assert_eq!(first, second);
    assert_eq!(first_log.messages(), second_log.messages());

    let other = Game::new(GameConfig::new(4, 100).with_max_rounds(Some(80)))
        .unwrap()
        .run(&mut AutoPilot::default().recording())
        .unwrap();
    assert_ne!(first.agents, other.agents);
}

#[test]
fn test_long_game_ends_cleanly() {
    let mut game = Game::new(GameConfig::new(4, 5)).unwrap();
    let result = game.run(&mut AutoPilot::default()).unwrap();
    assert!(result.rounds <= 1000);
    match result.reason {
        EndReason::LastSolvent => {
            assert_eq!(result.agents.iter().filter(|a| a.alive).count(), 1);
            assert_eq!(result.winner, result.agents.iter().find(|a| a.alive).map(|a| a.id));
        }
        EndReason::RoundLimit => assert_eq!(result.rounds, 1000),
    }
    for agent in result.agents.iter().filter(|a| a.alive) {
        assert!(agent.funds >= 0);
    }
}

#[test]
fn test_directory_loader_feeds_a_game() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("mini.layout"), swapped_layout(1, 3)).unwrap();
    std::fs::write(dir.path().join("mini.terrains"), USA_TERRAINS).unwrap();

    let loader = DirectoryLoader::new(dir.path());
    let config = GameConfig {
        layout: "mini".to_string(),
        ..GameConfig::new(2, 8)
    };
    let game = Game::with_loader(config, &loader).unwrap();
    assert_eq!(game.board().len(), 40);
    assert_eq!(game.board().space(1).terrain().unwrap().id, 2);

    let missing = GameConfig {
        layout: "absent".to_string(),
        ..GameConfig::new(2, 8)
    };
    assert!(Game::with_loader(missing, &loader).is_err());
    assert!(Game::with_loader(GameConfig::new(2, 8), &BuiltinLoader).is_ok());
    assert_eq!(DEFAULT_LAYOUT, "usa");
}

#[test]
fn test_agent_count_is_checked() {
    assert!(matches!(
        Game::new(GameConfig::new(1, 0)),
        Err(GameError::AgentCount { count: 1, .. })
    ));
    assert!(Game::new(GameConfig::new(9, 0)).is_err());
    assert!(Game::new(GameConfig::new(8, 0)).is_ok());
}
