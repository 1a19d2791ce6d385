//! Benchmarks for running complete games.
//!
//! Covers the full game loop with scripted agents, and the dice and board
//! paths every turn goes through.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::hint::black_box;
use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;

use monopoly::board::{Board, BuiltinLoader, DEFAULT_LAYOUT};
use monopoly::dice::DiceEnsemble;
use monopoly::presenter::AutoPilot;
use monopoly::{Game, GameConfig, GameRng, Rules};

fn run(config: &GameConfig, board: &Board) {
    let mut game = Game::with_board(config.clone(), board.clone()).unwrap();
    let result = game.run(&mut AutoPilot::default());
    black_box(result).unwrap();
}

fn usa_board() -> Board {
    Board::load(&BuiltinLoader, DEFAULT_LAYOUT, &Rules::default()).unwrap()
}

fn bench_single_game(c: &mut Criterion) {
    let board = usa_board();
    let config = GameConfig::new(2, 42);

    c.bench_function("single_game_2p", |b| {
        b.iter(|| run(black_box(&config), &board));
    });
}

fn bench_single_game_4p(c: &mut Criterion) {
    let board = usa_board();
    let config = GameConfig::new(4, 42);

    c.bench_function("single_game_4p", |b| {
        b.iter(|| run(black_box(&config), &board));
    });
}

fn bench_game_batch(c: &mut Criterion) {
    // 10 games sequentially (without parallel overhead)
    let board = usa_board();

    c.bench_function("10_games_sequential", |b| {
        b.iter(|| {
            for seed in 0..10u64 {
                run(&GameConfig::new(4, black_box(seed)), &board);
            }
        });
    });
}

fn bench_dice(c: &mut Criterion) {
    let mut dice = DiceEnsemble::pair();
    let mut rng = GameRng::seed_from_u64(42);

    c.bench_function("dice_roll_to_rest", |b| {
        b.iter(|| black_box(dice.roll_to_rest(&mut rng, Duration::ZERO)));
    });
}

fn bench_board_load(c: &mut Criterion) {
    c.bench_function("board_load_usa", |b| {
        b.iter(|| black_box(usa_board()));
    });
}

criterion_group!(
    benches,
    bench_single_game,
    bench_single_game_4p,
    bench_game_batch,
    bench_dice,
    bench_board_load
);
criterion_main!(benches);
