//! Layout validation command implementation.

use super::{CliError, loader_for};
use monopoly::board::{Board, SpaceType};
use monopoly::{Game, GameConfig, Rules};
use std::path::PathBuf;

/// Execute the validate command.
///
/// # Errors
///
/// Returns an error if the layout cannot be loaded or does not form a
/// playable board.
pub(crate) fn execute(layout: &str, map_dir: Option<&PathBuf>) -> Result<(), CliError> {
    let rules = Rules::default();
    let loader = loader_for(map_dir);

    match map_dir {
        Some(dir) => println!("Validating: {layout} (from {})", dir.display()),
        None => println!("Validating: {layout} (built-in)"),
    }
    println!();

    let board = match Board::load(&*loader, layout, &rules) {
        Ok(board) => {
            print_check("Layout parses", true);
            board
        }
        Err(e) => {
            print_check("Layout parses", false);
            return Err(e.into());
        }
    };

    // The standard decks must find every space they send agents to.
    let config = GameConfig {
        layout: layout.to_string(),
        ..GameConfig::default()
    };
    let decks = Game::with_board(config, board.clone());
    print_check("Card destinations resolve", decks.is_ok());
    decks?;

    println!();
    println!("Summary:");
    println!("  Spaces:       {}", board.len());
    println!("  Start:        {}", board.start_position());
    println!("  Jail:         {}", board.jail_position());
    println!("  Terrains:     {}", board.count_type(SpaceType::Terrain));
    println!("  Groups:       {}", board.groups().count());
    for (group, size) in board.groups() {
        println!("    group {group} ({size}): {:?}", board.group_positions(group));
    }
    println!("  Railroads:    {}", board.count_type(SpaceType::Railroad));
    println!("  Companies:    {}", board.count_type(SpaceType::Company));
    let card_spaces =
        board.count_type(SpaceType::Chance) + board.count_type(SpaceType::CommunityChest);
    println!("  Card spaces:  {card_spaces}");

    println!();
    println!("Validation successful!");

    Ok(())
}

fn print_check(name: &str, ok: bool) {
    let status = if ok { "OK" } else { "FAILED" };
    let symbol = if ok { "✓" } else { "✗" };
    println!("  {symbol} {name}: {status}");
}
