#![no_main]

//! Board description fuzzer.
//!
//! Feeds arbitrary layout and terrain text through the parsers and the
//! board builder. Malformed input must come back as a load error.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use monopoly::Rules;
use monopoly::board::{Board, BoardSource};

#[derive(Arbitrary, Debug)]
struct LayoutInput {
    layout: String,
    terrains: String,
    /// Use the reference terrain table so layout bugs get past parsing.
    reference_terrains: bool,
}

const USA_TERRAINS: &str = include_str!("../../assets/map/usa.terrains");

fuzz_target!(|input: LayoutInput| {
    let terrains = if input.reference_terrains {
        USA_TERRAINS
    } else {
        input.terrains.as_str()
    };
    let Ok(source) = BoardSource::parse(&input.layout, terrains) else {
        return;
    };
    let Ok(board) = Board::build(&source.layout, &source.terrains, &Rules::default()) else {
        return;
    };

    assert!(!board.is_empty());
    assert!(board.jail_position() < board.len());
    assert!(board.start_position() < board.len());
    for (index, space) in board.spaces().iter().enumerate() {
        assert_eq!(space.position, index);
        assert!(space.owner().is_none());
    }
});
