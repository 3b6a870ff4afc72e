//! Perft (performance test) node counts.
//!
//! Counting the leaves of the legal move tree to a fixed depth and comparing
//! against published values is the standard check of a move generator.

use super::{generate_moves, make_move};
use crate::Position;

/// Counts the leaf nodes of the legal move tree at the given depth.
pub fn perft(position: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = generate_moves(position);
    if depth == 1 {
        return moves.len() as u64;
    }

    moves
        .as_slice()
        .iter()
        .map(|&m| perft(&make_move(position, m), depth - 1))
        .sum()
}

/// Splits the perft count by root move, sorted by move text.
///
/// Comparing this against another generator's output narrows a wrong total
/// down to the move that causes it.
pub fn perft_divide(position: &Position, depth: u32) -> Vec<(String, u64)> {
    let mut results: Vec<(String, u64)> = generate_moves(position)
        .as_slice()
        .iter()
        .map(|&m| {
            let nodes = perft(&make_move(position, m), depth.saturating_sub(1));
            (m.to_uci(), nodes)
        })
        .collect();

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}
