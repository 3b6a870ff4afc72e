//! Game status derived from a single position.

use crate::movegen::{generate_moves, is_king_attacked};
use crate::Position;
use chess_core::{Color, Piece};
use std::fmt;

/// Why a game ended in a draw other than stalemate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawReason {
    /// 100 half-moves without a pawn move or capture.
    FiftyMoveRule,
    /// Neither side has the material to deliver mate.
    InsufficientMaterial,
}

/// Where a game stands.
///
/// Anything other than `InProgress` is terminal: no further moves are
/// accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Checkmate { winner: Color },
    Stalemate,
    Draw(DrawReason),
}

impl GameStatus {
    /// Returns true if the game is over.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::InProgress => write!(f, "in progress"),
            GameStatus::Checkmate { winner } => write!(f, "checkmate, {winner} wins"),
            GameStatus::Stalemate => write!(f, "stalemate"),
            GameStatus::Draw(DrawReason::FiftyMoveRule) => write!(f, "draw by the fifty-move rule"),
            GameStatus::Draw(DrawReason::InsufficientMaterial) => {
                write!(f, "draw by insufficient material")
            }
        }
    }
}

/// Derives the status of `position`.
///
/// Having no legal move takes precedence over the draw rules: a mate
/// delivered on the hundredth half-move is still mate.
pub fn game_status(position: &Position) -> GameStatus {
    let us = position.side_to_move;

    if generate_moves(position).is_empty() {
        return if is_king_attacked(position, us) {
            GameStatus::Checkmate {
                winner: us.opposite(),
            }
        } else {
            GameStatus::Stalemate
        };
    }

    if position.halfmove_clock >= 100 {
        return GameStatus::Draw(DrawReason::FiftyMoveRule);
    }

    if is_insufficient_material(position) {
        return GameStatus::Draw(DrawReason::InsufficientMaterial);
    }

    GameStatus::InProgress
}

/// Returns true for K v K and a lone king against king and one minor piece.
pub fn is_insufficient_material(position: &Position) -> bool {
    let mut minors = 0;
    for (piece, _) in position.board.iter().flatten() {
        match piece {
            Piece::King => {}
            p if p.is_minor() => minors += 1,
            _ => return false,
        }
    }
    minors <= 1
}
