//! Piece movement patterns on the mailbox board.
//!
//! Leapers (knight, king) use fixed offset tables; sliders walk rays until
//! they leave the board or hit a piece.

use crate::Position;
use chess_core::{Color, Square};

/// Knight jumps as `(file_delta, rank_delta)`.
pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// King steps as `(file_delta, rank_delta)`.
pub const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// Diagonal ray directions.
pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

/// Orthogonal ray directions.
pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Squares a leaper on `from` reaches with the given offsets.
pub fn leaper_targets(from: Square, offsets: &[(i8, i8)]) -> impl Iterator<Item = Square> + '_ {
    offsets
        .iter()
        .filter_map(move |&(df, dr)| from.offset(df, dr))
}

/// Returns knight targets from the given square.
#[inline]
pub fn knight_attacks(sq: Square) -> impl Iterator<Item = Square> {
    leaper_targets(sq, &KNIGHT_OFFSETS)
}

/// Returns king targets from the given square.
#[inline]
pub fn king_attacks(sq: Square) -> impl Iterator<Item = Square> {
    leaper_targets(sq, &KING_OFFSETS)
}

/// Returns the (at most two) squares a pawn of `color` on `sq` attacks.
pub fn pawn_attacks(sq: Square, color: Color) -> impl Iterator<Item = Square> {
    let dr = color.pawn_direction();
    [sq.offset(-1, dr), sq.offset(1, dr)].into_iter().flatten()
}

/// Walks a ray from `from` (exclusive) in direction `dir`, stopping after the
/// first occupied square, which is included.
pub fn ray(position: &Position, from: Square, dir: (i8, i8)) -> Ray<'_> {
    Ray {
        position,
        current: Some(from),
        dir,
        blocked: false,
    }
}

/// Iterator returned by [`ray`].
pub struct Ray<'a> {
    position: &'a Position,
    current: Option<Square>,
    dir: (i8, i8),
    blocked: bool,
}

impl Iterator for Ray<'_> {
    type Item = Square;

    fn next(&mut self) -> Option<Square> {
        if self.blocked {
            return None;
        }
        let next = self.current?.offset(self.dir.0, self.dir.1)?;
        self.current = Some(next);
        if self.position.piece_at(next).is_some() {
            self.blocked = true;
        }
        Some(next)
    }
}

/// Squares a slider on `from` reaches along the given directions.
pub fn slider_attacks<'a>(
    position: &'a Position,
    from: Square,
    directions: &'a [(i8, i8)],
) -> impl Iterator<Item = Square> + 'a {
    directions
        .iter()
        .flat_map(move |&dir| ray(position, from, dir))
}
