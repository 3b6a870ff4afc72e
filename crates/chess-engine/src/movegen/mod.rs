//! Move generation.
//!
//! Moves are produced per piece kind as pseudo-legal candidates on the
//! mailbox board, then filtered: a candidate survives only if the mover's
//! king is not attacked after it is played.

mod attacks;
pub mod perft;

use crate::Position;
use chess_core::{Color, Move, Piece, Square};

pub use attacks::{
    king_attacks, knight_attacks, pawn_attacks, ray, slider_attacks, Ray, BISHOP_DIRECTIONS,
    ROOK_DIRECTIONS,
};

/// A list of moves with a fixed maximum capacity.
///
/// Chess positions have at most 218 legal moves, so we use a fixed-size
/// array to avoid heap allocations during move generation.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    /// Maximum number of legal moves in any chess position.
    pub const MAX_MOVES: usize = 256;

    /// Filler for unused slots; never observable through the public API.
    const EMPTY_SLOT: Move = Move::new(Square::A1, Square::A1);

    /// Creates an empty move list.
    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [Self::EMPTY_SLOT; Self::MAX_MOVES],
            len: 0,
        }
    }

    /// Adds a move to the list.
    #[inline]
    pub fn push(&mut self, m: Move) {
        debug_assert!(self.len < Self::MAX_MOVES);
        self.moves[self.len] = m;
        self.len += 1;
    }

    /// Returns the number of moves.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the list is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns a slice of the moves.
    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    /// Returns true if the list holds `m`.
    #[inline]
    pub fn contains(&self, m: Move) -> bool {
        self.as_slice().contains(&m)
    }

    /// Retains only moves for which the predicate returns true.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&Move) -> bool,
    {
        let mut write = 0;
        for read in 0..self.len {
            if f(&self.moves[read]) {
                self.moves[write] = self.moves[read];
                write += 1;
            }
        }
        self.len = write;
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.as_slice()[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Generates all legal moves for the given position.
pub fn generate_moves(position: &Position) -> MoveList {
    let mut moves = MoveList::new();
    let us = position.side_to_move;

    for (from, piece) in position.squares_of(us) {
        generate_piece_moves(position, from, piece, &mut moves);
    }
    generate_castling_moves(position, &mut moves);

    retain_legal(position, &mut moves);
    moves
}

/// Generates the legal moves of the piece standing on `from`.
///
/// Returns an empty list if `from` is empty or holds an opposing piece.
pub fn generate_moves_from(position: &Position, from: Square) -> MoveList {
    let mut moves = MoveList::new();
    let us = position.side_to_move;

    match position.piece_at(from) {
        Some((piece, color)) if color == us => {
            generate_piece_moves(position, from, piece, &mut moves);
            if piece == Piece::King {
                generate_castling_moves(position, &mut moves);
            }
        }
        _ => return moves,
    }

    retain_legal(position, &mut moves);
    moves
}

/// Drops candidates that leave the mover's own king attacked.
fn retain_legal(position: &Position, moves: &mut MoveList) {
    let us = position.side_to_move;
    moves.retain(|m| {
        let new_pos = make_move(position, *m);
        !is_king_attacked(&new_pos, us)
    });
}

fn generate_piece_moves(position: &Position, from: Square, piece: Piece, moves: &mut MoveList) {
    match piece {
        Piece::Pawn => generate_pawn_moves(position, from, moves),
        Piece::Knight => push_targets(position, from, knight_attacks(from), moves),
        Piece::Bishop => push_targets(
            position,
            from,
            slider_attacks(position, from, &BISHOP_DIRECTIONS),
            moves,
        ),
        Piece::Rook => push_targets(
            position,
            from,
            slider_attacks(position, from, &ROOK_DIRECTIONS),
            moves,
        ),
        Piece::Queen => {
            push_targets(
                position,
                from,
                slider_attacks(position, from, &BISHOP_DIRECTIONS),
                moves,
            );
            push_targets(
                position,
                from,
                slider_attacks(position, from, &ROOK_DIRECTIONS),
                moves,
            );
        }
        Piece::King => push_targets(position, from, king_attacks(from), moves),
    }
}

/// Pushes a move to every target not occupied by one of our own pieces.
fn push_targets(
    position: &Position,
    from: Square,
    targets: impl Iterator<Item = Square>,
    moves: &mut MoveList,
) {
    let us = position.side_to_move;
    for to in targets {
        match position.piece_at(to) {
            Some((_, color)) if color == us => {}
            _ => moves.push(Move::new(from, to)),
        }
    }
}

/// Pushes a pawn move, expanding it into all four promotions on the last rank.
fn push_pawn_move(us: Color, from: Square, to: Square, moves: &mut MoveList) {
    if to.rank_index() == us.promotion_rank() {
        for piece in Piece::PROMOTIONS {
            moves.push(Move::with_promotion(from, to, piece));
        }
    } else {
        moves.push(Move::new(from, to));
    }
}

/// Generates pseudo-legal moves for the pawn on `from`.
fn generate_pawn_moves(position: &Position, from: Square, moves: &mut MoveList) {
    let us = position.side_to_move;
    let dir = us.pawn_direction();

    // Pushes
    if let Some(one) = from.offset(0, dir) {
        if position.piece_at(one).is_none() {
            push_pawn_move(us, from, one, moves);

            if from.rank_index() == us.pawn_rank() {
                if let Some(two) = one.offset(0, dir) {
                    if position.piece_at(two).is_none() {
                        moves.push(Move::new(from, two));
                    }
                }
            }
        }
    }

    // Captures, including en passant onto the target square
    for to in pawn_attacks(from, us) {
        match position.piece_at(to) {
            Some((_, color)) if color != us => push_pawn_move(us, from, to, moves),
            None if position.en_passant == Some(to) => moves.push(Move::new(from, to)),
            _ => {}
        }
    }
}

/// Generates castling moves if legal.
///
/// Requires the right to be intact, the king and rook on their home squares,
/// the squares between them empty, and the king's start, transit and
/// destination squares unattacked.
fn generate_castling_moves(position: &Position, moves: &mut MoveList) {
    let us = position.side_to_move;
    let them = us.opposite();

    let (king_start, rook_kingside, rook_queenside) = match us {
        Color::White => (Square::E1, Square::H1, Square::A1),
        Color::Black => (Square::E8, Square::H8, Square::A8),
    };
    if position.piece_at(king_start) != Some((Piece::King, us)) {
        return;
    }
    if is_square_attacked(position, king_start, them) {
        return;
    }

    let empty = |squares: &[Square]| squares.iter().all(|&sq| position.piece_at(sq).is_none());
    let safe = |squares: &[Square]| squares.iter().all(|&sq| !is_square_attacked(position, sq, them));

    // Kingside castling
    if position.castling.can_castle_kingside(us)
        && position.piece_at(rook_kingside) == Some((Piece::Rook, us))
    {
        let (f, g) = match us {
            Color::White => (Square::F1, Square::G1),
            Color::Black => (Square::F8, Square::G8),
        };
        if empty(&[f, g]) && safe(&[f, g]) {
            moves.push(Move::new(king_start, g));
        }
    }

    // Queenside castling
    if position.castling.can_castle_queenside(us)
        && position.piece_at(rook_queenside) == Some((Piece::Rook, us))
    {
        let (b, c, d) = match us {
            Color::White => (Square::B1, Square::C1, Square::D1),
            Color::Black => (Square::B8, Square::C8, Square::D8),
        };
        if empty(&[b, c, d]) && safe(&[d, c]) {
            moves.push(Move::new(king_start, c));
        }
    }
}

/// Returns true if the given square is attacked by the given color.
pub fn is_square_attacked(position: &Position, sq: Square, by_color: Color) -> bool {
    let holds = |target: Square, pieces: &[Piece]| {
        matches!(position.piece_at(target), Some((p, c)) if c == by_color && pieces.contains(&p))
    };

    // A pawn of `by_color` attacks `sq` from where a pawn of the other color
    // on `sq` would attack.
    if pawn_attacks(sq, by_color.opposite()).any(|from| holds(from, &[Piece::Pawn])) {
        return true;
    }

    if knight_attacks(sq).any(|from| holds(from, &[Piece::Knight])) {
        return true;
    }

    if king_attacks(sq).any(|from| holds(from, &[Piece::King])) {
        return true;
    }

    // Only the last square of each ray can hold a piece.
    if BISHOP_DIRECTIONS
        .iter()
        .filter_map(|&dir| ray(position, sq, dir).last())
        .any(|from| holds(from, &[Piece::Bishop, Piece::Queen]))
    {
        return true;
    }

    ROOK_DIRECTIONS
        .iter()
        .filter_map(|&dir| ray(position, sq, dir).last())
        .any(|from| holds(from, &[Piece::Rook, Piece::Queen]))
}

/// Returns true if the king of the given color is in check.
pub fn is_king_attacked(position: &Position, king_color: Color) -> bool {
    match position.king_square(king_color) {
        Some(king_sq) => is_square_attacked(position, king_sq, king_color.opposite()),
        None => false,
    }
}

/// Plays a pseudo-legal move and returns the new position.
///
/// Callers outside this module go through [`Position::apply_move`], which
/// checks legality first.
pub(crate) fn make_move(position: &Position, m: Move) -> Position {
    let mut new_pos = position.clone();
    let us = position.side_to_move;
    let them = us.opposite();
    let from = m.from();
    let to = m.to();

    let Some((piece, _)) = position.piece_at(from) else {
        return new_pos;
    };

    let mut is_capture = position.piece_at(to).is_some();
    new_pos.board[from.index() as usize] = None;

    // En passant: a pawn moving diagonally onto an empty square
    if piece == Piece::Pawn && from.file_index() != to.file_index() && !is_capture {
        if let Some(captured_sq) = to.offset(0, -us.pawn_direction()) {
            new_pos.board[captured_sq.index() as usize] = None;
        }
        is_capture = true;
    }

    let dest_piece = m.promotion().unwrap_or(piece);
    new_pos.board[to.index() as usize] = Some((dest_piece, us));

    // Castling: the king moves two files, the rook hops over it
    if piece == Piece::King && from.file_index().abs_diff(to.file_index()) == 2 {
        let rank = us.back_rank();
        let (rook_from, rook_to) = if to.file_index() > from.file_index() {
            (Square::from_coords(7, rank), Square::from_coords(5, rank))
        } else {
            (Square::from_coords(0, rank), Square::from_coords(3, rank))
        };
        if let (Some(rook_from), Some(rook_to)) = (rook_from, rook_to) {
            new_pos.board[rook_from.index() as usize] = None;
            new_pos.board[rook_to.index() as usize] = Some((Piece::Rook, us));
        }
    }

    // Update castling rights
    // King move removes all castling rights for that color
    if piece == Piece::King {
        new_pos.castling.remove_color(us);
    }
    // Any move from or onto a rook home square removes the matching right
    for sq in [from, to] {
        match sq {
            sq if sq == Square::H1 => new_pos.castling.remove_kingside(Color::White),
            sq if sq == Square::A1 => new_pos.castling.remove_queenside(Color::White),
            sq if sq == Square::H8 => new_pos.castling.remove_kingside(Color::Black),
            sq if sq == Square::A8 => new_pos.castling.remove_queenside(Color::Black),
            _ => {}
        }
    }

    // En passant target: only after a double step that an enemy pawn could
    // actually answer by capturing on the skipped square.
    new_pos.en_passant = None;
    if piece == Piece::Pawn && from.rank_index().abs_diff(to.rank_index()) == 2 {
        let capturable = [to.offset(-1, 0), to.offset(1, 0)]
            .into_iter()
            .flatten()
            .any(|sq| position.piece_at(sq) == Some((Piece::Pawn, them)));
        if capturable {
            new_pos.en_passant = to.offset(0, -us.pawn_direction());
        }
    }

    // Update clocks
    if piece == Piece::Pawn || is_capture {
        new_pos.halfmove_clock = 0;
    } else {
        new_pos.halfmove_clock += 1;
    }

    if us == Color::Black {
        new_pos.fullmove_number += 1;
    }

    new_pos.side_to_move = them;

    new_pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::{File, Rank};

    fn mv(text: &str) -> Move {
        Move::parse(text).unwrap()
    }

    fn has(moves: &MoveList, text: &str) -> bool {
        moves.contains(mv(text))
    }

    #[test]
    fn movelist_push_and_iterate() {
        let mut list = MoveList::new();
        assert!(list.is_empty());

        let m1 = mv("e2e4");
        let m2 = mv("d2d4");
        list.push(m1);
        list.push(m2);

        assert_eq!(list.len(), 2);
        assert_eq!(list[0], m1);
        assert_eq!(list[1], m2);
        assert_eq!((&list).into_iter().count(), 2);
    }

    #[test]
    fn movelist_retain() {
        let mut list = MoveList::default();
        list.push(mv("e2e3"));
        list.push(mv("e2e4"));
        list.push(mv("e3e4"));

        let e2 = Square::new(File::E, Rank::R2);
        list.retain(|m| m.from() == e2);
        assert_eq!(list.len(), 2);
        assert!(!list.contains(mv("e3e4")));
    }

    #[test]
    fn generate_moves_startpos() {
        let position = Position::startpos();
        let moves = generate_moves(&position);
        assert_eq!(moves.len(), 20); // 16 pawn moves + 4 knight moves
        assert!(has(&moves, "e2e4"));
        assert!(has(&moves, "b1c3"));
        assert!(!has(&moves, "e1e2"));
    }

    #[test]
    fn generate_moves_from_single_piece() {
        let position = Position::startpos();
        assert_eq!(generate_moves_from(&position, Square::G1).len(), 2);
        assert!(generate_moves_from(&position, Square::E8).is_empty());
        assert!(generate_moves_from(&position, Square::new(File::E, Rank::R4)).is_empty());
    }

    #[test]
    fn is_square_attacked_startpos() {
        let position = Position::startpos();
        assert!(is_square_attacked(
            &position,
            Square::new(File::E, Rank::R3),
            Color::White
        ));
        assert!(!is_square_attacked(
            &position,
            Square::new(File::E, Rank::R4),
            Color::White
        ));
        assert!(is_square_attacked(
            &position,
            Square::new(File::F, Rank::R6),
            Color::Black
        ));
    }

    #[test]
    fn sliders_attack_through_empty_squares_only() {
        let position = Position::from_fen("4k3/8/8/8/8/8/4P3/4R1K1 w - - 0 1").unwrap();
        // The e2 pawn shields the e-file above it.
        assert!(is_square_attacked(&position, Square::new(File::E, Rank::R2), Color::White));
        assert!(!is_square_attacked(&position, Square::new(File::E, Rank::R5), Color::White));
    }

    #[test]
    fn is_king_attacked_startpos() {
        let position = Position::startpos();
        assert!(!is_king_attacked(&position, Color::White));
        assert!(!is_king_attacked(&position, Color::Black));
    }

    #[test]
    fn castling_both_sides() {
        let position =
            Position::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        let moves = generate_moves(&position);
        assert!(has(&moves, "e1g1"));
        assert!(has(&moves, "e1c1"));
    }

    #[test]
    fn no_castling_through_check() {
        // The rooks on d5 and f5 cover d1 and f1.
        let position =
            Position::from_fen("4k3/8/8/3r1r2/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let moves = generate_moves(&position);
        assert!(!has(&moves, "e1g1"));
        assert!(!has(&moves, "e1c1"));
    }

    #[test]
    fn no_castling_out_of_check() {
        let position = Position::from_fen("4k3/8/8/4r3/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let moves = generate_moves(&position);
        assert!(!has(&moves, "e1g1"));
        assert!(!has(&moves, "e1c1"));
    }

    #[test]
    fn queenside_castling_ignores_attacked_b_file() {
        // b1 is attacked, but the king never crosses it.
        let position = Position::from_fen("4k3/8/8/1r6/8/8/8/R3K3 w Q - 0 1").unwrap();
        assert!(has(&generate_moves(&position), "e1c1"));
    }

    #[test]
    fn no_castling_without_rook() {
        let position = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w KQ - 0 1").unwrap();
        let moves = generate_moves(&position);
        assert!(!has(&moves, "e1g1"));
        assert!(!has(&moves, "e1c1"));
    }

    #[test]
    fn en_passant_capture() {
        let position =
            Position::from_fen("rnbqkbnr/pppp1ppp/8/4pP2/8/8/PPPPP1PP/RNBQKBNR w KQkq e6 0 1")
                .unwrap();
        let moves = generate_moves(&position);
        assert!(has(&moves, "f5e6"));
    }

    #[test]
    fn en_passant_cannot_expose_king() {
        // Taking on d6 would open the fifth rank to the h5 rook.
        let position = Position::from_fen("8/8/8/K2pP2r/8/8/8/7k w - d6 0 1").unwrap();
        assert!(!has(&generate_moves(&position), "e5d6"));
    }

    #[test]
    fn promotion_generates_four_pieces() {
        let position = Position::from_fen("8/P7/8/8/8/8/8/4K2k w - - 0 1").unwrap();
        let moves = generate_moves(&position);
        let promos: Vec<_> = moves
            .as_slice()
            .iter()
            .filter(|m| m.promotion().is_some())
            .collect();
        assert_eq!(promos.len(), 4);
        assert!(has(&moves, "a7a8q"));
        assert!(has(&moves, "a7a8n"));
    }

    #[test]
    fn pinned_piece_cannot_move() {
        // The e2 knight is pinned by the e8 rook against the e1 king.
        let position = Position::from_fen("4r2k/8/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
        assert!(generate_moves_from(&position, Square::new(File::E, Rank::R2)).is_empty());
    }

    #[test]
    fn make_move_double_push_without_neighbor() {
        let position = Position::startpos();
        let new_pos = make_move(&position, mv("e2e4"));
        assert_eq!(new_pos.side_to_move, Color::Black);
        assert!(new_pos.piece_at(Square::new(File::E, Rank::R4)).is_some());
        assert!(new_pos.piece_at(Square::new(File::E, Rank::R2)).is_none());
        assert_eq!(new_pos.en_passant, None);
    }

    #[test]
    fn make_move_knight() {
        let position = Position::startpos();
        let f3 = Square::new(File::F, Rank::R3);
        let new_pos = make_move(&position, mv("g1f3"));
        assert_eq!(new_pos.piece_at(f3), Some((Piece::Knight, Color::White)));
        assert!(new_pos.piece_at(Square::G1).is_none());
        assert_eq!(new_pos.halfmove_clock, 1);
    }
}
