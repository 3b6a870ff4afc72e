//! Chess position representation.

use chess_core::{Color, FenError, FenParser, Move, Piece, Placement, Square};
use thiserror::Error;

use crate::movegen::{self, MoveList};
use crate::status::{self, GameStatus};

/// Returned by [`Position::apply_move`] for a move that is not legal in the
/// current position. The position is left untouched.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("illegal move: {0}")]
pub struct IllegalMoveError(pub Move);

/// Castling rights flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KINGSIDE: u8 = 0b0001;
    pub const WHITE_QUEENSIDE: u8 = 0b0010;
    pub const BLACK_KINGSIDE: u8 = 0b0100;
    pub const BLACK_QUEENSIDE: u8 = 0b1000;
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    /// Creates new castling rights from flags.
    #[inline]
    pub const fn new(flags: u8) -> Self {
        CastlingRights(flags & 0b1111)
    }

    /// Reads the FEN castling field (`-` or a subset of `KQkq`).
    pub fn from_fen_field(field: &str) -> Self {
        let flags = field.chars().fold(0u8, |acc, c| {
            acc | match c {
                'K' => Self::WHITE_KINGSIDE,
                'Q' => Self::WHITE_QUEENSIDE,
                'k' => Self::BLACK_KINGSIDE,
                'q' => Self::BLACK_QUEENSIDE,
                _ => 0,
            }
        });
        Self::new(flags)
    }

    /// Writes the FEN castling field.
    pub fn to_fen_field(self) -> String {
        let field: String = [
            (Self::WHITE_KINGSIDE, 'K'),
            (Self::WHITE_QUEENSIDE, 'Q'),
            (Self::BLACK_KINGSIDE, 'k'),
            (Self::BLACK_QUEENSIDE, 'q'),
        ]
        .iter()
        .filter(|(flag, _)| self.0 & flag != 0)
        .map(|&(_, c)| c)
        .collect();
        if field.is_empty() {
            "-".to_string()
        } else {
            field
        }
    }

    /// Returns true if the given side can castle kingside.
    #[inline]
    pub const fn can_castle_kingside(self, color: Color) -> bool {
        let flag = match color {
            Color::White => Self::WHITE_KINGSIDE,
            Color::Black => Self::BLACK_KINGSIDE,
        };
        (self.0 & flag) != 0
    }

    /// Returns true if the given side can castle queenside.
    #[inline]
    pub const fn can_castle_queenside(self, color: Color) -> bool {
        let flag = match color {
            Color::White => Self::WHITE_QUEENSIDE,
            Color::Black => Self::BLACK_QUEENSIDE,
        };
        (self.0 & flag) != 0
    }

    /// Removes castling rights for a color.
    #[inline]
    pub fn remove_color(&mut self, color: Color) {
        self.remove_kingside(color);
        self.remove_queenside(color);
    }

    /// Removes kingside castling for a color.
    #[inline]
    pub fn remove_kingside(&mut self, color: Color) {
        let mask = match color {
            Color::White => !Self::WHITE_KINGSIDE,
            Color::Black => !Self::BLACK_KINGSIDE,
        };
        self.0 &= mask;
    }

    /// Removes queenside castling for a color.
    #[inline]
    pub fn remove_queenside(&mut self, color: Color) {
        let mask = match color {
            Color::White => !Self::WHITE_QUEENSIDE,
            Color::Black => !Self::BLACK_QUEENSIDE,
        };
        self.0 &= mask;
    }

    /// Returns the raw flags.
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

/// Complete chess position state.
///
/// The board is a fixed table of 64 cells indexed by [`Square::index`].
/// Fields are read-only from outside the crate; the only way to change a
/// position is [`Position::apply_move`] (or [`Position::reset`]), which keeps
/// the side that just moved out of check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub(crate) board: Placement,
    pub(crate) side_to_move: Color,
    pub(crate) castling: CastlingRights,
    pub(crate) en_passant: Option<Square>,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
}

impl Position {
    /// Creates the standard starting position.
    pub fn startpos() -> Self {
        Self::from_fen(FenParser::STARTPOS).expect("STARTPOS is valid")
    }

    /// Creates a position from a FEN string.
    ///
    /// Only field syntax is checked; callers setting up positions by hand are
    /// responsible for them making sense (one king per side, side not to move
    /// not in check).
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parsed = FenParser::parse(fen)?;
        Ok(Position {
            board: parsed.placement,
            side_to_move: parsed.active_color,
            castling: CastlingRights::from_fen_field(&parsed.castling),
            en_passant: parsed.en_passant,
            halfmove_clock: parsed.halfmove_clock,
            fullmove_number: parsed.fullmove_number,
        })
    }

    /// Converts the position to a FEN string.
    pub fn to_fen(&self) -> String {
        FenParser {
            placement: self.board,
            active_color: self.side_to_move,
            castling: self.castling.to_fen_field(),
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        }
        .to_fen()
    }

    /// Restores the standard starting position.
    pub fn reset(&mut self) {
        *self = Self::startpos();
    }

    /// Returns the piece and color at the given square, if any.
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<(Piece, Color)> {
        self.board[sq.index() as usize]
    }

    /// Returns a copy of the whole board.
    pub fn board(&self) -> Placement {
        self.board
    }

    /// The side to move.
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// Current castling rights.
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    /// Square a pawn may capture onto en passant this move, if any.
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    /// Half-moves since the last pawn move or capture.
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// Fullmove number (starts at 1, increments after Black's move).
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Returns the square of the given side's king.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        Square::all().find(|&sq| self.piece_at(sq) == Some((Piece::King, color)))
    }

    /// Iterates over the squares occupied by the given color.
    pub fn squares_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| match self.piece_at(sq) {
            Some((piece, c)) if c == color => Some((sq, piece)),
            _ => None,
        })
    }

    /// Generates every legal move for the side to move.
    pub fn legal_moves(&self) -> MoveList {
        movegen::generate_moves(self)
    }

    /// Returns true if `m` is one of [`legal_moves`](Self::legal_moves).
    ///
    /// Only the moves of the piece on `m.from()` are generated.
    pub fn is_legal(&self, m: Move) -> bool {
        movegen::generate_moves_from(self, m.from())
            .as_slice()
            .contains(&m)
    }

    /// Plays a legal move.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalMoveError`] if `m` is not legal here; nothing is
    /// changed in that case.
    pub fn apply_move(&mut self, m: Move) -> Result<(), IllegalMoveError> {
        if !self.is_legal(m) {
            return Err(IllegalMoveError(m));
        }
        *self = movegen::make_move(self, m);
        Ok(())
    }

    /// Returns true if the side to move is in check.
    pub fn is_check(&self) -> bool {
        movegen::is_king_attacked(self, self.side_to_move)
    }

    /// Derives the game status from this position.
    pub fn status(&self) -> GameStatus {
        status::game_status(self)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}
