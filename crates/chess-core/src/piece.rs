//! Chess piece representation.

use crate::Color;

/// The six kinds of chess pieces.
///
/// Board cells pair a kind with its [`Color`] as `(Piece, Color)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Piece {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl Piece {
    /// All piece kinds in order.
    pub const ALL: [Piece; 6] = [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ];

    /// The pieces a pawn may promote to, strongest first.
    pub const PROMOTIONS: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

    /// Returns the index of this piece kind (0-5).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase letter used for this piece in FEN and move suffixes.
    #[inline]
    pub const fn to_char(self) -> char {
        match self {
            Piece::Pawn => 'p',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Rook => 'r',
            Piece::Queen => 'q',
            Piece::King => 'k',
        }
    }

    /// Returns the FEN character for this piece with the given color.
    pub const fn to_fen_char(self, color: Color) -> char {
        let c = self.to_char();
        match color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// Parses a FEN character into a piece and color.
    pub const fn from_fen_char(c: char) -> Option<(Piece, Color)> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let piece = match c.to_ascii_lowercase() {
            'p' => Piece::Pawn,
            'n' => Piece::Knight,
            'b' => Piece::Bishop,
            'r' => Piece::Rook,
            'q' => Piece::Queen,
            'k' => Piece::King,
            _ => return None,
        };
        Some((piece, color))
    }

    /// Parses a promotion suffix letter (`n`, `b`, `r`, `q`, either case).
    pub const fn from_promotion_char(c: char) -> Option<Piece> {
        match c.to_ascii_lowercase() {
            'n' => Some(Piece::Knight),
            'b' => Some(Piece::Bishop),
            'r' => Some(Piece::Rook),
            'q' => Some(Piece::Queen),
            _ => None,
        }
    }

    /// Returns true for knights and bishops.
    #[inline]
    pub const fn is_minor(self) -> bool {
        matches!(self, Piece::Knight | Piece::Bishop)
    }
}

impl std::fmt::Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Piece::Pawn => "Pawn",
            Piece::Knight => "Knight",
            Piece::Bishop => "Bishop",
            Piece::Rook => "Rook",
            Piece::Queen => "Queen",
            Piece::King => "King",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_to_fen() {
        assert_eq!(Piece::Pawn.to_fen_char(Color::White), 'P');
        assert_eq!(Piece::Pawn.to_fen_char(Color::Black), 'p');
        assert_eq!(Piece::King.to_fen_char(Color::White), 'K');
        assert_eq!(Piece::Knight.to_fen_char(Color::Black), 'n');
    }

    #[test]
    fn piece_from_fen() {
        assert_eq!(Piece::from_fen_char('P'), Some((Piece::Pawn, Color::White)));
        assert_eq!(Piece::from_fen_char('p'), Some((Piece::Pawn, Color::Black)));
        assert_eq!(Piece::from_fen_char('K'), Some((Piece::King, Color::White)));
        assert_eq!(Piece::from_fen_char('x'), None);
    }

    #[test]
    fn promotion_letters() {
        for piece in Piece::PROMOTIONS {
            assert_eq!(Piece::from_promotion_char(piece.to_char()), Some(piece));
            assert_eq!(
                Piece::from_promotion_char(piece.to_char().to_ascii_uppercase()),
                Some(piece)
            );
        }
        assert_eq!(Piece::from_promotion_char('k'), None);
        assert_eq!(Piece::from_promotion_char('p'), None);
    }

    #[test]
    fn minor_pieces() {
        assert!(Piece::Knight.is_minor());
        assert!(Piece::Bishop.is_minor());
        assert!(!Piece::Rook.is_minor());
        assert!(!Piece::Pawn.is_minor());
    }
}
