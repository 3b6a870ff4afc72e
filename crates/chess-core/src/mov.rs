//! Move representation and its square-pair text encoding.

use crate::{Piece, Square};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when reading move text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The text is not `<file><rank><file><rank>[n|b|r|q]`.
    #[error("malformed move '{0}': expected a square pair such as e2e4 or e7e8q")]
    Malformed(String),
}

/// A chess move.
///
/// Castling is written as the king's two-square step (`e1g1`) and en passant
/// as the capturing pawn's diagonal step, so a move is fully described by its
/// squares and an optional promotion piece. Whether it is legal, and what it
/// captures, depends on the position it is played in.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    from: Square,
    to: Square,
    promotion: Option<Piece>,
}

impl Move {
    /// Creates a move without promotion.
    #[inline]
    pub const fn new(from: Square, to: Square) -> Self {
        Move {
            from,
            to,
            promotion: None,
        }
    }

    /// Creates a promoting pawn move.
    #[inline]
    pub const fn with_promotion(from: Square, to: Square, piece: Piece) -> Self {
        Move {
            from,
            to,
            promotion: Some(piece),
        }
    }

    /// Returns the source square.
    #[inline]
    pub const fn from(self) -> Square {
        self.from
    }

    /// Returns the destination square.
    #[inline]
    pub const fn to(self) -> Square {
        self.to
    }

    /// Returns the promotion piece, if any.
    #[inline]
    pub const fn promotion(self) -> Option<Piece> {
        self.promotion
    }

    /// Parses move text of the form `<file><rank><file><rank>[promo]`.
    ///
    /// Files are `a`-`h`, ranks `1`-`8` and the optional promotion letter one
    /// of `n`, `b`, `r`, `q`; letters are accepted in either case. The check is
    /// purely syntactic: `e2e5` parses fine and is rejected later by the
    /// position.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let malformed = || ParseError::Malformed(text.to_string());

        let chars: Vec<char> = text.chars().collect();
        if chars.len() != 4 && chars.len() != 5 {
            return Err(malformed());
        }

        let square = |f: char, r: char| {
            let file = crate::File::from_char(f)?;
            let rank = crate::Rank::from_char(r)?;
            Some(Square::new(file, rank))
        };
        let from = square(chars[0], chars[1]).ok_or_else(malformed)?;
        let to = square(chars[2], chars[3]).ok_or_else(malformed)?;

        let promotion = match chars.get(4) {
            Some(&c) => Some(Piece::from_promotion_char(c).ok_or_else(malformed)?),
            None => None,
        };

        Ok(Move {
            from,
            to,
            promotion,
        })
    }

    /// Returns the lowercase text form of this move (e.g., "e2e4", "e7e8q").
    pub fn to_uci(self) -> String {
        let mut s = format!("{}{}", self.from, self.to);
        if let Some(piece) = self.promotion {
            s.push(piece.to_char());
        }
        s
    }
}

impl FromStr for Move {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Move::parse(s)
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({})", self.to_uci())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}
