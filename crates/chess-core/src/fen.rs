//! FEN (Forsyth-Edwards Notation) parsing and serialization.
//!
//! This is the single-line board description handed to the engine: piece
//! placement from rank 8 down to rank 1 (files a to h, digits for runs of
//! empty squares), side to move, castling availability, en passant target,
//! halfmove clock and fullmove number, separated by single spaces.

use crate::{Color, Piece, Square};
use std::fmt;
use thiserror::Error;

/// Errors that can occur when parsing FEN strings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 6 parts, got {0}")]
    InvalidPartCount(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid active color: expected 'w' or 'b', got '{0}'")]
    InvalidActiveColor(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastlingRights(String),

    #[error("invalid en passant square: {0}")]
    InvalidEnPassantSquare(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),
}

/// A board occupancy table indexed by [`Square::index`].
pub type Placement = [Option<(Piece, Color)>; 64];

/// Parsed FEN fields.
///
/// Each field has been checked for syntax; whether the described position
/// could arise in a game is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenParser {
    /// Occupancy of every square.
    pub placement: Placement,
    /// Side to move.
    pub active_color: Color,
    /// Castling availability as written (`-` or a subset of `KQkq`).
    pub castling: String,
    /// En passant target square.
    pub en_passant: Option<Square>,
    /// Halfmove clock (for the 50-move rule).
    pub halfmove_clock: u32,
    /// Fullmove number.
    pub fullmove_number: u32,
}

impl FenParser {
    /// The standard starting position FEN.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Parses a FEN string.
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();

        if parts.len() != 6 {
            return Err(FenError::InvalidPartCount(parts.len()));
        }

        let placement = Self::parse_placement(parts[0])?;

        let active_color = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidActiveColor(other.to_string())),
        };

        Self::validate_castling(parts[2])?;
        let en_passant = Self::parse_en_passant(parts[3])?;

        let halfmove_clock = parts[4]
            .parse::<u32>()
            .map_err(|_| FenError::InvalidHalfmoveClock(parts[4].to_string()))?;

        let fullmove_number = parts[5]
            .parse::<u32>()
            .ok()
            .filter(|&n| n >= 1)
            .ok_or_else(|| FenError::InvalidFullmoveNumber(parts[5].to_string()))?;

        Ok(FenParser {
            placement,
            active_color,
            castling: parts[2].to_string(),
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    fn parse_placement(placement: &str) -> Result<Placement, FenError> {
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidPiecePlacement(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        let mut board: Placement = [None; 64];
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for c in rank_str.chars() {
                if let Some(run) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                    file += run as u8;
                } else if let Some(piece) = Piece::from_fen_char(c) {
                    if let Some(sq) = Square::from_coords(file, rank) {
                        board[sq.index() as usize] = Some(piece);
                    }
                    file += 1;
                } else {
                    return Err(FenError::InvalidPiecePlacement(format!(
                        "invalid character '{}' in rank {}",
                        c,
                        rank + 1
                    )));
                }
                if file > 8 {
                    break;
                }
            }
            if file != 8 {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "rank {} does not describe exactly 8 squares",
                    rank + 1
                )));
            }
        }

        Ok(board)
    }

    fn validate_castling(castling: &str) -> Result<(), FenError> {
        if castling == "-" {
            return Ok(());
        }

        let mut seen = String::new();
        for c in castling.chars() {
            if !"KQkq".contains(c) || seen.contains(c) {
                return Err(FenError::InvalidCastlingRights(castling.to_string()));
            }
            seen.push(c);
        }

        Ok(())
    }

    fn parse_en_passant(ep: &str) -> Result<Option<Square>, FenError> {
        if ep == "-" {
            return Ok(None);
        }

        // Square names in FEN are lowercase, unlike typed move text.
        if ep.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(FenError::InvalidEnPassantSquare(ep.to_string()));
        }

        match Square::from_algebraic(ep) {
            Some(sq) if sq.rank_index() == 2 || sq.rank_index() == 5 => Ok(Some(sq)),
            _ => Err(FenError::InvalidEnPassantSquare(ep.to_string())),
        }
    }

    /// Writes the piece placement field.
    fn placement_field(&self) -> String {
        let mut field = String::new();
        for rank in (0..8u8).rev() {
            let mut empty = 0;
            for file in 0..8u8 {
                let cell = Square::from_coords(file, rank)
                    .and_then(|sq| self.placement[sq.index() as usize]);
                match cell {
                    Some((piece, color)) => {
                        if empty > 0 {
                            field.push_str(&empty.to_string());
                            empty = 0;
                        }
                        field.push(piece.to_fen_char(color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                field.push_str(&empty.to_string());
            }
            if rank > 0 {
                field.push('/');
            }
        }
        field
    }

    /// Converts the parsed FEN back to a FEN string.
    pub fn to_fen(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FenParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ep = self
            .en_passant
            .map(|sq| sq.to_algebraic())
            .unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "{} {} {} {} {} {}",
            self.placement_field(),
            self.active_color.fen_char(),
            self.castling,
            ep,
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

impl Default for FenParser {
    fn default() -> Self {
        Self::parse(Self::STARTPOS).expect("STARTPOS is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{File, Rank};

    #[test]
    fn parse_startpos() {
        let fen = FenParser::parse(FenParser::STARTPOS).unwrap();
        assert_eq!(fen.active_color, Color::White);
        assert_eq!(fen.castling, "KQkq");
        assert_eq!(fen.en_passant, None);
        assert_eq!(fen.halfmove_clock, 0);
        assert_eq!(fen.fullmove_number, 1);
        assert_eq!(
            fen.placement[Square::E1.index() as usize],
            Some((Piece::King, Color::White))
        );
        assert_eq!(
            fen.placement[Square::D8.index() as usize],
            Some((Piece::Queen, Color::Black))
        );
        assert_eq!(fen.placement.iter().filter(|c| c.is_some()).count(), 32);
    }

    #[test]
    fn roundtrip() {
        for original in [
            FenParser::STARTPOS,
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
            "8/8/8/8/8/8/8/4K2k w - - 0 1",
        ] {
            let parsed = FenParser::parse(original).unwrap();
            assert_eq!(parsed.to_fen(), original);
        }
    }

    #[test]
    fn en_passant_square() {
        let fen = FenParser::parse("8/8/8/8/8/8/8/8 b - d6 0 1").unwrap();
        assert_eq!(fen.en_passant, Some(Square::new(File::D, Rank::R6)));
    }

    #[test]
    fn invalid_part_count() {
        assert!(matches!(
            FenParser::parse("invalid"),
            Err(FenError::InvalidPartCount(1))
        ));
    }

    #[test]
    fn invalid_active_color() {
        assert!(matches!(
            FenParser::parse("8/8/8/8/8/8/8/8 x KQkq - 0 1"),
            Err(FenError::InvalidActiveColor(_))
        ));
    }

    #[test]
    fn invalid_piece_placement() {
        for bad in [
            "8/8/8/8/8/8/8 w - - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPXPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnrr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "7/8/8/8/8/8/8/8 w - - 0 1",
            "9/8/8/8/8/8/8/8 w - - 0 1",
        ] {
            assert!(
                matches!(FenParser::parse(bad), Err(FenError::InvalidPiecePlacement(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn invalid_castling_rights() {
        assert!(matches!(
            FenParser::parse("8/8/8/8/8/8/8/8 w XYZ - 0 1"),
            Err(FenError::InvalidCastlingRights(_))
        ));
        assert!(matches!(
            FenParser::parse("8/8/8/8/8/8/8/8 w KK - 0 1"),
            Err(FenError::InvalidCastlingRights(_))
        ));
    }

    #[test]
    fn invalid_en_passant() {
        for ep in ["abc", "x3", "e4", "E3", "E6"] {
            let fen = format!("8/8/8/8/8/8/8/8 w - {ep} 0 1");
            assert!(matches!(
                FenParser::parse(&fen),
                Err(FenError::InvalidEnPassantSquare(_))
            ));
        }
    }

    #[test]
    fn invalid_clocks() {
        assert!(matches!(
            FenParser::parse("8/8/8/8/8/8/8/8 w - - abc 1"),
            Err(FenError::InvalidHalfmoveClock(_))
        ));
        assert!(matches!(
            FenParser::parse("8/8/8/8/8/8/8/8 w - - 0 xyz"),
            Err(FenError::InvalidFullmoveNumber(_))
        ));
        assert!(matches!(
            FenParser::parse("8/8/8/8/8/8/8/8 w - - 0 0"),
            Err(FenError::InvalidFullmoveNumber(_))
        ));
    }

    #[test]
    fn default_is_startpos() {
        assert_eq!(FenParser::default().to_fen(), FenParser::STARTPOS);
    }

    #[test]
    fn fen_error_display() {
        assert!(FenError::InvalidPartCount(3).to_string().contains('3'));
        assert!(FenError::InvalidEnPassantSquare("z9".to_string())
            .to_string()
            .contains("z9"));
    }
}
