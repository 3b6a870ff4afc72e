//! Core types for chess.
//!
//! This crate provides the fundamental types used across the workspace:
//! - [`Piece`] and [`Color`] for piece representation
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`Move`] and its square-pair text encoding (`e2e4`, `e7e8q`)
//! - FEN field validation

mod color;
mod fen;
mod mov;
mod piece;
mod square;

pub use color::Color;
pub use fen::{FenError, FenParser, Placement};
pub use mov::{Move, ParseError};
pub use piece::Piece;
pub use square::{File, Rank, Square};
