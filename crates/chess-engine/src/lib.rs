//! Chess rules on a mailbox board.
//!
//! This crate provides:
//! - [`Position`] - full game state: placement, side to move, castling rights,
//!   en passant target and move counters
//! - Legal move generation and validation ([`movegen`])
//! - [`GameStatus`] - checkmate, stalemate and draw detection
//!
//! # Example
//!
//! ```
//! use chess_core::Move;
//! use chess_engine::{GameStatus, Position};
//!
//! let mut position = Position::startpos();
//! assert_eq!(position.legal_moves().len(), 20);
//!
//! position.apply_move(Move::parse("e2e4").unwrap()).unwrap();
//! assert_eq!(position.status(), GameStatus::InProgress);
//! ```

pub mod movegen;
mod position;
mod status;

pub use movegen::perft::{perft, perft_divide};
pub use movegen::{generate_moves, is_king_attacked, is_square_attacked, MoveList};
pub use position::{CastlingRights, IllegalMoveError, Position};
pub use status::{game_status, is_insufficient_material, DrawReason, GameStatus};
