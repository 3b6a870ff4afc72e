//! UCI (Universal Chess Interface) protocol messages.
//!
//! The GUI side of the protocol: [`GuiCommand`] is what we write to an engine,
//! [`EngineMessage`] is what we read back. Both directions can be parsed and
//! formatted, so the same types drive a real engine and a scripted stand-in.
//!
//! # Commands used by a GUI
//!
//! - `uci` / `uciok` - Enter UCI mode, learn the engine's id
//! - `isready` / `readyok` - Synchronization
//! - `ucinewgame` - Forget state from the previous game
//! - `position fen <fen> [moves <move>...]` - Set position
//! - `go [movetime <ms>] [depth <d>]` - Start search, answered by `bestmove`
//! - `stop` - Stop search
//! - `quit` - Exit engine

mod command;
mod info;
mod message;

pub use command::{GoOptions, GuiCommand};
pub use info::{EngineInfo, Score};
pub use message::EngineMessage;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UciError {
    #[error("Parse error: {0}")]
    ParseError(String),
}
