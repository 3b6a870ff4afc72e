//! One game between a human typing moves and an engine answering them.

use crate::engine::{EngineClient, EngineError, EngineOptions, EngineState};
use chess_core::{Move, ParseError, Placement};
use chess_engine::{GameStatus, Position};
use std::fmt;
use tracing::{debug, info, warn};

/// What became of one submitted line of move text.
#[derive(Debug)]
pub enum TurnOutcome {
    /// The human move and the engine's reply were both played.
    EngineMoved { reply: Move, status: GameStatus },
    /// The game is over: either it already was, or the human move ended it.
    GameOver(GameStatus),
    /// The text is not a square-pair move.
    InvalidInput(ParseError),
    /// Well-formed, but not legal here. Nothing was played.
    IllegalMove(Move),
    /// The human move was played but no reply came back.
    EngineFailure { human_move: Move, error: EngineError },
}

impl fmt::Display for TurnOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnOutcome::EngineMoved { reply, status } if status.is_terminal() => {
                write!(f, "{}\nGame Over! ({})", reply, status)
            }
            TurnOutcome::EngineMoved { reply, .. } => write!(f, "{}", reply),
            TurnOutcome::GameOver(status) => write!(f, "Game Over! ({})", status),
            TurnOutcome::InvalidInput(e) => write!(f, "Invalid input! {}", e),
            TurnOutcome::IllegalMove(m) => write!(f, "Illegal move: {}", m),
            TurnOutcome::EngineFailure { human_move, error } => {
                write!(f, "Played {}, but the engine did not reply: {}", human_move, error)
            }
        }
    }
}

/// Owns the position and the engine for a single game at a time.
///
/// Every operation takes `&mut self`, so turns are processed strictly one
/// after another.
#[derive(Debug)]
pub struct Session {
    position: Position,
    engine: EngineClient,
    think_secs: u64,
}

impl Session {
    /// A session playing against `engine`, which should already be started.
    pub fn with_engine(engine: EngineClient, think_secs: u64) -> Self {
        Session {
            position: Position::startpos(),
            engine,
            think_secs,
        }
    }

    /// A session without an engine: moves are checked and played, but every
    /// turn ends in [`TurnOutcome::EngineFailure`].
    pub fn offline() -> Self {
        Self::with_engine(EngineClient::new(EngineOptions::default()), 0)
    }

    /// Plays one line of move text for the side to move and, if the game goes
    /// on, fetches and plays the engine's reply.
    pub async fn submit_move_text(&mut self, text: &str) -> TurnOutcome {
        let status = self.position.status();
        if status.is_terminal() {
            return TurnOutcome::GameOver(status);
        }

        let human_move = match Move::parse(text.trim()) {
            Ok(m) => m,
            Err(e) => return TurnOutcome::InvalidInput(e),
        };
        if let Err(e) = self.position.apply_move(human_move) {
            debug!("Rejected {}: {}", text.trim(), e);
            return TurnOutcome::IllegalMove(human_move);
        }

        let status = self.position.status();
        if status.is_terminal() {
            info!("Game over after {}: {}", human_move, status);
            return TurnOutcome::GameOver(status);
        }

        let fen = self.position.to_fen();
        let reply = match self.engine.best_move(&fen, self.think_secs).await {
            Ok(Some(reply)) => reply,
            Ok(None) => {
                return engine_failure(
                    human_move,
                    EngineError::Protocol("engine reported no move".to_string()),
                )
            }
            Err(error) => return engine_failure(human_move, error),
        };

        if self.position.apply_move(reply).is_err() {
            return engine_failure(
                human_move,
                EngineError::Protocol(format!("engine played illegal move {} in {}", reply, fen)),
            );
        }

        let status = self.position.status();
        if status.is_terminal() {
            info!("Game over after engine reply {}: {}", reply, status);
        }
        TurnOutcome::EngineMoved { reply, status }
    }

    /// Starts over from the initial position.
    ///
    /// A ready engine is told about the new game; if that fails the board is
    /// still reset and the engine error is returned.
    pub async fn new_game(&mut self) -> Result<(), EngineError> {
        self.position.reset();
        info!("New game");
        if self.engine.state() == EngineState::Ready {
            if let Err(e) = self.engine.new_game().await {
                warn!("Engine did not accept the new game: {}", e);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Stops the engine. Safe to call more than once.
    pub async fn shutdown(&mut self) {
        self.engine.stop().await;
    }

    /// Status of the current position.
    pub fn current_status(&self) -> GameStatus {
        self.position.status()
    }

    /// Board contents for display, indexed by square.
    pub fn render_snapshot(&self) -> Placement {
        self.position.board()
    }

    /// Read-only view of the position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// The engine behind this session.
    pub fn engine(&self) -> &EngineClient {
        &self.engine
    }
}

fn engine_failure(human_move: Move, error: EngineError) -> TurnOutcome {
    warn!("No engine reply after {}: {}", human_move, error);
    TurnOutcome::EngineFailure { human_move, error }
}
