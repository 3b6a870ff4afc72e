//! Notepad chess: play against a UCI engine by typing square-pair moves.
//!
//! This crate provides:
//! - [`EngineClient`] - drives an external UCI engine process with timeouts
//! - [`Session`] - one game: validates typed moves, fetches engine replies
//! - [`Config`] - settings loaded from `notepad-chess.toml`
//!
//! # Example
//!
//! ```no_run
//! use notepad_chess::{Config, EngineClient, Session, TurnOutcome};
//!
//! # async fn run() -> Result<(), notepad_chess::EngineError> {
//! let config = Config::default();
//! let mut engine = EngineClient::new(config.engine_options());
//! engine.start(&config.engine_path).await?;
//!
//! let mut session = Session::with_engine(engine, config.think_time_secs);
//! if let TurnOutcome::EngineMoved { reply, .. } = session.submit_move_text("e2e4").await {
//!     println!("engine played {reply}");
//! }
//! session.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
mod diagram;
pub mod engine;
pub mod session;

pub use config::{Config, ConfigError};
pub use diagram::board_diagram;
pub use engine::{EngineClient, EngineError, EngineOptions, EngineState};
pub use session::{Session, TurnOutcome};
