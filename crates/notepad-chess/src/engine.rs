//! Client for an external UCI engine process.
//!
//! The client owns the engine's stdin/stdout and walks a small state machine:
//!
//! ```text
//! NotStarted -> Starting -> Ready <-> Thinking
//!                  |          |          |
//!                  +----------+----------+--> Stopped
//! ```
//!
//! Every read from the engine happens under a deadline, so a hung or crashed
//! engine turns into an [`EngineError`] instead of blocking the caller.

use chess_core::Move;
use std::fmt;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uci::{EngineMessage, GoOptions, GuiCommand};

/// Maximum number of lines to read before giving up on a handshake reply.
pub const MAX_UCI_LINES: usize = 1000;

/// Lifecycle of an [`EngineClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No engine has been launched yet.
    NotStarted,
    /// The handshake is in progress.
    Starting,
    /// Idle and able to accept a search.
    Ready,
    /// A search is outstanding.
    Thinking,
    /// The engine is gone. Terminal until the next `start`.
    Stopped,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineState::NotStarted => "not started",
            EngineState::Starting => "starting",
            EngineState::Ready => "ready",
            EngineState::Thinking => "thinking",
            EngineState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Errors that can occur when talking to an engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine executable could not be launched.
    #[error("failed to launch engine '{path}': {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The engine exited or misbehaved before finishing the UCI handshake.
    #[error("engine handshake failed: {0}")]
    Handshake(String),
    /// The engine did not finish the UCI handshake in time.
    #[error("engine handshake timed out after {0:?}")]
    HandshakeTimeout(Duration),
    /// `start` was called while an engine is still running.
    #[error("engine already started")]
    AlreadyStarted,
    /// The engine did not answer a request in time.
    #[error("engine did not answer within {0:?}")]
    Timeout(Duration),
    /// The engine sent something that breaks the protocol, or went away.
    #[error("engine protocol error: {0}")]
    Protocol(String),
    /// A search is already outstanding.
    #[error("engine is busy with another search")]
    Busy,
    /// The engine is not in a state that accepts requests.
    #[error("engine is not ready ({0})")]
    NotReady(EngineState),
    /// Writing to the engine failed.
    #[error("engine I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Returns true for the errors `start`/`attach` report when the engine
    /// never became ready.
    pub fn is_start_failure(&self) -> bool {
        matches!(
            self,
            EngineError::Spawn { .. } | EngineError::Handshake(_) | EngineError::HandshakeTimeout(_)
        )
    }
}

/// Timeouts applied to engine exchanges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Upper bound on the whole `uci` .. `readyok` exchange.
    pub handshake_timeout: Duration,
    /// Slack on top of the search budget before a search counts as timed out,
    /// and how long to wait for a late `bestmove` after sending `stop`.
    pub grace: Duration,
    /// How long to wait for the process to exit after `quit` before killing it.
    pub shutdown_timeout: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            handshake_timeout: Duration::from_secs(5),
            grace: Duration::from_secs(2),
            shutdown_timeout: Duration::from_secs(1),
        }
    }
}

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Line-oriented pipe to the engine.
struct Transport {
    lines: Lines<BufReader<BoxedReader>>,
    writer: BoxedWriter,
}

/// Drives one UCI engine.
///
/// Requests take `&mut self`, so at most one exchange is in flight. A
/// [`best_move`](Self::best_move) future that is dropped before it completes
/// leaves the client [`Thinking`](EngineState::Thinking); later searches fail
/// with [`EngineError::Busy`] and only [`stop`](Self::stop) remains useful.
pub struct EngineClient {
    options: EngineOptions,
    state: EngineState,
    name: Option<String>,
    transport: Option<Transport>,
    child: Option<Child>,
}

impl EngineClient {
    /// Creates a client with no engine behind it.
    pub fn new(options: EngineOptions) -> Self {
        EngineClient {
            options,
            state: EngineState::NotStarted,
            name: None,
            transport: None,
            child: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Name reported by the engine (`id name`), once started.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The timeouts in use.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Launches the engine executable and performs the UCI handshake.
    ///
    /// The process is killed if the client is dropped without [`stop`](Self::stop).
    ///
    /// # Errors
    ///
    /// - [`EngineError::Spawn`] if the executable cannot be launched
    /// - [`EngineError::Handshake`] if it exits or misbehaves during the handshake
    /// - [`EngineError::HandshakeTimeout`] if the handshake takes too long
    /// - [`EngineError::AlreadyStarted`] if an engine is already running
    ///
    /// Any failure other than `AlreadyStarted` leaves the client `Stopped`.
    pub async fn start(&mut self, path: &str) -> Result<(), EngineError> {
        self.ensure_idle()?;
        info!("Starting engine: {}", path);

        let spawned = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(source) => {
                self.state = EngineState::Stopped;
                return Err(EngineError::Spawn {
                    path: path.to_string(),
                    source,
                });
            }
        };

        let pipes = child.stdin.take().zip(child.stdout.take());
        self.child = Some(child);
        let Some((stdin, stdout)) = pipes else {
            self.terminate().await;
            return Err(EngineError::Handshake(
                "engine stdin/stdout unavailable".to_string(),
            ));
        };

        self.handshake(Box::new(stdout), Box::new(stdin)).await
    }

    /// Performs the UCI handshake over an already-connected byte stream.
    ///
    /// Behaves like [`start`](Self::start) minus the process management.
    pub async fn attach<R, W>(&mut self, reader: R, writer: W) -> Result<(), EngineError>
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        self.ensure_idle()?;
        self.handshake(Box::new(reader), Box::new(writer)).await
    }

    fn ensure_idle(&self) -> Result<(), EngineError> {
        match self.state {
            EngineState::NotStarted | EngineState::Stopped => Ok(()),
            _ => Err(EngineError::AlreadyStarted),
        }
    }

    async fn handshake(
        &mut self,
        reader: BoxedReader,
        writer: BoxedWriter,
    ) -> Result<(), EngineError> {
        self.transport = Some(Transport {
            lines: BufReader::new(reader).lines(),
            writer,
        });
        self.state = EngineState::Starting;
        self.name = None;

        let limit = self.options.handshake_timeout;
        let result = match timeout(limit, self.run_handshake()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e @ EngineError::Handshake(_))) => Err(e),
            Ok(Err(e)) => Err(EngineError::Handshake(e.to_string())),
            Err(_) => Err(EngineError::HandshakeTimeout(limit)),
        };

        match result {
            Ok(()) => {
                self.state = EngineState::Ready;
                info!(
                    "Engine ready: {}",
                    self.name.as_deref().unwrap_or("unnamed engine")
                );
                Ok(())
            }
            Err(e) => {
                warn!("Engine failed to start: {}", e);
                self.terminate().await;
                Err(e)
            }
        }
    }

    async fn run_handshake(&mut self) -> Result<(), EngineError> {
        self.send(&GuiCommand::Uci).await?;
        let mut uciok = false;
        for _ in 0..MAX_UCI_LINES {
            match self.read_message().await? {
                EngineMessage::Id { name: Some(n), .. } => self.name = Some(n),
                EngineMessage::UciOk => {
                    uciok = true;
                    break;
                }
                _ => {}
            }
        }
        if !uciok {
            return Err(EngineError::Handshake(format!(
                "no uciok within {} lines",
                MAX_UCI_LINES
            )));
        }

        self.sync().await?;
        self.send(&GuiCommand::UciNewGame).await?;
        self.sync().await
    }

    /// Sends `isready` and waits for `readyok`.
    async fn sync(&mut self) -> Result<(), EngineError> {
        self.send(&GuiCommand::IsReady).await?;
        for _ in 0..MAX_UCI_LINES {
            if self.read_message().await? == EngineMessage::ReadyOk {
                return Ok(());
            }
        }
        Err(EngineError::Protocol(format!(
            "no readyok within {} lines",
            MAX_UCI_LINES
        )))
    }

    /// Asks the engine for its move in the given position.
    ///
    /// The engine is told to think for `think_secs` seconds and is given
    /// `think_secs` plus the grace period to answer. Returns `Ok(None)` if the
    /// engine reports that it has no move.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Busy`] if a search is already outstanding
    /// - [`EngineError::NotReady`] if the engine is not running
    /// - [`EngineError::Timeout`] if no `bestmove` arrives in time. The engine
    ///   is sent `stop`; if it still does not answer within the grace period
    ///   it is killed.
    /// - [`EngineError::Protocol`] for a malformed `bestmove` (the engine
    ///   stays usable) or if the engine closes its output (it is stopped)
    pub async fn best_move(
        &mut self,
        fen: &str,
        think_secs: u64,
    ) -> Result<Option<Move>, EngineError> {
        match self.state {
            EngineState::Ready => {}
            EngineState::Thinking => return Err(EngineError::Busy),
            other => return Err(EngineError::NotReady(other)),
        }
        self.state = EngineState::Thinking;

        let go = GuiCommand::Go(GoOptions::movetime(think_secs.saturating_mul(1000)));
        let position = GuiCommand::Position {
            fen: Some(fen.to_string()),
            moves: Vec::new(),
        };
        if let Err(e) = self.send_all(&[position, go]).await {
            self.terminate().await;
            return Err(e);
        }

        let deadline = Duration::from_secs(think_secs).saturating_add(self.options.grace);
        let reply = match timeout(deadline, self.read_bestmove()).await {
            Ok(reply) => reply,
            Err(_) => {
                warn!("Engine gave no move within {:?}, sending stop", deadline);
                self.recover_after_timeout().await;
                return Err(EngineError::Timeout(deadline));
            }
        };

        match reply {
            Ok(token) => {
                self.state = EngineState::Ready;
                token
                    .map(|text| {
                        Move::parse(&text).map_err(|_| {
                            warn!("Engine sent malformed bestmove: {}", text);
                            EngineError::Protocol(format!("malformed bestmove '{}'", text))
                        })
                    })
                    .transpose()
            }
            Err(e) => {
                self.terminate().await;
                Err(e)
            }
        }
    }

    /// Reads until `bestmove`, logging search progress on the way.
    ///
    /// Lines that do not parse are skipped: the search is still running and
    /// its `bestmove` must be consumed here, not by the next search. Only a
    /// lost transport ends the wait early.
    async fn read_bestmove(&mut self) -> Result<Option<String>, EngineError> {
        loop {
            let line = self.read_line().await?;
            let message = match EngineMessage::parse(&line) {
                Ok(message) => message,
                Err(e) => {
                    warn!("Ignoring unparseable engine line '{}': {}", line, e);
                    continue;
                }
            };
            match message {
                EngineMessage::BestMove { mv, .. } => return Ok(mv),
                EngineMessage::Info(info) => {
                    if let Some(score) = info.score {
                        debug!(
                            "Engine info: depth {:?} score {} pv {}",
                            info.depth,
                            score,
                            info.pv.join(" ")
                        );
                    }
                }
                _ => {}
            }
        }
    }

    /// After a search deadline: `stop`, then give the engine the grace period
    /// to produce the late `bestmove`, which is discarded.
    async fn recover_after_timeout(&mut self) {
        if self.send(&GuiCommand::Stop).await.is_err() {
            self.terminate().await;
            return;
        }

        match timeout(self.options.grace, self.read_bestmove()).await {
            Ok(Ok(late)) => {
                debug!("Discarding late bestmove {:?}", late);
                self.state = EngineState::Ready;
            }
            _ => {
                warn!("Engine unresponsive after stop, killing it");
                self.terminate().await;
            }
        }
    }

    /// Tells the engine a new game begins.
    ///
    /// # Errors
    ///
    /// [`EngineError::Busy`] or [`EngineError::NotReady`] if the engine is not
    /// idle. If the engine does not acknowledge within the handshake timeout
    /// it is stopped and [`EngineError::Timeout`] is returned.
    pub async fn new_game(&mut self) -> Result<(), EngineError> {
        match self.state {
            EngineState::Ready => {}
            EngineState::Thinking => return Err(EngineError::Busy),
            other => return Err(EngineError::NotReady(other)),
        }

        let limit = self.options.handshake_timeout;
        let result = match timeout(limit, self.announce_new_game()).await {
            Ok(result) => result,
            Err(_) => Err(EngineError::Timeout(limit)),
        };

        if let Err(e) = &result {
            warn!("Engine failed to start a new game: {}", e);
            self.terminate().await;
        }
        result
    }

    async fn announce_new_game(&mut self) -> Result<(), EngineError> {
        self.send(&GuiCommand::UciNewGame).await?;
        self.sync().await
    }

    /// Shuts the engine down: `quit`, then a kill if it lingers.
    ///
    /// Safe to call in any state and more than once.
    pub async fn stop(&mut self) {
        match self.state {
            EngineState::NotStarted | EngineState::Stopped => {
                self.state = EngineState::Stopped;
                return;
            }
            EngineState::Thinking => {
                let _ = self.send(&GuiCommand::Stop).await;
            }
            EngineState::Starting | EngineState::Ready => {}
        }
        let _ = self.send(&GuiCommand::Quit).await;
        self.transport = None;

        if let Some(mut child) = self.child.take() {
            match timeout(self.options.shutdown_timeout, child.wait()).await {
                Ok(Ok(status)) => debug!("Engine exited: {}", status),
                _ => {
                    warn!("Engine did not exit after quit, killing it");
                    let _ = child.kill().await;
                }
            }
        }

        self.state = EngineState::Stopped;
        info!("Engine stopped");
    }

    /// Drops the pipes and kills the process without ceremony.
    async fn terminate(&mut self) {
        self.transport = None;
        if let Some(mut child) = self.child.take() {
            let _ = child.kill().await;
        }
        self.state = EngineState::Stopped;
    }

    async fn send(&mut self, command: &GuiCommand) -> Result<(), EngineError> {
        let transport = self
            .transport
            .as_mut()
            .ok_or(EngineError::NotReady(self.state))?;
        let line = command.to_uci();
        debug!(">> {}", line);
        transport.writer.write_all(line.as_bytes()).await?;
        transport.writer.write_all(b"\n").await?;
        transport.writer.flush().await?;
        Ok(())
    }

    async fn send_all(&mut self, commands: &[GuiCommand]) -> Result<(), EngineError> {
        for command in commands {
            self.send(command).await?;
        }
        Ok(())
    }

    /// Reads and parses one line.
    ///
    /// End of output or a read error drops the transport, which callers use
    /// to tell a dead engine from a merely confused one.
    async fn read_message(&mut self) -> Result<EngineMessage, EngineError> {
        let line = self.read_line().await?;
        EngineMessage::parse(&line).map_err(|e| EngineError::Protocol(e.to_string()))
    }

    /// Next raw line from the engine. EOF and read errors drop the transport.
    async fn read_line(&mut self) -> Result<String, EngineError> {
        let transport = self
            .transport
            .as_mut()
            .ok_or(EngineError::NotReady(self.state))?;
        let next = transport.lines.next_line().await;
        let line = match next {
            Ok(Some(line)) => line,
            Ok(None) => {
                self.transport = None;
                return Err(EngineError::Protocol("engine closed its output".to_string()));
            }
            Err(e) => {
                self.transport = None;
                return Err(EngineError::Protocol(format!("failed to read from engine: {}", e)));
            }
        };
        debug!("<< {}", line);
        Ok(line)
    }
}

impl fmt::Debug for EngineClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineClient")
            .field("state", &self.state)
            .field("name", &self.name)
            .field("options", &self.options)
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{scripted_engine, scripted_engine_with, Handshake, OnGo};
    use super::*;

    const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";

    fn fast_options() -> EngineOptions {
        EngineOptions {
            handshake_timeout: Duration::from_millis(500),
            grace: Duration::from_millis(200),
            shutdown_timeout: Duration::from_millis(200),
        }
    }

    async fn ready_client(script: Vec<OnGo>) -> EngineClient {
        let (reader, writer) = scripted_engine(script);
        let mut client = EngineClient::new(fast_options());
        client.attach(reader, writer).await.unwrap();
        client
    }

    fn mv(text: &str) -> Move {
        Move::parse(text).unwrap()
    }

    #[tokio::test]
    async fn handshake_reaches_ready() {
        let client = ready_client(vec![]).await;
        assert_eq!(client.state(), EngineState::Ready);
        assert_eq!(client.name(), Some("Scripted"));
    }

    #[tokio::test]
    async fn handshake_timeout_stops_client() {
        let (reader, writer) = scripted_engine_with(Handshake::NeverUciOk, vec![]);
        let mut client = EngineClient::new(fast_options());
        let err = client.attach(reader, writer).await.unwrap_err();
        assert!(matches!(err, EngineError::HandshakeTimeout(_)));
        assert!(err.is_start_failure());
        assert_eq!(client.state(), EngineState::Stopped);
    }

    #[tokio::test]
    async fn handshake_hangup_is_a_start_failure() {
        let (reader, writer) = scripted_engine_with(Handshake::Hangup, vec![]);
        let mut client = EngineClient::new(fast_options());
        let err = client.attach(reader, writer).await.unwrap_err();
        assert!(matches!(err, EngineError::Handshake(_)), "{err:?}");
        assert_eq!(client.state(), EngineState::Stopped);
    }

    #[tokio::test]
    async fn attach_twice_is_rejected() {
        let mut client = ready_client(vec![]).await;
        let (reader, writer) = scripted_engine(vec![]);
        assert!(matches!(
            client.attach(reader, writer).await,
            Err(EngineError::AlreadyStarted)
        ));
        assert_eq!(client.state(), EngineState::Ready);
    }

    #[tokio::test]
    async fn best_move_returns_engine_reply() {
        let mut client = ready_client(vec![OnGo::Play("e7e5"), OnGo::Play("g8f6")]).await;
        assert_eq!(client.best_move(AFTER_E4, 0).await.unwrap(), Some(mv("e7e5")));
        assert_eq!(client.state(), EngineState::Ready);
        assert_eq!(client.best_move(AFTER_E4, 0).await.unwrap(), Some(mv("g8f6")));
    }

    #[tokio::test]
    async fn best_move_none() {
        let mut client = ready_client(vec![OnGo::NoMove]).await;
        assert_eq!(client.best_move(AFTER_E4, 0).await.unwrap(), None);
        assert_eq!(client.state(), EngineState::Ready);
    }

    #[tokio::test]
    async fn malformed_bestmove_keeps_engine_usable() {
        let mut client = ready_client(vec![OnGo::Play("e9e5"), OnGo::Play("e7e5")]).await;
        assert!(matches!(
            client.best_move(AFTER_E4, 0).await,
            Err(EngineError::Protocol(_))
        ));
        assert_eq!(client.state(), EngineState::Ready);
        assert_eq!(client.best_move(AFTER_E4, 0).await.unwrap(), Some(mv("e7e5")));
    }

    #[tokio::test]
    async fn unparseable_lines_during_search_are_skipped() {
        let mut client = ready_client(vec![
            OnGo::Garbled {
                noise: "id",
                mv: "e7e5",
            },
            OnGo::Garbled {
                noise: "bestmove",
                mv: "c7c5",
            },
            OnGo::Play("d7d5"),
        ])
        .await;
        // Each search must get its own reply, never one left over from before.
        assert_eq!(client.best_move(AFTER_E4, 0).await.unwrap(), Some(mv("e7e5")));
        assert_eq!(client.best_move(AFTER_E4, 0).await.unwrap(), Some(mv("c7c5")));
        assert_eq!(client.best_move(AFTER_E4, 0).await.unwrap(), Some(mv("d7d5")));
        assert_eq!(client.state(), EngineState::Ready);
    }

    #[tokio::test]
    async fn huge_think_time_does_not_overflow_deadline() {
        let mut client = ready_client(vec![OnGo::Play("e7e5")]).await;
        assert_eq!(
            client.best_move(AFTER_E4, u64::MAX).await.unwrap(),
            Some(mv("e7e5"))
        );
    }

    #[tokio::test]
    async fn late_bestmove_after_stop_is_discarded() {
        let mut client = ready_client(vec![OnGo::PlayOnStop("d7d5"), OnGo::Play("e7e5")]).await;
        assert!(matches!(
            client.best_move(AFTER_E4, 0).await,
            Err(EngineError::Timeout(_))
        ));
        assert_eq!(client.state(), EngineState::Ready);
        // The stale d7d5 must not leak into the next answer.
        assert_eq!(client.best_move(AFTER_E4, 0).await.unwrap(), Some(mv("e7e5")));
    }

    #[tokio::test]
    async fn unresponsive_engine_is_stopped() {
        let mut client = ready_client(vec![OnGo::Hang]).await;
        assert!(matches!(
            client.best_move(AFTER_E4, 0).await,
            Err(EngineError::Timeout(_))
        ));
        assert_eq!(client.state(), EngineState::Stopped);
        assert!(matches!(
            client.best_move(AFTER_E4, 0).await,
            Err(EngineError::NotReady(EngineState::Stopped))
        ));
    }

    #[tokio::test]
    async fn engine_hangup_mid_search() {
        let mut client = ready_client(vec![OnGo::Hangup]).await;
        assert!(matches!(
            client.best_move(AFTER_E4, 0).await,
            Err(EngineError::Protocol(_))
        ));
        assert_eq!(client.state(), EngineState::Stopped);
    }

    #[tokio::test]
    async fn abandoned_search_leaves_client_busy() {
        let mut client = ready_client(vec![OnGo::Hang]).await;
        {
            let search = client.best_move(AFTER_E4, 5);
            // Give up on the search long before its deadline.
            assert!(timeout(Duration::from_millis(50), search).await.is_err());
        }
        assert_eq!(client.state(), EngineState::Thinking);
        assert!(matches!(
            client.best_move(AFTER_E4, 0).await,
            Err(EngineError::Busy)
        ));
        client.stop().await;
        assert_eq!(client.state(), EngineState::Stopped);
    }

    #[tokio::test]
    async fn requests_before_start_are_rejected() {
        let mut client = EngineClient::new(EngineOptions::default());
        assert_eq!(client.state(), EngineState::NotStarted);
        assert!(matches!(
            client.best_move(AFTER_E4, 1).await,
            Err(EngineError::NotReady(EngineState::NotStarted))
        ));
        assert!(matches!(
            client.new_game().await,
            Err(EngineError::NotReady(EngineState::NotStarted))
        ));
    }

    #[tokio::test]
    async fn new_game_round_trip() {
        let mut client = ready_client(vec![]).await;
        client.new_game().await.unwrap();
        assert_eq!(client.state(), EngineState::Ready);
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let mut client = ready_client(vec![]).await;
        client.stop().await;
        assert_eq!(client.state(), EngineState::Stopped);
        client.stop().await;
        assert_eq!(client.state(), EngineState::Stopped);

        let mut never_started = EngineClient::new(EngineOptions::default());
        never_started.stop().await;
        assert_eq!(never_started.state(), EngineState::Stopped);
    }

    #[tokio::test]
    async fn spawn_failure() {
        let mut client = EngineClient::new(fast_options());
        let err = client
            .start("/nonexistent/notepad-chess-engine")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Spawn { .. }));
        assert!(err.is_start_failure());
        assert!(err.to_string().contains("/nonexistent/notepad-chess-engine"));
        assert_eq!(client.state(), EngineState::Stopped);
    }

    #[test]
    fn error_classification() {
        assert!(!EngineError::Busy.is_start_failure());
        assert!(!EngineError::Timeout(Duration::from_secs(3)).is_start_failure());
        assert!(EngineError::Handshake("eof".to_string()).is_start_failure());
        assert_eq!(
            EngineError::NotReady(EngineState::Stopped).to_string(),
            "engine is not ready (stopped)"
        );
    }

    #[cfg(unix)]
    mod process {
        use super::*;
        use std::os::unix::fs::PermissionsExt;
        use std::path::{Path, PathBuf};

        fn write_engine(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("engine.sh");
            std::fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        const SHELL_ENGINE: &str = r#"while read -r line; do
  case "$line" in
    uci) echo "id name ShellFish"; echo "uciok" ;;
    isready) echo "readyok" ;;
    go*) echo "info depth 1 score cp 20 pv e7e5"; echo "bestmove e7e5" ;;
    quit) exit 0 ;;
  esac
done
"#;

        #[tokio::test]
        async fn start_search_and_stop_a_process() {
            let dir = tempfile::tempdir().unwrap();
            let path = write_engine(dir.path(), SHELL_ENGINE);

            let mut client = EngineClient::new(fast_options());
            client.start(path.to_str().unwrap()).await.unwrap();
            assert_eq!(client.name(), Some("ShellFish"));
            assert_eq!(client.best_move(AFTER_E4, 0).await.unwrap(), Some(mv("e7e5")));

            client.stop().await;
            assert_eq!(client.state(), EngineState::Stopped);
        }

        #[tokio::test]
        async fn process_exiting_during_handshake() {
            let dir = tempfile::tempdir().unwrap();
            let path = write_engine(dir.path(), "exit 0\n");

            let mut client = EngineClient::new(fast_options());
            let err = client.start(path.to_str().unwrap()).await.unwrap_err();
            assert!(matches!(err, EngineError::Handshake(_)), "{err:?}");
            assert_eq!(client.state(), EngineState::Stopped);
        }
    }
}
