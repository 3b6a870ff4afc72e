//! Commands sent from GUI to engine.

use crate::UciError;

/// Commands sent from GUI to engine.
#[derive(Debug, Clone, PartialEq)]
pub enum GuiCommand {
    /// Initialize UCI mode.
    Uci,
    /// Check if engine is ready.
    IsReady,
    /// The next position belongs to a different game.
    UciNewGame,
    /// Set up position. `fen` is `None` for `startpos`.
    Position {
        fen: Option<String>,
        moves: Vec<String>,
    },
    /// Start calculating.
    Go(GoOptions),
    /// Stop calculating.
    Stop,
    /// Quit the engine.
    Quit,
    /// Unknown command (for forward compatibility).
    Unknown(String),
}

/// Options for the `go` command.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GoOptions {
    /// Search for exactly this time in milliseconds.
    pub movetime: Option<u64>,
    /// Search to this depth.
    pub depth: Option<u32>,
    /// Search indefinitely until `stop`.
    pub infinite: bool,
}

impl GoOptions {
    /// Search for a fixed time.
    pub fn movetime(ms: u64) -> Self {
        GoOptions {
            movetime: Some(ms),
            ..Self::default()
        }
    }
}

impl GuiCommand {
    /// Parse a UCI command string.
    pub fn parse(input: &str) -> Result<Self, UciError> {
        let input = input.trim();
        let mut parts = input.split_whitespace();

        match parts.next().unwrap_or("") {
            "uci" => Ok(GuiCommand::Uci),
            "isready" => Ok(GuiCommand::IsReady),
            "ucinewgame" => Ok(GuiCommand::UciNewGame),
            "stop" => Ok(GuiCommand::Stop),
            "quit" => Ok(GuiCommand::Quit),
            "position" => Self::parse_position(parts),
            "go" => Self::parse_go(parts),
            _ => Ok(GuiCommand::Unknown(input.to_string())),
        }
    }

    fn parse_position<'a>(mut parts: impl Iterator<Item = &'a str>) -> Result<Self, UciError> {
        let fen = match parts.next() {
            Some("startpos") => None,
            Some("fen") => {
                // FEN fields run until "moves" or end of line
                let fen_parts: Vec<&str> = parts.by_ref().take_while(|&p| p != "moves").collect();
                if fen_parts.is_empty() {
                    return Err(UciError::ParseError("Missing FEN after 'fen'".to_string()));
                }
                Some(fen_parts.join(" "))
            }
            Some(other) => {
                return Err(UciError::ParseError(format!(
                    "Expected 'startpos' or 'fen', got '{}'",
                    other
                )));
            }
            None => {
                return Err(UciError::ParseError(
                    "Expected 'startpos' or 'fen'".to_string(),
                ));
            }
        };

        // After startpos the "moves" keyword is still ahead of us; after a
        // FEN it was consumed by take_while.
        let moves = parts
            .skip_while(|&p| p == "moves")
            .map(str::to_string)
            .collect();

        Ok(GuiCommand::Position { fen, moves })
    }

    fn parse_go<'a>(mut parts: impl Iterator<Item = &'a str>) -> Result<Self, UciError> {
        let mut opts = GoOptions::default();

        while let Some(keyword) = parts.next() {
            match keyword {
                "movetime" => opts.movetime = Self::number(keyword, parts.next())?,
                "depth" => opts.depth = Self::number(keyword, parts.next())?,
                "infinite" => opts.infinite = true,
                // Clock-based limits are not driven by this GUI; skip their value.
                "wtime" | "btime" | "winc" | "binc" | "movestogo" => {
                    parts.next();
                }
                _ => {}
            }
        }

        Ok(GuiCommand::Go(opts))
    }

    fn number<T: std::str::FromStr>(
        keyword: &str,
        value: Option<&str>,
    ) -> Result<Option<T>, UciError> {
        match value.map(str::parse) {
            Some(Ok(n)) => Ok(Some(n)),
            _ => Err(UciError::ParseError(format!(
                "Expected a number after '{}'",
                keyword
            ))),
        }
    }

    /// Format command for output.
    pub fn to_uci(&self) -> String {
        match self {
            GuiCommand::Uci => "uci".to_string(),
            GuiCommand::IsReady => "isready".to_string(),
            GuiCommand::UciNewGame => "ucinewgame".to_string(),
            GuiCommand::Position { fen, moves } => {
                let mut line = match fen {
                    Some(fen) => format!("position fen {}", fen),
                    None => "position startpos".to_string(),
                };
                if !moves.is_empty() {
                    line.push_str(" moves ");
                    line.push_str(&moves.join(" "));
                }
                line
            }
            GuiCommand::Go(opts) => {
                let mut parts = vec!["go".to_string()];
                if let Some(ms) = opts.movetime {
                    parts.push(format!("movetime {}", ms));
                }
                if let Some(d) = opts.depth {
                    parts.push(format!("depth {}", d));
                }
                if opts.infinite {
                    parts.push("infinite".to_string());
                }
                parts.join(" ")
            }
            GuiCommand::Stop => "stop".to_string(),
            GuiCommand::Quit => "quit".to_string(),
            GuiCommand::Unknown(line) => line.clone(),
        }
    }
}
