//! Messages sent from engine to GUI.

use crate::{EngineInfo, UciError};

/// Tokens an engine sends instead of a move when it has nothing to play.
const NULL_MOVES: [&str; 2] = ["(none)", "0000"];

/// A single line of engine output.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineMessage {
    /// Engine identification (one of the two per line).
    Id {
        name: Option<String>,
        author: Option<String>,
    },
    /// UCI initialization complete.
    UciOk,
    /// Engine is ready.
    ReadyOk,
    /// Search information.
    Info(EngineInfo),
    /// Search finished. `mv` is `None` when the engine reported no move.
    BestMove {
        mv: Option<String>,
        ponder: Option<String>,
    },
    /// An `option` declaration; we never set options, so only the raw line is kept.
    Option(String),
    /// Anything else. Engines may print banners or debug text.
    Unknown(String),
}

impl EngineMessage {
    /// Parse one line of engine output.
    ///
    /// Unrecognized lines become [`EngineMessage::Unknown`]; only a line that
    /// starts with a known keyword but is missing its argument is an error.
    pub fn parse(input: &str) -> Result<Self, UciError> {
        let input = input.trim();
        let mut parts = input.split_whitespace();

        match parts.next().unwrap_or("") {
            "id" => Self::parse_id(input, parts),
            "uciok" => Ok(EngineMessage::UciOk),
            "readyok" => Ok(EngineMessage::ReadyOk),
            "info" => EngineInfo::parse(input)
                .map(EngineMessage::Info)
                .ok_or_else(|| UciError::ParseError(input.to_string())),
            "bestmove" => Self::parse_bestmove(parts),
            "option" => Ok(EngineMessage::Option(input.to_string())),
            _ => Ok(EngineMessage::Unknown(input.to_string())),
        }
    }

    fn parse_id<'a>(
        input: &str,
        mut parts: impl Iterator<Item = &'a str>,
    ) -> Result<Self, UciError> {
        let field = parts.next();
        let value: Vec<&str> = parts.collect();
        if value.is_empty() {
            return Err(UciError::ParseError(format!("Missing id value: '{}'", input)));
        }
        let value = Some(value.join(" "));

        match field {
            Some("name") => Ok(EngineMessage::Id {
                name: value,
                author: None,
            }),
            Some("author") => Ok(EngineMessage::Id {
                name: None,
                author: value,
            }),
            _ => Err(UciError::ParseError(format!(
                "Expected 'id name' or 'id author', got '{}'",
                input
            ))),
        }
    }

    fn parse_bestmove<'a>(mut parts: impl Iterator<Item = &'a str>) -> Result<Self, UciError> {
        let mv = match parts.next() {
            Some(token) if NULL_MOVES.contains(&token) => None,
            Some(token) => Some(token.to_string()),
            None => {
                return Err(UciError::ParseError(
                    "Expected a move after 'bestmove'".to_string(),
                ))
            }
        };

        let ponder = match (parts.next(), parts.next()) {
            (Some("ponder"), Some(p)) => Some(p.to_string()),
            _ => None,
        };

        Ok(EngineMessage::BestMove { mv, ponder })
    }

    /// Format message for output.
    pub fn to_uci(&self) -> String {
        match self {
            EngineMessage::Id { name, author } => {
                let mut parts = Vec::new();
                if let Some(n) = name {
                    parts.push(format!("id name {}", n));
                }
                if let Some(a) = author {
                    parts.push(format!("id author {}", a));
                }
                parts.join("\n")
            }
            EngineMessage::UciOk => "uciok".to_string(),
            EngineMessage::ReadyOk => "readyok".to_string(),
            EngineMessage::Info(info) => info.to_uci(),
            EngineMessage::BestMove { mv, ponder } => {
                let mv = mv.as_deref().unwrap_or(NULL_MOVES[0]);
                match ponder {
                    Some(p) => format!("bestmove {} ponder {}", mv, p),
                    None => format!("bestmove {}", mv),
                }
            }
            EngineMessage::Option(line) | EngineMessage::Unknown(line) => line.clone(),
        }
    }
}
