//! UCI info lines.

use std::fmt;

/// Score in centipawns or mate distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    /// Centipawn score (100 = 1 pawn advantage).
    Cp(i32),
    /// Mate in N moves (positive = engine winning, negative = engine losing).
    Mate(i32),
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Cp(cp) => write!(f, "cp {}", cp),
            Score::Mate(m) => write!(f, "mate {}", m),
        }
    }
}

/// Search progress reported by the engine while thinking.
///
/// Only the fields worth logging are kept; the rest of the line is skipped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineInfo {
    /// Search depth in plies.
    pub depth: Option<u32>,
    /// Score evaluation.
    pub score: Option<Score>,
    /// Nodes searched.
    pub nodes: Option<u64>,
    /// Time spent in milliseconds.
    pub time: Option<u64>,
    /// Principal variation (best line found).
    pub pv: Vec<String>,
    /// Arbitrary string info.
    pub string: Option<String>,
}

impl EngineInfo {
    /// Format as UCI info string.
    pub fn to_uci(&self) -> String {
        let mut parts = vec!["info".to_string()];

        if let Some(d) = self.depth {
            parts.push(format!("depth {}", d));
        }
        if let Some(s) = self.score {
            parts.push(format!("score {}", s));
        }
        if let Some(n) = self.nodes {
            parts.push(format!("nodes {}", n));
        }
        if let Some(t) = self.time {
            parts.push(format!("time {}", t));
        }
        if !self.pv.is_empty() {
            parts.push(format!("pv {}", self.pv.join(" ")));
        }
        if let Some(ref s) = self.string {
            parts.push(format!("string {}", s));
        }

        parts.join(" ")
    }

    /// Parse UCI info line. Returns `None` if the line is not an info line.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().peekable();
        if parts.next() != Some("info") {
            return None;
        }

        let mut info = EngineInfo::default();
        while let Some(keyword) = parts.next() {
            match keyword {
                "depth" => info.depth = parts.next().and_then(|v| v.parse().ok()),
                "nodes" => info.nodes = parts.next().and_then(|v| v.parse().ok()),
                "time" => info.time = parts.next().and_then(|v| v.parse().ok()),
                "score" => {
                    let kind = parts.next();
                    let value = parts.next().and_then(|v| v.parse().ok());
                    info.score = match (kind, value) {
                        (Some("cp"), Some(cp)) => Some(Score::Cp(cp)),
                        (Some("mate"), Some(m)) => Some(Score::Mate(m)),
                        _ => None,
                    };
                }
                "pv" => {
                    // Moves run until the next keyword or end of line
                    while let Some(mv) = parts.next_if(|p| !is_info_keyword(p)) {
                        info.pv.push(mv.to_string());
                    }
                }
                "string" => {
                    // String consumes rest of line
                    info.string = Some(parts.by_ref().collect::<Vec<_>>().join(" "));
                }
                _ => {}
            }
        }

        Some(info)
    }
}

fn is_info_keyword(s: &str) -> bool {
    matches!(
        s,
        "depth"
            | "seldepth"
            | "score"
            | "nodes"
            | "nps"
            | "time"
            | "pv"
            | "multipv"
            | "currmove"
            | "currmovenumber"
            | "hashfull"
            | "tbhits"
            | "string"
    )
}
