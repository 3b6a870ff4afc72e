//! Configuration file loading.
//!
//! Settings live in `notepad-chess.toml`. Every key is optional; a missing
//! file means all defaults.

use crate::engine::EngineOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// A value parsed but makes no sense.
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Settings for a notepad chess session.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Config {
    /// Engine executable. Defaults to "stockfish" (assumes it's in PATH).
    #[serde(default = "default_engine_path")]
    pub engine_path: String,
    /// Seconds the engine may think per move. Defaults to 1.
    #[serde(default = "default_think_time_secs")]
    pub think_time_secs: u64,
    /// Extra milliseconds allowed on top of the think time. Defaults to 2000.
    #[serde(default = "default_grace_ms")]
    pub grace_ms: u64,
    /// Milliseconds allowed for the UCI handshake. Defaults to 5000.
    #[serde(default = "default_handshake_timeout_ms")]
    pub handshake_timeout_ms: u64,
    /// Milliseconds to wait for the engine to exit after `quit`. Defaults to 1000.
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
}

/// Longest think time accepted per move: one day.
pub const MAX_THINK_TIME_SECS: u64 = 24 * 60 * 60;

fn default_engine_path() -> String {
    "stockfish".to_string()
}

fn default_think_time_secs() -> u64 {
    1
}

fn default_grace_ms() -> u64 {
    2000
}

fn default_handshake_timeout_ms() -> u64 {
    5000
}

fn default_shutdown_timeout_ms() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Config {
            engine_path: default_engine_path(),
            think_time_secs: default_think_time_secs(),
            grace_ms: default_grace_ms(),
            handshake_timeout_ms: default_handshake_timeout_ms(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
        }
    }
}

impl Config {
    /// Loads the configuration from `path`.
    ///
    /// Returns the defaults if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// [`ConfigError::ParseError`] if the file contains invalid TOML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::parse(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that deserialize fine but cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine_path.trim().is_empty() {
            return Err(ConfigError::Invalid("engine_path is empty".to_string()));
        }
        if self.think_time_secs == 0 {
            return Err(ConfigError::Invalid(
                "think_time_secs must be at least 1".to_string(),
            ));
        }
        if self.think_time_secs > MAX_THINK_TIME_SECS {
            return Err(ConfigError::Invalid(format!(
                "think_time_secs must be at most {}",
                MAX_THINK_TIME_SECS
            )));
        }
        Ok(())
    }

    /// Returns the default configuration file path.
    ///
    /// Currently returns `notepad-chess.toml` in the current working directory.
    pub fn default_path() -> PathBuf {
        PathBuf::from("notepad-chess.toml")
    }

    /// Engine timeouts derived from these settings.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            handshake_timeout: Duration::from_millis(self.handshake_timeout_ms),
            grace: Duration::from_millis(self.grace_ms),
            shutdown_timeout: Duration::from_millis(self.shutdown_timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.engine_path, "stockfish");
        assert_eq!(config.think_time_secs, 1);
        assert_eq!(config.engine_options(), EngineOptions::default());
    }

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::parse(
            r#"
engine_path = "/usr/games/stockfish"
think_time_secs = 3
"#,
        )
        .unwrap();
        assert_eq!(config.engine_path, "/usr/games/stockfish");
        assert_eq!(config.think_time_secs, 3);
        assert_eq!(config.grace_ms, 2000);
        assert_eq!(config.engine_options().grace, Duration::from_secs(2));
    }

    #[test]
    fn invalid_toml() {
        assert!(matches!(
            Config::parse("think_time_secs = \"soon\""),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn invalid_values() {
        assert!(matches!(
            Config::parse("think_time_secs = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::parse("engine_path = \"  \""),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn think_time_upper_bound() {
        let at_limit = format!("think_time_secs = {}", MAX_THINK_TIME_SECS);
        assert_eq!(
            Config::parse(&at_limit).unwrap().think_time_secs,
            MAX_THINK_TIME_SECS
        );

        let config = Config {
            think_time_secs: u64::MAX,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notepad-chess.toml");
        std::fs::write(&path, "engine_path = \"./my-engine\"\ngrace_ms = 500\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.engine_path, "./my-engine");
        assert_eq!(config.engine_options().grace, Duration::from_millis(500));
    }

    #[test]
    fn roundtrip_through_toml() {
        let config = Config {
            think_time_secs: 5,
            ..Config::default()
        };
        let text = toml::to_string(&config).unwrap();
        assert_eq!(Config::parse(&text).unwrap(), config);
    }
}
