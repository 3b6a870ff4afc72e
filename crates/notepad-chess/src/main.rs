//! Notepad Chess - type moves like `e2e4`, get the engine's reply on the next line.
//!
//! Besides move text the shell understands `new`, `board`, `status` and
//! `quit`/`exit`. Logs go to stderr so stdout stays a clean move transcript.

use anyhow::Context;
use clap::Parser;
use notepad_chess::{board_diagram, Config, EngineClient, Session};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Notepad Chess - play against a UCI engine in plain text.
#[derive(Parser)]
#[command(name = "notepad-chess")]
#[command(about = "Play chess against a UCI engine by typing moves like e2e4")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, default_value_os_t = Config::default_path())]
    config: PathBuf,

    /// Engine executable (overrides the config file)
    #[arg(long)]
    engine: Option<String>,

    /// Seconds the engine may think per move (overrides the config file)
    #[arg(long)]
    think_time: Option<u64>,

    /// Play without an engine: moves are checked and applied only
    #[arg(long)]
    offline: bool,

    /// Print the board after every turn
    #[arg(long)]
    board: bool,

    /// Log filter, e.g. "debug" or "notepad_chess=trace" (default: $RUST_LOG, then "warn")
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = match &args.log_level {
        Some(level) => EnvFilter::try_new(level).context("invalid --log-level")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(engine) = args.engine {
        config.engine_path = engine;
    }
    if let Some(secs) = args.think_time {
        config.think_time_secs = secs;
    }
    config.validate()?;
    tracing::debug!("Config: {:?}", config);

    let mut session = if args.offline {
        println!("Offline: moves are checked but nobody answers.");
        Session::offline()
    } else {
        let mut engine = EngineClient::new(config.engine_options());
        match engine.start(&config.engine_path).await {
            Ok(()) => println!(
                "Playing against {}. You have White.",
                engine.name().unwrap_or(&config.engine_path)
            ),
            Err(e) => println!("Could not start the engine ({e}); continuing offline."),
        }
        Session::with_engine(engine, config.think_time_secs)
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => continue,
            "quit" | "exit" => break,
            "new" => {
                if let Err(e) = session.new_game().await {
                    println!("New game, but the engine did not acknowledge it: {e}");
                } else {
                    println!("New game.");
                }
            }
            "board" => println!("{}", board_diagram(&session.render_snapshot())),
            "status" => println!("{}", session.current_status()),
            text => {
                let outcome = session.submit_move_text(text).await;
                println!("{outcome}");
                if args.board {
                    println!("{}", board_diagram(&session.render_snapshot()));
                }
            }
        }
    }

    session.shutdown().await;
    Ok(())
}
