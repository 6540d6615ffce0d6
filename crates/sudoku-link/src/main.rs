//! sudoku-link command-line client.
//!
//! # Usage
//!
//! ```text
//! sudoku-link [OPTIONS] <COMMAND>
//!
//! Commands:
//!   generate     Ask the solver for a new puzzle
//!   solve        Ask the solver to solve a board
//!   check        Ask the solver whether a board is correctly solved
//!   init-config  Write the effective configuration to the config file
//!
//! Options:
//!   --config <PATH>      Config file [default: platform config dir]
//!   --tcp <ADDR>         Talk to a solver listening on ADDR
//!   --peer-cmd <CMD>     Start CMD and talk to it over stdin/stdout
//!   --timeout-ms <MS>    Timeout for each protocol read
//! ```
//!
//! Boards are given as 81 characters, row-major, `.` or `0` for empty cells.
//! Whitespace is ignored, and `-` reads the board from stdin.
//!
//! # Environment variable overrides
//!
//! | Variable               | Description                        |
//! |------------------------|------------------------------------|
//! | `SUDOKU_LINK_CONFIG`   | Config file path                   |
//! | `SUDOKU_LINK_TCP`      | Solver TCP address                 |
//! | `SUDOKU_LINK_PEER_CMD` | Solver command for stdin/stdout    |
//! | `RUST_LOG`             | `tracing` filter (overrides config)|

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use sudoku_link::application::game::GameSession;
use sudoku_link::infrastructure::channel::open_channel;
use sudoku_link::infrastructure::storage::config::{
    config_file_path, load_config, load_config_from, save_config_to, AppConfig, TransportKind,
};
use sudoku_link_core::{Board, Difficulty, LineTransport};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Client for a remote sudoku solver.
#[derive(Debug, Parser)]
#[command(name = "sudoku-link", about = "Client for a remote sudoku solver", version)]
struct Cli {
    /// Config file to read instead of the platform default.
    #[arg(long, global = true, env = "SUDOKU_LINK_CONFIG")]
    config: Option<PathBuf>,

    /// Connect to a solver listening on this `host:port`.
    #[arg(long, global = true, env = "SUDOKU_LINK_TCP", conflicts_with = "peer_cmd")]
    tcp: Option<String>,

    /// Run this solver command and talk to it over stdin/stdout.
    ///
    /// Split on whitespace, e.g. `--peer-cmd "python3 sudokuServer.py"`.
    #[arg(long, global = true, env = "SUDOKU_LINK_PEER_CMD")]
    peer_cmd: Option<String>,

    /// Timeout for each bounded protocol read, in milliseconds.
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Ask the solver for a new puzzle.
    Generate {
        /// `easy`, `medium`, or `hard` (or 3, 2, 1).
        #[arg(long, short)]
        difficulty: Option<Difficulty>,
    },
    /// Ask the solver to solve a board.
    Solve {
        /// 81 cells, or `-` for stdin.
        board: String,
    },
    /// Ask the solver whether a board is correctly solved.
    Check {
        /// 81 cells, or `-` for stdin.
        board: String,
    },
    /// Write the effective configuration to the config file.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// Applies command-line overrides on top of the file config.
    fn apply_to(&self, config: &mut AppConfig) {
        if let Some(address) = &self.tcp {
            config.link.transport = TransportKind::Tcp;
            config.link.address = address.clone();
        }
        if let Some(command) = &self.peer_cmd {
            config.link.transport = TransportKind::Process;
            config.link.peer_command = command.split_whitespace().map(String::from).collect();
        }
        if let Some(timeout) = self.timeout_ms {
            config.link.data_timeout_ms = timeout;
        }
    }

    fn config_path(&self) -> anyhow::Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => config_file_path().context("locating default config"),
        }
    }

    fn load_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => load_config_from(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => load_config().context("reading default config")?,
        };
        self.apply_to(&mut config);
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

fn write_config(config: &AppConfig, path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("{} already exists; pass --force to overwrite", path.display());
    }
    save_config_to(config, path).with_context(|| format!("writing config {}", path.display()))
}

fn read_board(arg: &str) -> anyhow::Result<Board> {
    let text = if arg == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading board from stdin")?;
        buf
    } else {
        arg.to_string()
    };
    text.parse().context("parsing board")
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    // `RUST_LOG` wins over the configured level.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.client.log_level)),
        )
        .init();

    if let Cmd::InitConfig { force } = cli.command {
        let path = cli.config_path()?;
        write_config(&config, &path, force)?;
        info!(path = %path.display(), "config written");
        return Ok(());
    }

    info!(transport = ?config.link.transport, "sudoku-link starting");

    let channel = open_channel(&config.link).context("opening solver channel")?;
    let transport = LineTransport::with_capacity(channel, config.link.line_capacity);
    let mut game = GameSession::new(
        transport,
        config.link.session_config(),
        config.game.hint_buckets,
    )?;

    match cli.command {
        Cmd::Generate { difficulty } => {
            let difficulty = match difficulty {
                Some(d) => d,
                None => config.game.difficulty()?,
            };
            let board = *game.new_game(difficulty).context("generate failed")?;
            println!("{board}");
            info!(hints = game.hint_count(), "puzzle ready");
        }
        Cmd::Solve { board } => {
            game.load_board(read_board(&board)?);
            let solved = game.solve().context("solve failed")?;
            println!("{solved}");
        }
        Cmd::Check { board } => {
            game.load_board(read_board(&board)?);
            let correct = game.check().context("check failed")?;
            println!("{}", if correct { "correct" } else { "incorrect" });
        }
        Cmd::InitConfig { .. } => {}
    }

    game.end_game();
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_difficulty_parses_names_and_numbers() {
        let cli = Cli::parse_from(["sudoku-link", "generate", "--difficulty", "hard"]);
        assert!(matches!(
            cli.command,
            Cmd::Generate {
                difficulty: Some(Difficulty::Hard)
            }
        ));

        let cli = Cli::parse_from(["sudoku-link", "generate", "-d", "2"]);
        assert!(matches!(
            cli.command,
            Cmd::Generate {
                difficulty: Some(Difficulty::Medium)
            }
        ));
    }

    #[test]
    fn test_tcp_override_replaces_address() {
        // Arrange
        let cli = Cli::parse_from(["sudoku-link", "--tcp", "10.1.1.1:7000", "check", "-"]);
        let mut config = AppConfig::default();
        config.link.transport = TransportKind::Process;

        // Act
        cli.apply_to(&mut config);

        // Assert
        assert_eq!(config.link.transport, TransportKind::Tcp);
        assert_eq!(config.link.address, "10.1.1.1:7000");
    }

    #[test]
    fn test_peer_cmd_is_split_on_whitespace() {
        let cli = Cli::parse_from([
            "sudoku-link",
            "--peer-cmd",
            "python3  sudokuServer.py -d",
            "solve",
            "-",
        ]);
        let mut config = AppConfig::default();

        cli.apply_to(&mut config);

        assert_eq!(config.link.transport, TransportKind::Process);
        assert_eq!(config.link.peer_command, ["python3", "sudokuServer.py", "-d"]);
    }

    #[test]
    fn test_timeout_override() {
        let cli = Cli::parse_from(["sudoku-link", "--timeout-ms", "250", "generate"]);
        let mut config = AppConfig::default();
        cli.apply_to(&mut config);
        assert_eq!(config.link.data_timeout_ms, 250);
    }

    #[test]
    fn test_init_config_writes_overrides_and_keeps_existing_file() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("sudoku-link-init-{}", std::process::id()));
        let path = dir.join("config.toml");
        let _ = std::fs::remove_file(&path);
        let cli = Cli::parse_from(["sudoku-link", "--tcp", "10.0.0.5:9000", "init-config"]);
        let mut config = AppConfig::default();
        cli.apply_to(&mut config);

        // Act
        write_config(&config, &path, false).unwrap();
        let second = write_config(&AppConfig::default(), &path, false);
        let loaded = load_config_from(&path).unwrap();

        // Assert
        assert!(second.is_err());
        assert_eq!(loaded.link.address, "10.0.0.5:9000");
        write_config(&AppConfig::default(), &path, true).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), AppConfig::default());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_read_board_from_argument() {
        let text = "1".repeat(81);
        let board = read_board(&text).unwrap();
        assert_eq!(board.filled_count(), 81);
        assert!(read_board("123").is_err());
    }
}
