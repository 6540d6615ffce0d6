//! TOML-based configuration for the sudoku-link client.
//!
//! Reads `AppConfig` from an explicit path (`--config`) or from the
//! platform-appropriate config file:
//! - Windows:  `%APPDATA%\SudokuLink\config.toml`
//! - Linux:    `~/.config/sudoku-link/config.toml`
//! - macOS:    `~/Library/Application Support/SudokuLink/config.toml`
//!
//! Example file:
//!
//! ```toml
//! [client]
//! log_level = "debug"
//!
//! [link]
//! transport = "tcp"
//! address = "127.0.0.1:9999"
//! data_timeout_ms = 1000
//!
//! [game]
//! default_difficulty = "medium"
//! ```
//!
//! Every field has a `#[serde(default = "...")]`, so a missing file, a missing
//! section, or a missing key all fall back to the same defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sudoku_link_core::protocol::transport::DEFAULT_LINE_CAPACITY;
use sudoku_link_core::{Difficulty, SessionConfig};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value parsed as TOML but makes no sense.
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub link: LinkConfig,
    #[serde(default)]
    pub game: GameConfig,
}

/// General client behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Which channel carries the protocol.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// A TCP connection to a solver listening on `address`.
    Tcp,
    /// A solver child process spoken to over its stdin and stdout.
    Process,
}

/// Connection to the solver and protocol timing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkConfig {
    #[serde(default = "default_transport")]
    pub transport: TransportKind,
    /// `host:port` of the solver for the TCP transport.
    #[serde(default = "default_address")]
    pub address: String,
    /// Program and arguments for the process transport.
    #[serde(default)]
    pub peer_command: Vec<String>,
    /// Timeout for each bounded protocol read.  `0` means no deadline.
    #[serde(default = "default_data_timeout_ms")]
    pub data_timeout_ms: u64,
    /// Pause before each command byte.
    #[serde(default)]
    pub command_delay_ms: u64,
    /// Line buffer capacity, terminator slot included.
    #[serde(default = "default_line_capacity")]
    pub line_capacity: usize,
    /// How long one channel poll may block.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// Game settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameConfig {
    /// Bucket count of the hint-cell table.
    #[serde(default = "default_hint_buckets")]
    pub hint_buckets: usize,
    /// Difficulty used when `generate` is run without `--difficulty`.
    #[serde(default = "default_difficulty")]
    pub default_difficulty: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_transport() -> TransportKind {
    TransportKind::Tcp
}
fn default_address() -> String {
    "127.0.0.1:9999".to_string()
}
fn default_data_timeout_ms() -> u64 {
    1000
}
fn default_line_capacity() -> usize {
    DEFAULT_LINE_CAPACITY
}
fn default_poll_interval_ms() -> u64 {
    1
}
fn default_hint_buckets() -> usize {
    sudoku_link_core::domain::exclusion::HINT_BUCKETS
}
fn default_difficulty() -> String {
    "easy".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            transport: default_transport(),
            address: default_address(),
            peer_command: Vec::new(),
            data_timeout_ms: default_data_timeout_ms(),
            command_delay_ms: 0,
            line_capacity: default_line_capacity(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            hint_buckets: default_hint_buckets(),
            default_difficulty: default_difficulty(),
        }
    }
}

impl LinkConfig {
    /// Protocol timing derived from this section.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::default()
            .with_data_timeout(Duration::from_millis(self.data_timeout_ms))
            .with_command_delay(Duration::from_millis(self.command_delay_ms))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl GameConfig {
    /// The configured default difficulty.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an unknown difficulty name.
    pub fn difficulty(&self) -> Result<Difficulty, ConfigError> {
        self.default_difficulty
            .parse()
            .map_err(|reason| ConfigError::Invalid {
                field: "game.default_difficulty",
                reason,
            })
    }
}

impl AppConfig {
    /// Checks values that parse fine but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.game.hint_buckets == 0 {
            return Err(ConfigError::Invalid {
                field: "game.hint_buckets",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.link.line_capacity < 2 {
            return Err(ConfigError::Invalid {
                field: "link.line_capacity",
                reason: "must be at least 2".to_string(),
            });
        }
        if self.link.transport == TransportKind::Process && self.link.peer_command.is_empty() {
            return Err(ConfigError::Invalid {
                field: "link.peer_command",
                reason: "required for the process transport".to_string(),
            });
        }
        self.game.difficulty()?;
        Ok(())
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads `AppConfig` from the default location, returning defaults if the
/// file does not exist.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the file
/// does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("SudokuLink"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("sudoku-link"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("SudokuLink")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        std::env::temp_dir()
            .join(format!("sudoku_link_test_{}_{nanos}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_defaults_match_protocol_constants() {
        // Arrange / Act
        let cfg = AppConfig::default();

        // Assert
        assert_eq!(cfg.link.data_timeout_ms, 1000);
        assert_eq!(cfg.link.line_capacity, 32);
        assert_eq!(cfg.link.transport, TransportKind::Tcp);
        assert_eq!(cfg.game.hint_buckets, 30);
        assert_eq!(cfg.client.log_level, "info");
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("empty TOML is valid");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_partial_link_section_overrides_defaults() {
        // Arrange
        let toml_str = r#"
[link]
transport = "process"
peer_command = ["python3", "server.py"]
data_timeout_ms = 250
"#;

        // Act
        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(cfg.link.transport, TransportKind::Process);
        assert_eq!(cfg.link.peer_command, ["python3", "server.py"]);
        assert_eq!(cfg.link.session_config().data_timeout, Duration::from_millis(250));
        assert_eq!(cfg.link.address, "127.0.0.1:9999");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_unknown_transport_is_a_parse_error() {
        let result: Result<AppConfig, _> = toml::from_str("[link]\ntransport = \"usb\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_process_without_command() {
        let mut cfg = AppConfig::default();
        cfg.link.transport = TransportKind::Process;
        let err = cfg.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "link.peer_command",
                ..
            }
        ));
    }

    #[test]
    fn test_validate_rejects_zero_buckets_and_bad_difficulty() {
        let mut cfg = AppConfig::default();
        cfg.game.hint_buckets = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.game.default_difficulty = "nightmare".to_string();
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_game_difficulty_parses_names() {
        let mut cfg = GameConfig::default();
        assert_eq!(cfg.difficulty().unwrap(), Difficulty::Easy);
        cfg.default_difficulty = "hard".to_string();
        assert_eq!(cfg.difficulty().unwrap(), Difficulty::Hard);
    }

    #[test]
    fn test_load_config_from_missing_file_returns_default() {
        let path = PathBuf::from("/nonexistent/path/that/cannot/exist/config.toml");
        let cfg = load_config_from(&path).expect("missing file is not an error");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        // Arrange
        let path = temp_path("config.toml");
        let mut cfg = AppConfig::default();
        cfg.link.address = "10.0.0.7:4000".to_string();
        cfg.client.log_level = "debug".to_string();

        // Act
        save_config_to(&cfg, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        // Assert
        assert_eq!(loaded, cfg);

        // Cleanup
        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_load_config_from_malformed_file_is_parse_error() {
        let path = temp_path("bad.toml");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[[[ not valid toml").unwrap();

        let result = load_config_from(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_config_file_path_ends_with_config_toml() {
        if let Ok(path) = config_file_path() {
            assert!(path.ends_with("config.toml"), "got {path:?}");
        }
    }
}
