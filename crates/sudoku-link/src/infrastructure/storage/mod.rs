//! Storage infrastructure: configuration file loading.
//!
//! The `config` sub-module reads the TOML configuration from `--config` or the
//! platform-appropriate directory and falls back to defaults when the file
//! does not exist yet.

pub mod config;
