//! Infrastructure layer for the sudoku-link client.
//!
//! Contains OS-facing adapters: the byte channels that carry the solver
//! protocol and file-system storage for the configuration.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `sudoku_link_core`, but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`channel`** – [`sudoku_link_core::protocol::Channel`] implementations
//!   for a TCP stream and for a solver child process.
//!
//! - **`storage`** – TOML configuration loading and saving.

pub mod channel;
pub mod storage;
