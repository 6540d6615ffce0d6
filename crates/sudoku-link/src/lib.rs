//! sudoku-link library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does sudoku-link do? (for beginners)
//!
//! The puzzles are not generated or solved in this process.  A separate
//! solver program does that, and sudoku-link talks to it over a plain line
//! protocol (the same one a microcontroller used over a serial cable).
//!
//! The client:
//!
//! 1. Opens a channel to the solver, either a TCP connection or a child
//!    process's stdin/stdout.
//! 2. Runs one of three conversations from `sudoku_link_core`: generate a
//!    puzzle, solve a board, or check a board.
//! 3. Keeps track of the current game, including which cells are hints the
//!    player may not change.

/// Application layer: the game use case.
pub mod application;

/// Infrastructure layer: solver channels and configuration storage.
pub mod infrastructure;
