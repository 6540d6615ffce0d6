//! Application layer use cases for the sudoku-link client.
//!
//! - **`game`** – A game against the remote solver: generate a puzzle, protect
//!   its hint cells from edits, check or solve the board, and end the game.
//!   The channel to the solver is injected at construction time, so the same
//!   use case runs over TCP, a child process, or the in-memory simulated peer.

pub mod game;
