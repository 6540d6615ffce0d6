//! # sudoku-link-core
//!
//! Shared library for sudoku-link containing the line protocol used to talk to
//! a remote sudoku solver, the grid codec, and the hint-cell table.
//!
//! It has zero dependencies on OS APIs, sockets, or UI frameworks: every byte
//! travels through the [`protocol::Channel`] trait, which the application crate
//! implements for real streams and [`protocol::mock`] implements for tests.
//!
//! # Architecture overview (for beginners)
//!
//! The solver does not live in this process.  It sits at the other end of a
//! half-duplex, line-oriented byte stream (originally a serial cable) and
//! understands three requests: *check* a board, *solve* a board, and
//! *generate* a new puzzle.  Each request is a short conversation of
//! one-character markers and decimal numbers, one per line.
//!
//! This crate defines:
//!
//! - **`domain`** – The board itself (a 9×9 grid of digits), cell indices, the
//!   difficulty selector, and the [`ExclusionSet`]: a small chained hash table
//!   used to remember which cells are fixed hints the player may not edit.
//!
//! - **`protocol`** – How lines travel over the stream.  The
//!   [`protocol::LineTransport`] turns a byte stream into lines with optional
//!   deadlines, the codec turns cells into text, and the
//!   [`protocol::SolverSession`] runs the three request/response state
//!   machines on top.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `sudoku_link_core::Board` instead of `sudoku_link_core::domain::board::Board`.
pub use domain::board::{Board, BoardError, CellCursor, CellIndex, Difficulty};
pub use domain::exclusion::{ExclusionError, ExclusionSet, HintCells, TableKey};
pub use protocol::codec::{decode_cell, encode_cell, CodecError};
pub use protocol::session::{Operation, Outcome, SessionConfig, SessionError, SolverSession};
pub use protocol::transport::{Deadline, LineTransport, ReadOutcome};
