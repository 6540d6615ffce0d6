//! Domain entities for sudoku-link.
//!
//! This module contains pure data types with no infrastructure dependencies.
//!
//! The board is owned by whoever drives the game (the "UI glue").  The
//! protocol layer only ever borrows it for the duration of one call, and the
//! exclusion set is filled in by the same caller after a puzzle is generated.

/// The 9×9 board, cell indices, cursor, and difficulty selector.
pub mod board;

/// Fixed-bucket chained hash table used to mark hint cells.
pub mod exclusion;
