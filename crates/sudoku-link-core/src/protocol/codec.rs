//! Text codec for board cells, verdicts, and the difficulty parameter.
//!
//! Wire format: one decimal value per line, cells in row-major order.
//! ```text
//! 5\r\n 3\r\n 0\r\n ... (81 lines)
//! ```
//! The codec performs no I/O; the session calls it once per acknowledged cell.

use thiserror::Error;

use crate::domain::board::{Board, CellIndex, Difficulty, CELL_COUNT};

/// Errors that can occur while decoding peer text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The line is not a single recognisable digit or integer.
    #[error("malformed value: {text:?}")]
    MalformedValue { text: String },

    /// The value parsed but lies outside `0..=9`.
    #[error("cell value {0} is out of range 0..=9")]
    ValueOutOfRange(u8),

    /// A whole-board decode was given the wrong number of lines.
    #[error("expected 81 cell lines, got {0}")]
    WrongCellCount(usize),
}

impl CodecError {
    fn malformed(text: &str) -> Self {
        CodecError::MalformedValue {
            text: text.to_string(),
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes one cell value as the text of a line.
///
/// # Examples
///
/// ```rust
/// use sudoku_link_core::protocol::codec::{decode_cell, encode_cell};
///
/// let line = encode_cell(7);
/// assert_eq!(line, "7");
/// assert_eq!(decode_cell(&line), Ok(7));
/// ```
pub fn encode_cell(value: u8) -> String {
    value.to_string()
}

/// Decodes one cell value from a received line.
///
/// Surrounding whitespace is ignored; what remains must be exactly one ASCII
/// digit.
///
/// # Errors
///
/// Returns [`CodecError::MalformedValue`] for anything else.
pub fn decode_cell(text: &str) -> Result<u8, CodecError> {
    match text.trim().as_bytes() {
        [digit @ b'0'..=b'9'] => Ok(digit - b'0'),
        _ => Err(CodecError::malformed(text)),
    }
}

/// Decodes the verdict line that follows `D` in a check session.
///
/// A decimal integer is a verdict (`0` = incorrect, anything else = correct).
/// `True` and `False` (any case) are accepted as well, since the reference
/// peer prints a boolean.
///
/// # Errors
///
/// Returns [`CodecError::MalformedValue`] if the line is neither.
pub fn decode_verdict(text: &str) -> Result<bool, CodecError> {
    let trimmed = text.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Ok(value != 0);
    }
    if trimmed.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(CodecError::malformed(text))
    }
}

/// Encodes the difficulty parameter of a generate request.
pub fn encode_difficulty(difficulty: Difficulty) -> String {
    difficulty.value().to_string()
}

/// Decodes the difficulty parameter (peer side of a generate request).
///
/// # Errors
///
/// Returns [`CodecError::MalformedValue`] unless the text is `1`, `2`, or `3`.
pub fn decode_difficulty(text: &str) -> Result<Difficulty, CodecError> {
    text.trim()
        .parse::<u8>()
        .ok()
        .and_then(|v| Difficulty::try_from(v).ok())
        .ok_or_else(|| CodecError::malformed(text))
}

/// Encodes all 81 cells in row-major order, one line each.
pub fn encode_board(board: &Board) -> Vec<String> {
    board.cells().map(|(_, value)| encode_cell(value)).collect()
}

/// Decodes 81 row-major cell lines into a board.
///
/// # Errors
///
/// Returns [`CodecError::WrongCellCount`] if there are not exactly 81 lines,
/// or the first per-cell decode error.
pub fn decode_board<S: AsRef<str>>(lines: &[S]) -> Result<Board, CodecError> {
    if lines.len() != CELL_COUNT {
        return Err(CodecError::WrongCellCount(lines.len()));
    }
    let mut board = Board::empty();
    for (index, line) in CellIndex::all().zip(lines) {
        let value = decode_cell(line.as_ref())?;
        board
            .set(index, value)
            .map_err(|_| CodecError::ValueOutOfRange(value))?;
    }
    Ok(board)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
