//! The sudoku board and the small value types that index into it.
//!
//! # Cell order
//!
//! Every traversal in this crate is row-major: row 0 columns 0..8, then row 1,
//! and so on.  The wire protocol relies on this order implicitly (cells are
//! never labelled on the wire), so [`CellIndex`], [`CellCursor`], and
//! [`Board::cells`] all agree on it.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Number of rows (and columns) on the board.
pub const BOARD_SIZE: usize = 9;

/// Total number of cells on the board.
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// Largest value a cell may hold.  `0` means "empty".
pub const MAX_CELL_VALUE: u8 = 9;

/// Errors produced when building or mutating a [`Board`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    /// A cell value outside `0..=9` was supplied.
    #[error("cell value {value} at {index} is out of range 0..=9")]
    ValueOutOfRange { index: CellIndex, value: u8 },

    /// A textual board did not contain exactly 81 cells.
    #[error("board text has {found} cells, expected 81")]
    WrongLength { found: usize },

    /// A textual board contained a character that is not a digit or `.`.
    #[error("invalid character {0:?} in board text")]
    InvalidCharacter(char),
}

// ── Cell index ────────────────────────────────────────────────────────────────

/// Position of one cell, stored as the row-major offset `row * 9 + col`.
///
/// The offset doubles as the key of the hint-cell table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellIndex(u8);

impl CellIndex {
    /// Creates an index from a row and column.
    ///
    /// Returns `None` if either coordinate is 9 or more.
    pub fn new(row: usize, col: usize) -> Option<Self> {
        if row < BOARD_SIZE && col < BOARD_SIZE {
            Some(Self((row * BOARD_SIZE + col) as u8))
        } else {
            None
        }
    }

    /// Creates an index from a row-major offset in `0..81`.
    pub fn from_offset(offset: usize) -> Option<Self> {
        (offset < CELL_COUNT).then(|| Self(offset as u8))
    }

    /// Row-major offset in `0..81`.
    pub fn offset(self) -> usize {
        usize::from(self.0)
    }

    pub fn row(self) -> usize {
        self.offset() / BOARD_SIZE
    }

    pub fn col(self) -> usize {
        self.offset() % BOARD_SIZE
    }

    /// Iterates over all 81 indices in row-major order.
    pub fn all() -> impl Iterator<Item = CellIndex> {
        (0..CELL_COUNT as u8).map(CellIndex)
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}c{}", self.row(), self.col())
    }
}

// ── Cell cursor ───────────────────────────────────────────────────────────────

/// The "next cell" pointer a protocol phase walks across the board.
///
/// The column increments first and wraps into the row, so a fresh cursor
/// visits (0,0), (0,1), … (0,8), (1,0), … (8,8) and is then exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellCursor {
    row: usize,
    col: usize,
}

impl CellCursor {
    /// Creates a cursor positioned at (0,0).
    pub fn new() -> Self {
        Self::default()
    }

    /// The cell the cursor points at, or `None` once all 81 were consumed.
    pub fn current(&self) -> Option<CellIndex> {
        CellIndex::new(self.row, self.col)
    }

    /// Moves to the next cell in row-major order.
    ///
    /// Advancing an exhausted cursor leaves it exhausted.
    pub fn advance(&mut self) {
        if self.is_exhausted() {
            return;
        }
        self.col += 1;
        if self.col == BOARD_SIZE {
            self.col = 0;
            self.row += 1;
        }
    }

    /// `true` once the cell at (8,8) has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.row >= BOARD_SIZE
    }

    /// Number of cells consumed so far.
    pub fn consumed(&self) -> usize {
        (self.row * BOARD_SIZE + self.col).min(CELL_COUNT)
    }

    /// Moves the cursor back to (0,0).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ── Board ─────────────────────────────────────────────────────────────────────

/// A 9×9 grid of digits in `0..=9`, `0` meaning "empty".
///
/// The range invariant is enforced by every constructor and mutator, so any
/// `Board` value can be put on the wire without further checks.  Nothing is
/// said about solvability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Board {
    cells: [[u8; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// Creates a board with every cell empty.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a board from nine rows of nine values.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::ValueOutOfRange`] for the first value above 9.
    pub fn from_rows(rows: [[u8; BOARD_SIZE]; BOARD_SIZE]) -> Result<Self, BoardError> {
        for index in CellIndex::all() {
            let value = rows[index.row()][index.col()];
            if value > MAX_CELL_VALUE {
                return Err(BoardError::ValueOutOfRange { index, value });
            }
        }
        Ok(Self { cells: rows })
    }

    pub fn get(&self, index: CellIndex) -> u8 {
        self.cells[index.row()][index.col()]
    }

    /// Writes one cell.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::ValueOutOfRange`] if `value` is above 9; the board
    /// is left unchanged.
    pub fn set(&mut self, index: CellIndex, value: u8) -> Result<(), BoardError> {
        if value > MAX_CELL_VALUE {
            return Err(BoardError::ValueOutOfRange { index, value });
        }
        self.cells[index.row()][index.col()] = value;
        Ok(())
    }

    /// The rows as plain arrays.
    pub fn rows(&self) -> &[[u8; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    /// Iterates over `(index, value)` pairs in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (CellIndex, u8)> + '_ {
        CellIndex::all().map(move |index| (index, self.get(index)))
    }

    /// Number of non-empty cells.
    pub fn filled_count(&self) -> usize {
        self.cells().filter(|&(_, value)| value != 0).count()
    }

    /// Empties every cell.
    pub fn clear(&mut self) {
        self.cells = [[0; BOARD_SIZE]; BOARD_SIZE];
    }
}

/// Parses 81 cells from text.
///
/// Digits `1`–`9` are values, `0` and `.` are empty cells, and whitespace is
/// ignored so boards can be written one row per line.
impl FromStr for Board {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut values = Vec::with_capacity(CELL_COUNT);
        for ch in s.chars().filter(|c| !c.is_whitespace()) {
            let value = match ch {
                '.' => 0,
                '0'..='9' => ch as u8 - b'0',
                other => return Err(BoardError::InvalidCharacter(other)),
            };
            values.push(value);
        }
        if values.len() != CELL_COUNT {
            return Err(BoardError::WrongLength {
                found: values.len(),
            });
        }

        let mut board = Board::empty();
        for (index, value) in CellIndex::all().zip(values) {
            board.set(index, value)?;
        }
        Ok(board)
    }
}

/// Nine lines of nine digits, `0` for empty cells.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.cells.iter().enumerate() {
            for value in row {
                write!(f, "{value}")?;
            }
            if r + 1 < BOARD_SIZE {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

// ── Difficulty ────────────────────────────────────────────────────────────────

/// Difficulty selector sent to the peer with a generate request.
///
/// The numeric values are the ones the original menu produced; the reference
/// peer turns them into `20 × value` hint cells, so a larger number is an
/// easier puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Difficulty {
    Hard = 1,
    Medium = 2,
    Easy = 3,
}

impl Difficulty {
    /// The decimal value put on the wire.
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Hint count the reference peer produces for this difficulty.
    pub fn expected_hints(self) -> usize {
        20 * usize::from(self.value())
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Difficulty::Hard),
            2 => Ok(Difficulty::Medium),
            3 => Ok(Difficulty::Easy),
            _ => Err(()),
        }
    }
}

/// Accepts `easy`, `medium`, `hard` (any case) or the digits `1`–`3`.
impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => other
                .parse::<u8>()
                .ok()
                .and_then(|v| Difficulty::try_from(v).ok())
                .ok_or_else(|| format!("unknown difficulty: {trimmed:?}")),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Hard => "hard",
            Difficulty::Medium => "medium",
            Difficulty::Easy => "easy",
        };
        f.write_str(name)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const SOLVED: &str = "\
        534678912\
        672195348\
        198342567\
        859761423\
        426853791\
        713924856\
        961537284\
        287419635\
        345286179";

    // ── CellIndex ─────────────────────────────────────────────────────────────

    #[test]
    fn test_cell_index_offset_is_row_major() {
        let index = CellIndex::new(2, 7).expect("in range");
        assert_eq!(index.offset(), 25);
        assert_eq!(index.row(), 2);
        assert_eq!(index.col(), 7);
    }

    #[test]
    fn test_cell_index_rejects_out_of_range_coordinates() {
        assert!(CellIndex::new(9, 0).is_none());
        assert!(CellIndex::new(0, 9).is_none());
        assert!(CellIndex::from_offset(81).is_none());
        assert_eq!(CellIndex::from_offset(80), CellIndex::new(8, 8));
    }

    #[test]
    fn test_cell_index_all_yields_81_in_order() {
        let all: Vec<usize> = CellIndex::all().map(CellIndex::offset).collect();
        assert_eq!(all, (0..81).collect::<Vec<_>>());
    }

    // ── CellCursor ────────────────────────────────────────────────────────────

    #[test]
    fn test_cursor_wraps_column_into_row() {
        // Arrange
        let mut cursor = CellCursor::new();

        // Act
        for _ in 0..9 {
            cursor.advance();
        }

        // Assert
        assert_eq!(cursor.current(), CellIndex::new(1, 0));
        assert_eq!(cursor.consumed(), 9);
    }

    #[test]
    fn test_cursor_is_exhausted_after_81_advances() {
        // Arrange
        let mut cursor = CellCursor::new();

        // Act
        for _ in 0..80 {
            cursor.advance();
        }
        let last = cursor.current();
        cursor.advance();

        // Assert
        assert_eq!(last, CellIndex::new(8, 8));
        assert!(cursor.is_exhausted());
        assert_eq!(cursor.current(), None);
        assert_eq!(cursor.consumed(), 81);
    }

    #[test]
    fn test_cursor_advance_past_end_stays_exhausted() {
        let mut cursor = CellCursor::new();
        for _ in 0..100 {
            cursor.advance();
        }
        assert!(cursor.is_exhausted());
        assert_eq!(cursor.consumed(), 81);
    }

    #[test]
    fn test_cursor_reset_returns_to_origin() {
        let mut cursor = CellCursor::new();
        cursor.advance();
        cursor.advance();
        cursor.reset();
        assert_eq!(cursor.current(), CellIndex::new(0, 0));
    }

    // ── Board ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_board_set_rejects_value_above_nine() {
        // Arrange
        let mut board = Board::empty();
        let index = CellIndex::new(4, 4).unwrap();

        // Act
        let result = board.set(index, 10);

        // Assert
        assert_eq!(result, Err(BoardError::ValueOutOfRange { index, value: 10 }));
        assert_eq!(board.get(index), 0, "board must be unchanged on error");
    }

    #[test]
    fn test_board_from_rows_validates_every_cell() {
        let mut rows = [[0u8; 9]; 9];
        rows[8][8] = 12;
        let result = Board::from_rows(rows);
        assert!(matches!(
            result,
            Err(BoardError::ValueOutOfRange { value: 12, .. })
        ));
    }

    #[test]
    fn test_board_parses_and_displays_round_trip() {
        // Arrange / Act
        let board: Board = SOLVED.parse().expect("valid board");
        let text = board.to_string();

        // Assert
        assert_eq!(text.lines().count(), 9);
        assert_eq!(text.lines().next(), Some("534678912"));
        assert_eq!(text.parse::<Board>().unwrap(), board);
    }

    #[test]
    fn test_board_parse_treats_dot_and_zero_as_empty() {
        let text = format!("5.0{}", "0".repeat(78));
        let board: Board = text.parse().unwrap();
        assert_eq!(board.filled_count(), 1);
        assert_eq!(board.get(CellIndex::new(0, 0).unwrap()), 5);
    }

    #[test]
    fn test_board_parse_rejects_wrong_length() {
        let result = "123".parse::<Board>();
        assert_eq!(result, Err(BoardError::WrongLength { found: 3 }));
    }

    #[test]
    fn test_board_parse_rejects_letters() {
        let text = format!("x{}", "0".repeat(80));
        assert_eq!(
            text.parse::<Board>(),
            Err(BoardError::InvalidCharacter('x'))
        );
    }

    #[test]
    fn test_board_clear_empties_all_cells() {
        let mut board: Board = SOLVED.parse().unwrap();
        board.clear();
        assert_eq!(board, Board::empty());
    }

    // ── Difficulty ────────────────────────────────────────────────────────────

    #[test]
    fn test_difficulty_values_match_menu_positions() {
        assert_eq!(Difficulty::Hard.value(), 1);
        assert_eq!(Difficulty::Medium.value(), 2);
        assert_eq!(Difficulty::Easy.value(), 3);
        assert_eq!(Difficulty::Easy.expected_hints(), 60);
    }

    #[test]
    fn test_difficulty_parses_names_and_digits() {
        assert_eq!("Easy".parse::<Difficulty>(), Ok(Difficulty::Easy));
        assert_eq!(" hard ".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!("2".parse::<Difficulty>(), Ok(Difficulty::Medium));
        assert!("0".parse::<Difficulty>().is_err());
        assert!("impossible".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_difficulty_try_from_rejects_zero() {
        assert!(Difficulty::try_from(0).is_err());
        assert!(Difficulty::try_from(4).is_err());
    }
}
