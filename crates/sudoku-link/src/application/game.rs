//! GameSession: one player's game against the remote solver.
//!
//! The use case owns the line transport, the current board, and the table of
//! hint cells.  It is what a front end calls into:
//!
//! 1. [`new_game`](GameSession::new_game) asks the solver for a puzzle and
//!    marks every non-empty cell as a hint.
//! 2. [`set_cell`](GameSession::set_cell) edits the board, refusing hints.
//! 3. [`check`](GameSession::check) / [`solve`](GameSession::solve) send the
//!    board back to the solver.
//! 4. [`end_game`](GameSession::end_game) clears the board and the hints.

use thiserror::Error;
use tracing::{debug, info};

use sudoku_link_core::protocol::Channel;
use sudoku_link_core::{
    Board, BoardError, CellIndex, Difficulty, ExclusionError, ExclusionSet, HintCells,
    LineTransport, SessionConfig, SessionError, SolverSession,
};

/// Error type for game operations.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("no game in progress")]
    NoActiveGame,

    #[error("cell {0} is a hint and cannot be changed")]
    HintCell(CellIndex),

    #[error(transparent)]
    Board(#[from] BoardError),

    #[error("solver session failed: {0}")]
    Session(#[from] SessionError),

    #[error(transparent)]
    Exclusion(#[from] ExclusionError),
}

/// Use case driving a game over a solver channel.
pub struct GameSession<C> {
    transport: LineTransport<C>,
    session_config: SessionConfig,
    board: Board,
    hints: HintCells,
    active: bool,
}

impl<C: Channel> GameSession<C> {
    /// Creates an idle game over `transport`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Exclusion`] if `hint_buckets` is zero.
    pub fn new(
        transport: LineTransport<C>,
        session_config: SessionConfig,
        hint_buckets: usize,
    ) -> Result<Self, GameError> {
        Ok(Self {
            transport,
            session_config,
            board: Board::empty(),
            hints: ExclusionSet::with_buckets(hint_buckets)?,
            active: false,
        })
    }

    /// Requests a new puzzle and starts a game with it.
    ///
    /// The previous game, if any, is ended first.  On failure no game is
    /// active.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Session`] if the solver conversation fails.
    pub fn new_game(&mut self, difficulty: Difficulty) -> Result<&Board, GameError> {
        self.end_game();
        let puzzle = self.session().generate(difficulty)?;
        let marked = self.hints.mark_hints(&puzzle);
        self.board = puzzle;
        self.active = true;
        info!(%difficulty, hints = marked, "new game started");
        Ok(&self.board)
    }

    /// Starts a game on a board entered by the player.  No cell is a hint.
    pub fn load_board(&mut self, board: Board) {
        self.end_game();
        self.board = board;
        self.active = true;
        debug!(filled = board.filled_count(), "board loaded");
    }

    /// Writes `value` (0 clears) into a non-hint cell.
    ///
    /// # Errors
    ///
    /// [`GameError::NoActiveGame`], [`GameError::HintCell`], or
    /// [`GameError::Board`] for a value above 9.
    pub fn set_cell(&mut self, index: CellIndex, value: u8) -> Result<(), GameError> {
        if !self.active {
            return Err(GameError::NoActiveGame);
        }
        if self.hints.is_hint(index) {
            return Err(GameError::HintCell(index));
        }
        self.board.set(index, value)?;
        Ok(())
    }

    /// Asks the solver whether the current board is correctly solved.
    ///
    /// # Errors
    ///
    /// [`GameError::NoActiveGame`] or [`GameError::Session`].  A timeout is
    /// an error, not `false`.
    pub fn check(&mut self) -> Result<bool, GameError> {
        if !self.active {
            return Err(GameError::NoActiveGame);
        }
        let board = self.board;
        let verdict = self.session().check(&board)?;
        info!(verdict, "board checked");
        Ok(verdict)
    }

    /// Replaces the current board with the solver's solution.
    ///
    /// The board is left untouched if the solver fails.
    ///
    /// # Errors
    ///
    /// [`GameError::NoActiveGame`] or [`GameError::Session`].
    pub fn solve(&mut self) -> Result<&Board, GameError> {
        if !self.active {
            return Err(GameError::NoActiveGame);
        }
        let board = self.board;
        let solved = self.session().solve(&board)?;
        self.board = solved;
        Ok(&self.board)
    }

    /// Ends the game: clears the board and forgets every hint.
    pub fn end_game(&mut self) {
        if self.active {
            debug!(hints = self.hints.len(), "game ended");
        }
        self.hints.clear();
        self.board.clear();
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn is_hint(&self, index: CellIndex) -> bool {
        self.hints.is_hint(index)
    }

    pub fn hint_count(&self) -> usize {
        self.hints.len()
    }

    pub fn transport_mut(&mut self) -> &mut LineTransport<C> {
        &mut self.transport
    }

    fn session(&mut self) -> SolverSession<'_, C> {
        SolverSession::new(&mut self.transport, self.session_config)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
