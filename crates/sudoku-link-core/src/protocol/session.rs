//! Solver session protocol: the check, solve, and generate conversations.
//!
//! # How a session runs (for beginners)
//!
//! Every operation is one blocking call that opens a conversation with the
//! peer, walks a small state machine to its end, and returns.  Nothing survives
//! the call: the [`SolverSession`] only borrows the transport, and its cursor
//! lives inside the call stack.
//!
//! ```text
//! check     C  ─▶ request phase ─▶ wait D ─▶ verdict
//! solve     F  ─▶ request phase ─▶ wait D|- ─▶ response phase ─▶ trailer
//! generate  G  ─▶ wait A, send n ─▶ wait D|- ─▶ response phase ─▶ trailer
//! ```
//!
//! The request and response phases are the same machine, a `CellStream`,
//! pointed in opposite directions:
//!
//! - **Send** – wait for the peer's `A`, send the cell under the cursor,
//!   advance.  Lines that do not start with `A` are noise and are skipped.
//! - **Receive** – send `A`, read one digit, store it under the cursor,
//!   advance.
//!
//! In both directions the cursor starts at (0,0) and stops after (8,8).
//!
//! # Deadlines
//!
//! Reads that carry data (acknowledges, digits, the verdict, the trailer) use
//! the configured data timeout, one attempt each.  While waiting for an `A`
//! every line read gets a fresh timeout, so a chatty peer is not cut off.
//! The wait for `D` after a request has no deadline.

use std::fmt;
use std::io;
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::domain::board::{Board, CellCursor, Difficulty};
use crate::protocol::channel::Channel;
use crate::protocol::codec::{
    decode_cell, decode_verdict, encode_cell, encode_difficulty, CodecError,
};
use crate::protocol::messages::{Command, Marker, RESET_LINE};
use crate::protocol::transport::{Deadline, LineTransport, ReadOutcome};

/// Default timeout for every data read.
pub const DEFAULT_DATA_TIMEOUT: Duration = Duration::from_millis(1000);

// ── Configuration ─────────────────────────────────────────────────────────────

/// Timing knobs for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Deadline for each bounded read.
    pub data_timeout: Duration,
    /// Pause before the command byte is written.
    pub command_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            data_timeout: DEFAULT_DATA_TIMEOUT,
            command_delay: Duration::ZERO,
        }
    }
}

impl SessionConfig {
    pub fn with_data_timeout(mut self, timeout: Duration) -> Self {
        self.data_timeout = timeout;
        self
    }

    pub fn with_command_delay(mut self, delay: Duration) -> Self {
        self.command_delay = delay;
        self
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Where in a conversation a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Streaming the local board to the peer.
    Request,
    /// Handing the difficulty to the peer.
    Parameter,
    /// Waiting for `D` (or `-`).
    AwaitingDone,
    /// Reading the check verdict.
    Verdict,
    /// Streaming the peer's board back.
    Response,
    /// Reading the closing `E`.
    Trailer,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Request => "request",
            Phase::Parameter => "parameter",
            Phase::AwaitingDone => "awaiting-done",
            Phase::Verdict => "verdict",
            Phase::Response => "response",
            Phase::Trailer => "trailer",
        };
        f.write_str(name)
    }
}

/// Errors a session can end with.  None of them is retried internally.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A bounded read did not complete in time.
    #[error("peer did not answer in time ({phase} phase)")]
    TransportTimeout { phase: Phase },

    /// The channel ended in the middle of a conversation.
    #[error("channel closed by peer ({phase} phase)")]
    TransportClosed { phase: Phase },

    /// A received line did not decode to the expected value.
    #[error(transparent)]
    MalformedValue(#[from] CodecError),

    /// The board arrived but the closing line was not `E`.
    #[error("expected end marker E, received {received:?}")]
    UnexpectedTrailer { received: String },

    /// The peer reported that the board has no solution.
    #[error("peer reports the board is unsolvable")]
    Unsolvable,

    /// The peer could not generate a puzzle.
    #[error("peer could not generate a board")]
    Ungeneratable,

    /// The underlying channel failed.
    #[error("channel I/O error: {0}")]
    Io(#[from] io::Error),
}

impl SessionError {
    /// `true` for [`SessionError::TransportTimeout`].
    ///
    /// Lets a check caller tell "no answer" apart from "incorrect".
    pub fn is_timeout(&self) -> bool {
        matches!(self, SessionError::TransportTimeout { .. })
    }
}

// ── Operations ────────────────────────────────────────────────────────────────

/// One request to the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Check(Board),
    Solve(Board),
    Generate(Difficulty),
}

/// Successful result of an [`Operation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Check verdict: `true` means the board is correctly solved.
    Verdict(bool),
    /// Board returned by solve or generate.
    Board(Board),
}

// ── Cell stream ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Send,
    Receive,
}

/// The per-cell handshake shared by the request and response phases.
struct CellStream {
    direction: Direction,
    cursor: CellCursor,
    board: Board,
}

impl CellStream {
    fn sending(board: &Board) -> Self {
        Self {
            direction: Direction::Send,
            cursor: CellCursor::new(),
            board: *board,
        }
    }

    fn receiving() -> Self {
        Self {
            direction: Direction::Receive,
            cursor: CellCursor::new(),
            board: Board::empty(),
        }
    }

    fn phase(&self) -> Phase {
        match self.direction {
            Direction::Send => Phase::Request,
            Direction::Receive => Phase::Response,
        }
    }

    /// Runs the handshake over all 81 cells and returns the streamed board.
    fn run<C: Channel>(
        mut self,
        transport: &mut LineTransport<C>,
        timeout: Duration,
    ) -> Result<Board, SessionError> {
        let phase = self.phase();
        debug!(%phase, "cell stream started");

        while let Some(index) = self.cursor.current() {
            match self.direction {
                Direction::Send => {
                    await_marker(transport, &[Marker::Ack], Some(timeout), phase)?;
                    transport.send_line(&encode_cell(self.board.get(index)))?;
                }
                Direction::Receive => {
                    transport.send_line(Marker::Ack.as_line())?;
                    let text = read_data(transport, Deadline::after(timeout), phase)?;
                    let value = decode_cell(&text)?;
                    self.board
                        .set(index, value)
                        .map_err(|_| CodecError::ValueOutOfRange(value))?;
                }
            }
            trace!(%index, "cell exchanged");
            self.cursor.advance();
        }

        debug!(%phase, cells = self.cursor.consumed(), "cell stream finished");
        Ok(self.board)
    }
}

// ── Read helpers ──────────────────────────────────────────────────────────────

/// Reads lines until one starts with one of `accepted`; other lines are noise.
///
/// `timeout` bounds each line read on its own, so the clock restarts after
/// every noise line.  `None` waits forever.
fn await_marker<C: Channel>(
    transport: &mut LineTransport<C>,
    accepted: &[Marker],
    timeout: Option<Duration>,
    phase: Phase,
) -> Result<Marker, SessionError> {
    loop {
        let deadline = timeout.map_or(Deadline::Never, Deadline::after);
        match transport.read_line(deadline)? {
            ReadOutcome::Line(line) => {
                let marker = line
                    .first_byte()
                    .and_then(|b| Marker::try_from(b).ok())
                    .filter(|m| accepted.contains(m));
                if let Some(marker) = marker {
                    return Ok(marker);
                }
                trace!(%phase, noise = %line.text(), "discarding line");
            }
            ReadOutcome::Timeout => return Err(SessionError::TransportTimeout { phase }),
            ReadOutcome::Closed => return Err(SessionError::TransportClosed { phase }),
        }
    }
}

/// Reads exactly one line; a timeout or close is an error.
fn read_data<C: Channel>(
    transport: &mut LineTransport<C>,
    deadline: Deadline,
    phase: Phase,
) -> Result<String, SessionError> {
    match transport.read_line(deadline)? {
        ReadOutcome::Line(line) => Ok(line.text().into_owned()),
        ReadOutcome::Timeout => Err(SessionError::TransportTimeout { phase }),
        ReadOutcome::Closed => Err(SessionError::TransportClosed { phase }),
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

/// One conversation with the solver over a borrowed transport.
///
/// Holding `&mut LineTransport` means no second session can use the same
/// channel while this one is alive.
pub struct SolverSession<'t, C> {
    transport: &'t mut LineTransport<C>,
    config: SessionConfig,
}

impl<'t, C: Channel> SolverSession<'t, C> {
    pub fn new(transport: &'t mut LineTransport<C>, config: SessionConfig) -> Self {
        Self { transport, config }
    }

    /// Dispatches `operation` to [`check`](Self::check),
    /// [`solve`](Self::solve), or [`generate`](Self::generate).
    ///
    /// # Errors
    ///
    /// Returns whatever the dispatched operation returns.
    pub fn run(&mut self, operation: Operation) -> Result<Outcome, SessionError> {
        match operation {
            Operation::Check(board) => self.check(&board).map(Outcome::Verdict),
            Operation::Solve(board) => self.solve(&board).map(Outcome::Board),
            Operation::Generate(difficulty) => self.generate(difficulty).map(Outcome::Board),
        }
    }

    /// Asks the peer whether `board` is correctly solved.
    ///
    /// # Errors
    ///
    /// A timeout is [`SessionError::TransportTimeout`], never `Ok(false)`.
    pub fn check(&mut self, board: &Board) -> Result<bool, SessionError> {
        self.begin(Command::Check)?;
        CellStream::sending(board).run(self.transport, self.config.data_timeout)?;

        await_marker(
            self.transport,
            &[Marker::Done],
            None,
            Phase::AwaitingDone,
        )?;
        let deadline = self.deadline();
        let text = read_data(self.transport, deadline, Phase::Verdict)?;
        let verdict = decode_verdict(&text)?;
        debug!(verdict, "check finished");
        Ok(verdict)
    }

    /// Asks the peer to solve `board` and returns the solution.
    ///
    /// # Errors
    ///
    /// [`SessionError::Unsolvable`] if the peer replies `-`; transport and
    /// decode failures otherwise.  No partial board is ever returned.
    pub fn solve(&mut self, board: &Board) -> Result<Board, SessionError> {
        self.begin(Command::Solve)?;
        CellStream::sending(board).run(self.transport, self.config.data_timeout)?;
        self.receive_board(SessionError::Unsolvable)
    }

    /// Asks the peer for a new puzzle of the given difficulty.
    ///
    /// # Errors
    ///
    /// [`SessionError::Ungeneratable`] if the peer replies `-`; transport and
    /// decode failures otherwise.
    pub fn generate(&mut self, difficulty: Difficulty) -> Result<Board, SessionError> {
        self.begin(Command::Generate)?;
        let timeout = self.config.data_timeout;
        await_marker(self.transport, &[Marker::Ack], Some(timeout), Phase::Parameter)?;
        self.transport.send_line(&encode_difficulty(difficulty))?;
        debug!(%difficulty, "difficulty sent");
        self.receive_board(SessionError::Ungeneratable)
    }

    fn deadline(&self) -> Deadline {
        Deadline::after(self.config.data_timeout)
    }

    fn begin(&mut self, command: Command) -> Result<(), SessionError> {
        if !self.config.command_delay.is_zero() {
            thread::sleep(self.config.command_delay);
        }
        debug!(command = command.as_line(), "sending command");
        self.transport.send_line(command.as_line())?;
        Ok(())
    }

    /// Wait for `D`, stream the board in, check the trailer.
    fn receive_board(&mut self, on_failed: SessionError) -> Result<Board, SessionError> {
        let marker = await_marker(
            self.transport,
            &[Marker::Done, Marker::Failed],
            None,
            Phase::AwaitingDone,
        )?;
        if marker == Marker::Failed {
            warn!(error = %on_failed, "peer refused the request");
            return Err(on_failed);
        }

        let board = CellStream::receiving().run(self.transport, self.config.data_timeout)?;
        self.expect_trailer()?;
        debug!(filled = board.filled_count(), "board received");
        Ok(board)
    }

    /// The peer sends `E` in answer to one more `A`.
    fn expect_trailer(&mut self) -> Result<(), SessionError> {
        self.transport.send_line(Marker::Ack.as_line())?;
        let deadline = self.deadline();
        let received = match self.transport.read_line(deadline)? {
            ReadOutcome::Line(line) if line.as_bytes() == Marker::End.as_line().as_bytes() => {
                return Ok(())
            }
            ReadOutcome::Line(line) => line.text().into_owned(),
            ReadOutcome::Timeout => {
                return Err(SessionError::TransportTimeout {
                    phase: Phase::Trailer,
                })
            }
            ReadOutcome::Closed => {
                warn!("channel closed before end marker");
                return Err(SessionError::UnexpectedTrailer {
                    received: String::new(),
                });
            }
        };

        warn!(%received, "bad end marker, resetting peer");
        if let Err(e) = self.transport.send_line(RESET_LINE) {
            warn!(error = %e, "failed to send reset line");
        }
        Err(SessionError::UnexpectedTrailer { received })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
