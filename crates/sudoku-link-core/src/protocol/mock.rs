//! In-memory channels for exercising the protocol without a real peer.
//!
//! # Why two mocks?
//!
//! - [`ScriptedChannel`] replays a fixed byte script no matter what the client
//!   writes.  It is the right tool for malformed or truncated replies: the test
//!   decides every byte the client will see.
//! - [`SimulatedPeer`] plays the solver's side of the protocol.  It reacts to
//!   each line the client writes (an acknowledge for every cell, `D` once the
//!   board is in, one digit per client `A`), so a whole session runs against it
//!   exactly as it would against the real server.
//!
//! Both record every line the client wrote so tests can assert on the request
//! side of the exchange too.
//!
//! # Usage in tests
//!
//! ```rust
//! use sudoku_link_core::domain::board::{Board, Difficulty};
//! use sudoku_link_core::protocol::mock::SimulatedPeer;
//! use sudoku_link_core::protocol::{LineTransport, SessionConfig, SolverSession};
//!
//! let peer = SimulatedPeer::new().with_answer(Board::empty());
//! let mut transport = LineTransport::new(peer);
//! let board = SolverSession::new(&mut transport, SessionConfig::default())
//!     .generate(Difficulty::Easy)
//!     .unwrap();
//!
//! assert_eq!(board, Board::empty());
//! assert_eq!(transport.channel_mut().received_difficulty(), Some(Difficulty::Easy));
//! ```

use std::collections::VecDeque;
use std::io;

use crate::domain::board::{Board, CellIndex, Difficulty, CELL_COUNT};
use crate::protocol::channel::{Channel, Readiness};
use crate::protocol::codec::{decode_cell, decode_difficulty, encode_cell};
use crate::protocol::messages::{Command, Marker, LINE_TERMINATOR, RESET_LINE};

// ── ScriptedChannel ───────────────────────────────────────────────────────────

/// A channel that replays preloaded bytes and records what the client writes.
#[derive(Debug, Default)]
pub struct ScriptedChannel {
    inbound: VecDeque<u8>,
    /// Every line written by the client, terminator not included.
    pub written: Vec<String>,
    /// Report [`Readiness::Closed`] once the script is drained, instead of
    /// [`Readiness::Empty`] forever.
    pub close_when_drained: bool,
}

impl ScriptedChannel {
    /// A channel that yields `bytes` and then reports the stream closed.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            inbound: bytes.iter().copied().collect(),
            written: Vec::new(),
            close_when_drained: true,
        }
    }

    /// A channel that yields each line followed by `\r\n`, then closes.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut channel = Self::from_bytes(&[]);
        for line in lines {
            channel.push_line(line.as_ref());
        }
        channel
    }

    /// A channel that stays open and never produces a byte.
    pub fn silent() -> Self {
        Self::default()
    }

    /// Keeps the channel open after the script is drained.
    pub fn keep_open(mut self) -> Self {
        self.close_when_drained = false;
        self
    }

    /// Appends one line plus `\r\n` to the inbound script.
    pub fn push_line(&mut self, line: &str) {
        self.inbound.extend(line.bytes());
        self.inbound.extend(LINE_TERMINATOR.bytes());
    }

    /// Lines written by the client so far.
    pub fn sent(&self) -> &[String] {
        &self.written
    }

    /// Inbound bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.inbound.len()
    }
}

impl Channel for ScriptedChannel {
    fn poll_byte(&mut self) -> io::Result<Readiness> {
        Ok(match self.inbound.pop_front() {
            Some(byte) => Readiness::Byte(byte),
            None if self.close_when_drained => Readiness::Closed,
            None => Readiness::Empty,
        })
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.written.push(line.to_string());
        Ok(())
    }
}

// ── SimulatedPeer ─────────────────────────────────────────────────────────────

/// What the simulated solver does once it has the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerAnswer {
    /// Stream this board back (solve / generate).
    Board(Board),
    /// Reply `-` (unsolvable / ungeneratable).
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PeerState {
    Idle,
    ReceivingCells { command: Command, count: usize },
    AwaitingDifficulty,
    StreamingBoard { count: usize },
}

/// A reactive stand-in for the remote solver.
///
/// It follows the reference server's state machine:
///
/// ```text
/// Idle --C/F--> ReceivingCells --81 cells--> (C) D + verdict --> Idle
///                                           (F) D --> StreamingBoard
///                                           (F) -             --> Idle
/// Idle --G--> AwaitingDifficulty --n--> D --> StreamingBoard
/// StreamingBoard --A--> next digit ... --A after 81--> trailer --> Idle
/// StreamingBoard --anything else--> - --> Idle
/// ```
#[derive(Debug)]
pub struct SimulatedPeer {
    outbound: VecDeque<u8>,
    state: PeerState,
    verdict: bool,
    answer: PeerAnswer,
    trailer: String,
    mute: bool,
    noise: Option<String>,
    /// Every line written by the client, terminator not included.
    pub written: Vec<String>,
    received: Board,
    received_cells: usize,
    difficulty: Option<Difficulty>,
    resets: usize,
}

impl Default for SimulatedPeer {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedPeer {
    /// A peer that judges every board correct and answers with an empty board.
    pub fn new() -> Self {
        Self {
            outbound: VecDeque::new(),
            state: PeerState::Idle,
            verdict: true,
            answer: PeerAnswer::Board(Board::empty()),
            trailer: Marker::End.as_line().to_string(),
            mute: false,
            noise: None,
            written: Vec::new(),
            received: Board::empty(),
            received_cells: 0,
            difficulty: None,
            resets: 0,
        }
    }

    /// Verdict reported for check requests.
    pub fn with_verdict(mut self, correct: bool) -> Self {
        self.verdict = correct;
        self
    }

    /// Board streamed back for solve and generate requests.
    pub fn with_answer(mut self, board: Board) -> Self {
        self.answer = PeerAnswer::Board(board);
        self
    }

    /// Reply `-` instead of a board.
    pub fn failing(mut self) -> Self {
        self.answer = PeerAnswer::Fail;
        self
    }

    /// Replace the closing `E` with `trailer`.
    pub fn with_trailer(mut self, trailer: &str) -> Self {
        self.trailer = trailer.to_string();
        self
    }

    /// Never reply to anything.
    pub fn mute(mut self) -> Self {
        self.mute = true;
        self
    }

    /// Emit `line` before every marker the peer sends.
    pub fn with_noise(mut self, line: &str) -> Self {
        self.noise = Some(line.to_string());
        self
    }

    /// The board the client streamed in its last check or solve request.
    ///
    /// `None` until all 81 cells have arrived.
    pub fn received_board(&self) -> Option<Board> {
        (self.received_cells == CELL_COUNT).then_some(self.received)
    }

    /// The difficulty of the last generate request.
    pub fn received_difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    /// How many reset lines (`-1`) the client has sent.
    pub fn resets(&self) -> usize {
        self.resets
    }

    /// `true` when the peer is back in its idle state.
    pub fn is_idle(&self) -> bool {
        self.state == PeerState::Idle
    }

    fn queue(&mut self, line: &str) {
        self.outbound.extend(line.bytes());
        self.outbound.extend(LINE_TERMINATOR.bytes());
    }

    fn queue_marker(&mut self, marker: Marker) {
        if let Some(noise) = self.noise.clone() {
            self.queue(&noise);
        }
        self.queue(marker.as_line());
    }

    fn on_idle_line(&mut self, line: &str) {
        if line == RESET_LINE {
            self.resets += 1;
            return;
        }
        let Some(command) = line.bytes().next().and_then(|b| Command::try_from(b).ok()) else {
            return;
        };
        match command {
            Command::Check | Command::Solve => {
                self.received = Board::empty();
                self.received_cells = 0;
                self.state = PeerState::ReceivingCells { command, count: 0 };
            }
            Command::Generate => {
                self.difficulty = None;
                self.state = PeerState::AwaitingDifficulty;
            }
        }
        self.queue_marker(Marker::Ack);
    }

    fn on_cell_line(&mut self, command: Command, count: usize, line: &str) {
        if line == RESET_LINE {
            self.resets += 1;
            self.state = PeerState::Idle;
            return;
        }
        let value = decode_cell(line).unwrap_or(0);
        if let Some(index) = CellIndex::from_offset(count) {
            // decode_cell only yields 0..=9, which set always accepts
            let _ = self.received.set(index, value);
        }
        let count = count + 1;
        self.received_cells = count;

        if count < CELL_COUNT {
            self.state = PeerState::ReceivingCells { command, count };
            self.queue_marker(Marker::Ack);
            return;
        }

        self.state = PeerState::Idle;
        match (command, self.answer) {
            (Command::Check, _) => {
                self.queue_marker(Marker::Done);
                let verdict = if self.verdict { "True" } else { "False" };
                self.queue(verdict);
            }
            (_, PeerAnswer::Fail) => self.queue_marker(Marker::Failed),
            (_, PeerAnswer::Board(_)) => {
                self.queue_marker(Marker::Done);
                self.state = PeerState::StreamingBoard { count: 0 };
            }
        }
    }

    fn on_difficulty_line(&mut self, line: &str) {
        self.state = PeerState::Idle;
        if line == RESET_LINE {
            self.resets += 1;
            return;
        }
        self.difficulty = decode_difficulty(line).ok();
        match self.answer {
            PeerAnswer::Fail => self.queue_marker(Marker::Failed),
            PeerAnswer::Board(_) => {
                self.queue_marker(Marker::Done);
                self.state = PeerState::StreamingBoard { count: 0 };
            }
        }
    }

    fn on_stream_line(&mut self, count: usize, line: &str) {
        if line.as_bytes().first() != Some(&Marker::Ack.as_byte()) {
            if line == RESET_LINE {
                self.resets += 1;
            }
            self.state = PeerState::Idle;
            self.queue(Marker::Failed.as_line());
            return;
        }
        let PeerAnswer::Board(board) = self.answer else {
            self.state = PeerState::Idle;
            return;
        };
        if count == CELL_COUNT {
            let trailer = self.trailer.clone();
            self.queue(&trailer);
            self.state = PeerState::Idle;
            return;
        }
        let value = CellIndex::from_offset(count).map_or(0, |index| board.get(index));
        self.queue(&encode_cell(value));
        self.state = PeerState::StreamingBoard { count: count + 1 };
    }
}

impl Channel for SimulatedPeer {
    fn poll_byte(&mut self) -> io::Result<Readiness> {
        Ok(match self.outbound.pop_front() {
            Some(byte) => Readiness::Byte(byte),
            None => Readiness::Empty,
        })
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.written.push(line.to_string());
        if self.mute {
            return Ok(());
        }
        match self.state {
            PeerState::Idle => self.on_idle_line(line),
            PeerState::ReceivingCells { command, count } => {
                self.on_cell_line(command, count, line)
            }
            PeerState::AwaitingDifficulty => self.on_difficulty_line(line),
            PeerState::StreamingBoard { count } => self.on_stream_line(count, line),
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
