//! Framed line transport: turns an unframed byte stream into text lines.
//!
//! # Framing rules
//!
//! - `\r`, `\n`, and NUL all end a line.  They are never part of the returned
//!   content.
//! - A `\n` that arrives straight after a line ended by `\r` is swallowed, so a
//!   CRLF pair produces one line rather than a line and an empty line.
//! - A line longer than `capacity - 1` bytes is cut at that length; the rest
//!   arrives as the next line.
//! - If the deadline passes first, [`ReadOutcome::Timeout`] is returned and the
//!   partial bytes are dropped.  If the channel closes first,
//!   [`ReadOutcome::Closed`] is returned and the partial bytes are dropped too.
//!   A caller therefore always gets either a complete line or a definitive
//!   failure, never half a line.

use std::borrow::Cow;
use std::io;
use std::time::{Duration, Instant};

use crate::protocol::channel::{Channel, Readiness};

/// Default line capacity, terminator slot included.
pub const DEFAULT_LINE_CAPACITY: usize = 32;

// ── Deadline ──────────────────────────────────────────────────────────────────

/// When a blocking read gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deadline {
    /// Wait for as long as it takes.
    Never,
    /// Give up once this instant has passed.
    At(Instant),
}

impl Deadline {
    /// A deadline `timeout` from now.  A zero timeout means [`Deadline::Never`].
    pub fn after(timeout: Duration) -> Self {
        if timeout.is_zero() {
            Deadline::Never
        } else {
            Deadline::At(Instant::now() + timeout)
        }
    }

    /// `true` once the deadline has passed.
    pub fn has_passed(&self) -> bool {
        match self {
            Deadline::Never => false,
            Deadline::At(at) => Instant::now() > *at,
        }
    }
}

// ── Read outcome ──────────────────────────────────────────────────────────────

/// One received line, borrowed from the transport's buffer.
///
/// It is only valid until the next call to [`LineTransport::read_line`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a>(&'a [u8]);

impl<'a> Line<'a> {
    pub fn as_bytes(&self) -> &'a [u8] {
        self.0
    }

    /// First byte of the line, the marker position.
    pub fn first_byte(&self) -> Option<u8> {
        self.0.first().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The line as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.0)
    }
}

/// Result of one [`LineTransport::read_line`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome<'a> {
    /// A complete line, terminator stripped.
    Line(Line<'a>),
    /// The deadline passed before a terminator arrived.
    Timeout,
    /// The channel ended before a terminator arrived.
    Closed,
}

// ── Transport ─────────────────────────────────────────────────────────────────

/// Reads lines from a [`Channel`] and writes lines back to it.
///
/// The transport owns the line buffer and reuses it for every read.
pub struct LineTransport<C> {
    channel: C,
    buffer: Vec<u8>,
    capacity: usize,
    /// The previous line was ended by `\r`; a leading `\n` belongs to it.
    pending_lf: bool,
}

impl<C: Channel> LineTransport<C> {
    /// Wraps `channel` with the default 32-byte line capacity.
    pub fn new(channel: C) -> Self {
        Self::with_capacity(channel, DEFAULT_LINE_CAPACITY)
    }

    /// Wraps `channel`; lines carry at most `capacity - 1` content bytes.
    ///
    /// A capacity below 2 is raised to 2 so every line can hold one byte.
    pub fn with_capacity(channel: C, capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Self {
            channel,
            buffer: Vec::with_capacity(capacity),
            capacity,
            pending_lf: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Reads one line, spinning on the channel until a terminator arrives,
    /// the line fills up, the deadline passes, or the channel closes.
    ///
    /// # Errors
    ///
    /// Returns the channel's I/O error; the partial line is dropped.
    pub fn read_line(&mut self, deadline: Deadline) -> io::Result<ReadOutcome<'_>> {
        self.buffer.clear();
        let limit = self.capacity - 1;

        while self.buffer.len() < limit {
            if deadline.has_passed() {
                self.buffer.clear();
                return Ok(ReadOutcome::Timeout);
            }
            match self.channel.poll_byte()? {
                Readiness::Empty => std::hint::spin_loop(),
                Readiness::Closed => {
                    self.buffer.clear();
                    self.pending_lf = false;
                    return Ok(ReadOutcome::Closed);
                }
                Readiness::Byte(b'\n') if self.pending_lf && self.buffer.is_empty() => {
                    self.pending_lf = false;
                }
                Readiness::Byte(byte @ (b'\r' | b'\n' | 0)) => {
                    self.pending_lf = byte == b'\r';
                    return Ok(ReadOutcome::Line(Line(&self.buffer)));
                }
                Readiness::Byte(byte) => {
                    self.pending_lf = false;
                    self.buffer.push(byte);
                }
            }
        }

        // Length limit reached without a terminator.
        Ok(ReadOutcome::Line(Line(&self.buffer)))
    }

    /// Writes one line to the peer.
    ///
    /// # Errors
    ///
    /// Returns the channel's I/O error.
    pub fn send_line(&mut self, line: &str) -> io::Result<()> {
        self.channel.write_line(line)
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn into_inner(self) -> C {
        self.channel
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
