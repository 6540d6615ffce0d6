//! The byte-level seam between the protocol and whatever carries the bytes.
//!
//! # Why a trait? (for beginners)
//!
//! The protocol was designed for a serial cable, but nothing in it depends on
//! serial hardware: it only needs to ask "is there a byte for me right now?"
//! and to write a line of text.  Keeping that behind the [`Channel`] trait lets
//! the application crate plug in a TCP stream or a child process, and lets the
//! tests plug in a scripted peer, without changing a single line of the
//! session code.
//!
//! # Polling, not blocking
//!
//! [`Channel::poll_byte`] must return promptly.  The line transport calls it in
//! a spin loop and checks its own deadline between calls; a channel that
//! blocked inside `poll_byte` would make read deadlines meaningless.

use std::io;

/// Result of asking a channel for one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// A byte was available and has been consumed.
    Byte(u8),
    /// Nothing is available right now; try again later.
    Empty,
    /// The stream has ended and no byte will ever arrive again.
    Closed,
}

/// A half-duplex, unframed byte stream to the peer.
///
/// Only the session currently on the call stack may read from or write to the
/// channel; the [`crate::protocol::LineTransport`] enforces that by holding it
/// mutably.
#[cfg_attr(test, mockall::automock)]
pub trait Channel {
    /// Takes the next byte if one is available, without blocking for long.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the underlying stream failed.
    fn poll_byte(&mut self) -> io::Result<Readiness>;

    /// Writes `line` followed by the line terminator and flushes it.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the write or flush failed.
    fn write_line(&mut self, line: &str) -> io::Result<()>;
}

impl<C: Channel + ?Sized> Channel for &mut C {
    fn poll_byte(&mut self) -> io::Result<Readiness> {
        (**self).poll_byte()
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        (**self).write_line(line)
    }
}

impl<C: Channel + ?Sized> Channel for Box<C> {
    fn poll_byte(&mut self) -> io::Result<Readiness> {
        (**self).poll_byte()
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        (**self).write_line(line)
    }
}
