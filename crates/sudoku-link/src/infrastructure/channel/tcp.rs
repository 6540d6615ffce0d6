//! TCP channel to a solver listening on a socket.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use sudoku_link_core::protocol::messages::LINE_TERMINATOR;
use sudoku_link_core::protocol::{Channel, Readiness};

const READ_CHUNK: usize = 256;

/// A [`Channel`] over a connected [`TcpStream`].
///
/// The socket read timeout is the poll interval: `poll_byte` blocks at most
/// that long before reporting [`Readiness::Empty`].
pub struct TcpChannel {
    stream: TcpStream,
    pending: VecDeque<u8>,
    closed: bool,
}

impl TcpChannel {
    /// Connects to `address` (`host:port`).
    ///
    /// # Errors
    ///
    /// Returns the connect or socket-option error.
    pub fn connect<A: ToSocketAddrs>(address: A, poll_interval: Duration) -> io::Result<Self> {
        let stream = TcpStream::connect(address)?;
        Self::from_stream(stream, poll_interval)
    }

    /// Wraps an already connected stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket options cannot be set.
    pub fn from_stream(stream: TcpStream, poll_interval: Duration) -> io::Result<Self> {
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(poll_interval.max(Duration::from_millis(1))))?;
        if let Ok(peer) = stream.peer_addr() {
            debug!(%peer, "tcp channel ready");
        }
        Ok(Self {
            stream,
            pending: VecDeque::with_capacity(READ_CHUNK),
            closed: false,
        })
    }
}

impl Channel for TcpChannel {
    fn poll_byte(&mut self) -> io::Result<Readiness> {
        if let Some(byte) = self.pending.pop_front() {
            return Ok(Readiness::Byte(byte));
        }
        if self.closed {
            return Ok(Readiness::Closed);
        }

        let mut chunk = [0u8; READ_CHUNK];
        match self.stream.read(&mut chunk) {
            Ok(0) => {
                debug!("tcp peer closed the connection");
                self.closed = true;
                Ok(Readiness::Closed)
            }
            Ok(n) => {
                self.pending.extend(&chunk[1..n]);
                Ok(Readiness::Byte(chunk[0]))
            }
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(Readiness::Empty)
            }
            Err(e) => Err(e),
        }
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut bytes = Vec::with_capacity(line.len() + LINE_TERMINATOR.len());
        bytes.extend_from_slice(line.as_bytes());
        bytes.extend_from_slice(LINE_TERMINATOR.as_bytes());
        self.stream.write_all(&bytes)?;
        self.stream.flush()
    }
}
