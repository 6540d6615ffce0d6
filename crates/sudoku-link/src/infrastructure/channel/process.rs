//! Child-process channel: the solver runs as a subprocess and speaks the
//! protocol over its standard streams.
//!
//! # Reader thread (for beginners)
//!
//! `ChildStdout` has no non-blocking read in the standard library.  A single
//! background thread therefore does the blocking reads and forwards each chunk
//! through an `mpsc` channel.  `poll_byte` then only has to call
//! `recv_timeout`, which returns after at most one poll interval.  When the
//! child exits, the thread's sender is dropped and the receiver reports
//! `Disconnected`, which becomes [`Readiness::Closed`].
//!
//! The thread is never joined.  A solver started through a wrapper such as
//! `sh -c` can leave a grandchild holding stdout open after the child is
//! killed, and the thread only ends once that pipe closes.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use sudoku_link_core::protocol::messages::LINE_TERMINATOR;
use sudoku_link_core::protocol::{Channel, Readiness};

const READ_CHUNK: usize = 256;

/// A [`Channel`] to a solver child process.
///
/// Dropping the channel kills the child if it is still running.
pub struct ProcessChannel {
    child: Child,
    stdin: ChildStdin,
    chunks: Receiver<Vec<u8>>,
    pending: VecDeque<u8>,
    poll_interval: Duration,
}

impl ProcessChannel {
    /// Starts `program` with `args`.  Its stderr is inherited.
    ///
    /// # Errors
    ///
    /// Returns the spawn error, or `BrokenPipe` if the child's pipes are
    /// missing.
    pub fn spawn(program: &str, args: &[String], poll_interval: Duration) -> io::Result<Self> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;

        let missing = || io::Error::new(io::ErrorKind::BrokenPipe, "child pipe not captured");
        let stdin = child.stdin.take().ok_or_else(missing)?;
        let mut stdout = child.stdout.take().ok_or_else(missing)?;

        let (tx, chunks) = mpsc::channel();
        thread::Builder::new()
            .name("solver-stdout".to_string())
            .spawn(move || {
                let mut buf = [0u8; READ_CHUNK];
                loop {
                    match stdout.read(&mut buf) {
                        Ok(0) => break,
                        Ok(n) => {
                            if tx.send(buf[..n].to_vec()).is_err() {
                                break;
                            }
                        }
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(e) => {
                            warn!(error = %e, "solver stdout read failed");
                            break;
                        }
                    }
                }
                debug!("solver stdout closed");
            })?;

        debug!(program, pid = child.id(), "solver process started");
        Ok(Self {
            child,
            stdin,
            chunks,
            pending: VecDeque::with_capacity(READ_CHUNK),
            poll_interval: poll_interval.max(Duration::from_millis(1)),
        })
    }

    /// The child's process id.
    pub fn id(&self) -> u32 {
        self.child.id()
    }
}

impl Channel for ProcessChannel {
    fn poll_byte(&mut self) -> io::Result<Readiness> {
        if let Some(byte) = self.pending.pop_front() {
            return Ok(Readiness::Byte(byte));
        }
        match self.chunks.recv_timeout(self.poll_interval) {
            Ok(chunk) => {
                self.pending.extend(chunk);
                Ok(self
                    .pending
                    .pop_front()
                    .map_or(Readiness::Empty, Readiness::Byte))
            }
            Err(RecvTimeoutError::Timeout) => Ok(Readiness::Empty),
            Err(RecvTimeoutError::Disconnected) => Ok(Readiness::Closed),
        }
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.stdin.write_all(line.as_bytes())?;
        self.stdin.write_all(LINE_TERMINATOR.as_bytes())?;
        self.stdin.flush()
    }
}

impl Drop for ProcessChannel {
    fn drop(&mut self) {
        match self.child.try_wait() {
            Ok(Some(_)) => {}
            _ => {
                if let Err(e) = self.child.kill() {
                    debug!(error = %e, "solver process already gone");
                }
                let _ = self.child.wait();
            }
        }
    }
}
