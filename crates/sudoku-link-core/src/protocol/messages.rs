//! One-character sentinels of the solver line protocol.
//!
//! ```text
//! client → peer   C F G      begin check / solve / generate
//! peer → client   A          ready for the next cell or parameter
//! peer → client   D          request phase done, response follows
//! peer → client   -          peer failed (unsolvable / ungeneratable)
//! peer → client   E          end of response
//! client → peer   A          ready for the next response cell
//! client → peer   -1         reset after a corrupted response
//! ```

// ── Line terminator ───────────────────────────────────────────────────────────

/// Appended to every line the client writes.
pub const LINE_TERMINATOR: &str = "\r\n";

/// Line the client sends to make the peer drop back to its idle state.
pub const RESET_LINE: &str = "-1";

// ── Client commands ───────────────────────────────────────────────────────────

/// Command byte that opens a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    Check = b'C',
    Solve = b'F',
    Generate = b'G',
}

impl Command {
    /// The command as the text of one line.
    pub fn as_line(self) -> &'static str {
        match self {
            Command::Check => "C",
            Command::Solve => "F",
            Command::Generate => "G",
        }
    }
}

impl TryFrom<u8> for Command {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            b'C' => Ok(Command::Check),
            b'F' => Ok(Command::Solve),
            b'G' => Ok(Command::Generate),
            _ => Err(()),
        }
    }
}

// ── Markers ───────────────────────────────────────────────────────────────────

/// Marker characters recognised as the first byte of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Marker {
    /// Acknowledge: the sender is ready for the next value.
    Ack = b'A',
    /// Done: the request phase is over and a response follows.
    Done = b'D',
    /// The peer could not solve or generate a board.
    Failed = b'-',
    /// End of a streamed board.
    End = b'E',
}

impl Marker {
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// The marker as the text of one line.
    pub fn as_line(self) -> &'static str {
        match self {
            Marker::Ack => "A",
            Marker::Done => "D",
            Marker::Failed => "-",
            Marker::End => "E",
        }
    }
}

impl TryFrom<u8> for Marker {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            b'A' => Ok(Marker::Ack),
            b'D' => Ok(Marker::Done),
            b'-' => Ok(Marker::Failed),
            b'E' => Ok(Marker::End),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_bytes_match_wire_letters() {
        assert_eq!(Command::Check as u8, b'C');
        assert_eq!(Command::Solve as u8, b'F');
        assert_eq!(Command::Generate as u8, b'G');
        assert_eq!(Command::Solve.as_line(), "F");
    }

    #[test]
    fn test_command_try_from_rejects_unknown_byte() {
        assert_eq!(Command::try_from(b'G'), Ok(Command::Generate));
        assert!(Command::try_from(b'X').is_err());
    }

    #[test]
    fn test_marker_try_from_covers_all_markers() {
        for marker in [Marker::Ack, Marker::Done, Marker::Failed, Marker::End] {
            assert_eq!(Marker::try_from(marker.as_byte()), Ok(marker));
            assert_eq!(marker.as_line().as_bytes(), [marker.as_byte()]);
        }
        assert!(Marker::try_from(b'Z').is_err());
    }
}
