//! Concrete byte channels to the solver.
//!
//! The protocol was built for a serial line, but any ordered byte stream will
//! do.  Two are provided:
//!
//! - [`TcpChannel`](tcp::TcpChannel) connects to a solver listening on a TCP
//!   port.
//! - [`ProcessChannel`](process::ProcessChannel) starts the solver as a child
//!   process and talks to it over stdin and stdout.
//!
//! Both poll with a short blocking wait (the configured poll interval), so the
//! line transport's spin loop does not burn a whole core while the peer thinks.

pub mod process;
pub mod tcp;

use std::io;

use thiserror::Error;
use tracing::info;

use sudoku_link_core::protocol::Channel;

use crate::infrastructure::storage::config::{LinkConfig, TransportKind};

pub use process::ProcessChannel;
pub use tcp::TcpChannel;

/// Error type for opening a channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The TCP connection could not be established.
    #[error("could not connect to solver at {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },

    /// The solver process could not be started.
    #[error("could not start solver {program:?}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The process transport was selected without a command.
    #[error("no solver command configured")]
    MissingCommand,
}

/// Opens the channel described by `link`.
///
/// # Errors
///
/// Returns [`ChannelError`] if the connection or process cannot be set up.
pub fn open_channel(link: &LinkConfig) -> Result<Box<dyn Channel + Send>, ChannelError> {
    match link.transport {
        TransportKind::Tcp => {
            let channel = TcpChannel::connect(&link.address, link.poll_interval()).map_err(
                |source| ChannelError::Connect {
                    address: link.address.clone(),
                    source,
                },
            )?;
            info!(address = %link.address, "connected to solver");
            Ok(Box::new(channel))
        }
        TransportKind::Process => {
            let (program, args) = link
                .peer_command
                .split_first()
                .ok_or(ChannelError::MissingCommand)?;
            let channel = ProcessChannel::spawn(program, args, link.poll_interval()).map_err(
                |source| ChannelError::Spawn {
                    program: program.clone(),
                    source,
                },
            )?;
            info!(%program, "started solver process");
            Ok(Box::new(channel))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_process_channel_without_command_fails() {
        let link = LinkConfig {
            transport: TransportKind::Process,
            ..LinkConfig::default()
        };
        assert!(matches!(
            open_channel(&link),
            Err(ChannelError::MissingCommand)
        ));
    }

    #[test]
    fn test_open_tcp_channel_reports_address_on_failure() {
        // Port 1 on localhost is essentially never listening.
        let link = LinkConfig {
            address: "127.0.0.1:1".to_string(),
            ..LinkConfig::default()
        };
        match open_channel(&link) {
            Err(ChannelError::Connect { address, .. }) => assert_eq!(address, "127.0.0.1:1"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("nothing should listen on port 1"),
        }
    }
}
