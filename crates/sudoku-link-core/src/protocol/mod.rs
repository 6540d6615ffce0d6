//! Protocol module: the line transport, the grid codec, and the solver
//! session state machines.

pub mod channel;
pub mod codec;
pub mod messages;
pub mod mock;
pub mod session;
pub mod transport;

pub use channel::{Channel, Readiness};
pub use codec::{decode_cell, decode_verdict, encode_cell, CodecError};
pub use messages::{Command, Marker};
pub use session::{Operation, Outcome, Phase, SessionConfig, SessionError, SolverSession};
pub use transport::{Deadline, Line, LineTransport, ReadOutcome};
