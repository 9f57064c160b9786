//! # Ingestion Protocol Server
//!
//! An external process drives graph construction over a local stream
//! socket. One client is served at a time:
//!
//! ```text
//!  LISTENING ──accept──▶ CONNECTED ──EOF / D / error / timeout──▶ LISTENING
//!                 │
//!                 └─ graph reset + id table cleared before the first line
//! ```
//!
//! Malformed lines, unknown ids and duplicate vertices are logged and
//! skipped; they never end the connection.

pub mod protocol;
pub mod session;
pub mod server;

pub use protocol::{Command, LineBuffer, ProtocolError, Record, Side};
pub use session::{Session, Step};
pub use server::{AckSink, IngestOptions, IngestServer, SessionEnd, StdoutSink};
