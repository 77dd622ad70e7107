//! A reliable, in-order, byte-stream transport layered on an unreliable
//! datagram service: sliding-window send/receive, cumulative ACKs,
//! retransmission on timeout, end-of-stream signalling, and a
//! four-condition graceful teardown — a minimal TCP-like engine that runs
//! over anything that can move best-effort datagrams.
//!
//! The crate is deliberately narrow: it owns the protocol state machine
//! (`conn::Connection`) and its registry (`registry::Registry`), and
//! consumes everything else — the datagram socket, the application's
//! stdin/stdout-shaped pipes, the checksum primitive — through the traits
//! in `io`. Wiring those to a real `UdpSocket` and an event loop is demo
//! glue; see `src/bin/echo_server.rs` and `src/bin/echo_client.rs`.

pub mod buffer;
pub mod config;
pub mod conn;
pub mod error;
pub mod io;
pub mod registry;
pub mod wire;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use conn::Connection;
pub use error::Error;
pub use registry::{ConnId, Registry};
