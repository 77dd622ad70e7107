use crate::registry::ConnId;

/// Errors raised at the construction/configuration boundary of the crate,
/// plus the demo binaries' socket I/O.
///
/// The wire-level protocol itself never raises an error upward (see spec
/// §7): corrupt packets, out-of-window data and similar conditions are
/// handled by silent drop plus a log line. `Error` exists only for the
/// surfaces a caller can get wrong before the protocol engine even runs, or
/// for the real I/O the demo binaries perform around it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("window size must be greater than zero")]
    InvalidWindow,

    #[error("connection {0:?} not found in registry")]
    UnknownConnection(ConnId),

    #[error("demo I/O error: {0}")]
    Io(#[from] std::io::Error),
}
