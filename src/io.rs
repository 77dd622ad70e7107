//! External interface adapters (spec §6). The core consumes its
//! collaborators — datagram socket I/O, the application-layer pipes, and the
//! checksum primitive — through these narrow traits rather than owning them.

/// Outcome of a single `AppSource::read` call, the Rust rendering of spec
/// §6's "n>0 bytes read, 0 if no data available now, or EOF sentinel".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// `n` bytes were read into the caller's buffer, `1 <= n <= buf.len()`.
    Data(usize),
    /// No data is available right now; the caller should stop and wait to
    /// be re-triggered.
    Pending,
    /// The application source has signalled end-of-stream.
    Eof,
}

/// Best-effort datagram transmission. `false` signals a transient failure,
/// treated as a drop — never escalated (spec §6, §7).
pub trait DatagramSink {
    fn send_datagram(&mut self, bytes: &[u8]) -> bool;
}

/// The application-layer input pipe (e.g. stdin, or a write-half socket
/// buffer) data is read from before packetisation.
pub trait AppSource {
    fn read(&mut self, buf: &mut [u8]) -> ReadOutcome;
}

/// The application-layer output pipe (e.g. stdout, or a read-half socket
/// buffer) reassembled bytes are delivered to.
pub trait AppSink {
    /// Current free bytes in the sink.
    fn free_space(&self) -> usize;
    /// Writes `bytes` to the sink. Callers guarantee `bytes.len() <= free_space()`.
    fn write(&mut self, bytes: &[u8]);
}

/// The Internet-checksum primitive. A default implementation,
/// `wire::InternetChecksum`, ships in this crate (see `wire` module docs for
/// why that one is bundled rather than injected).
pub trait Checksum {
    fn checksum(&self, bytes: &[u8]) -> u16;
}

/// Monotonic-ish wall-clock milliseconds (spec §6). Exposed as a free
/// function rather than a trait: event handlers take `now_ms` as an
/// explicit parameter so tests can drive it directly, and production
/// callers source it from here.
pub fn now_ms() -> u64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static START: OnceLock<Instant> = OnceLock::new();
    let start = *START.get_or_init(Instant::now);
    start.elapsed().as_millis() as u64
}
