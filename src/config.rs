use std::time::Duration;

use crate::error::Error;

/// Per-connection configuration, supplied at creation time (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of unacknowledged packets outstanding, symmetric on
    /// both the send and receive side.
    window: u16,
    /// Fixed retransmission timeout.
    timeout: Duration,
}

impl Config {
    pub fn new(window: u16, timeout: Duration) -> Result<Self, Error> {
        if window == 0 {
            return Err(Error::InvalidWindow);
        }

        Ok(Config { window, timeout })
    }

    pub fn window(&self) -> u16 {
        self.window
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

impl Default for Config {
    /// A window of 1 and a one-second timeout, mirroring the teacher's own
    /// `rto <- 1 second` default before any RTT sample exists.
    fn default() -> Self {
        Config {
            window: 1,
            timeout: Duration::from_millis(1000),
        }
    }
}
