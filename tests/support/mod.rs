//! Fakes for exercising `relcore`'s public API from outside the crate.
//! Duplicates the shape of `src/test_support.rs` (unreachable here, since
//! that module is `#[cfg(test)]`-gated inside the library itself).

use std::collections::VecDeque;

use relcore::io::{AppSink, AppSource, DatagramSink, ReadOutcome};

#[derive(Debug, Default)]
pub struct FakeDatagramSink {
    pub sent: Vec<Vec<u8>>,
}

impl FakeDatagramSink {
    pub fn new() -> Self {
        FakeDatagramSink { sent: Vec::new() }
    }
}

impl DatagramSink for FakeDatagramSink {
    fn send_datagram(&mut self, bytes: &[u8]) -> bool {
        self.sent.push(bytes.to_vec());
        true
    }
}

#[derive(Debug)]
pub struct FakeAppSource {
    chunks: VecDeque<Vec<u8>>,
    emit_eof: bool,
}

impl FakeAppSource {
    pub fn new(chunks: Vec<Vec<u8>>) -> Self {
        FakeAppSource {
            chunks: chunks.into(),
            emit_eof: false,
        }
    }

    pub fn with_eof(chunks: Vec<Vec<u8>>) -> Self {
        FakeAppSource {
            chunks: chunks.into(),
            emit_eof: true,
        }
    }
}

impl AppSource for FakeAppSource {
    fn read(&mut self, buf: &mut [u8]) -> ReadOutcome {
        match self.chunks.pop_front() {
            Some(chunk) => {
                buf[..chunk.len()].copy_from_slice(&chunk);
                ReadOutcome::Data(chunk.len())
            }
            None if self.emit_eof => ReadOutcome::Eof,
            None => ReadOutcome::Pending,
        }
    }
}

#[derive(Debug)]
pub struct FakeAppSink {
    pub written: Vec<u8>,
    pub free: usize,
}

impl FakeAppSink {
    pub fn new(free: usize) -> Self {
        FakeAppSink {
            written: Vec::new(),
            free,
        }
    }
}

impl AppSink for FakeAppSink {
    fn free_space(&self) -> usize {
        self.free
    }

    fn write(&mut self, bytes: &[u8]) {
        self.written.extend_from_slice(bytes);
    }
}
