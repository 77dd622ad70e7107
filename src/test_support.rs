//! In-memory stand-ins for the external collaborators of spec §6, used by
//! this crate's own unit tests.

use std::collections::VecDeque;

use crate::io::{AppSink, AppSource, DatagramSink, ReadOutcome};

#[derive(Debug, Default)]
pub(crate) struct FakeDatagramSink {
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
pub(crate) struct FakeAppSource {
    chunks: VecDeque<Vec<u8>>,
    emit_eof: bool,
}

impl FakeAppSource {
    /// Yields `chunks` in order, then `Pending` forever.
    pub fn new(chunks: Vec<Vec<u8>>) -> Self {
        FakeAppSource {
            chunks: chunks.into(),
            emit_eof: false,
        }
    }

    /// Yields `chunks` in order, then signals `Eof`.
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
pub(crate) struct FakeAppSink {
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
