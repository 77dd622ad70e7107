//! Retransmission buffer (spec §4.2): ordered by seqno ascending, holding
//! the verbatim encoded bytes of every unacknowledged outbound packet.

use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendEntry {
    pub seqno: u32,
    /// The encoded packet, kept verbatim so retransmission never re-derives it.
    pub bytes: Vec<u8>,
    pub last_retransmit_ms: u64,
}

#[derive(Debug, Clone, Default)]
pub struct SendBuffer {
    entries: VecDeque<SendEntry>,
}

impl SendBuffer {
    pub fn new() -> Self {
        SendBuffer {
            entries: VecDeque::new(),
        }
    }

    /// Packets are assigned strictly monotonic seqnos, so appending at the
    /// tail keeps the buffer ordered (spec §4.2).
    pub fn insert(&mut self, seqno: u32, bytes: Vec<u8>, now_ms: u64) {
        debug_assert!(self.entries.back().map_or(true, |e| e.seqno < seqno));
        self.entries.push_back(SendEntry {
            seqno,
            bytes,
            last_retransmit_ms: now_ms,
        });
    }

    pub fn first(&self) -> Option<&SendEntry> {
        self.entries.front()
    }

    pub fn remove_first(&mut self) -> Option<SendEntry> {
        self.entries.pop_front()
    }

    /// Removes all entries with `seqno < ackno`; returns the count removed.
    pub fn remove_acked(&mut self, ackno: u32) -> usize {
        let mut removed = 0;
        while let Some(front) = self.entries.front() {
            if front.seqno < ackno {
                self.entries.pop_front();
                removed += 1;
            } else {
                break;
            }
        }
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = &SendEntry> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SendEntry> {
        self.entries.iter_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The seqno set currently held, for invariant checks in tests.
    #[cfg(test)]
    pub fn seqnos(&self) -> Vec<u32> {
        self.entries.iter().map(|e| e.seqno).collect()
    }
}
