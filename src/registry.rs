//! Connection registry (spec §4.4–§4.8 "Connection registry", §9 design
//! note): an explicit, owned table replacing the original's intrusive
//! doubly-linked list. Entries are removed exactly once teardown's
//! four-condition test (spec §3 "Lifecycle") holds.

use std::collections::HashMap;

use crate::conn::Connection;
use crate::config::Config;
use crate::error::Error;
use crate::io::{AppSink, AppSource, DatagramSink};
use crate::wire::InternetChecksum;

/// Opaque handle identifying a connection in a `Registry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnId(u64);

struct Entry<S> {
    conn: Connection,
    sink: S,
}

/// Owns every live `Connection`, keyed by `ConnId`, plus the per-connection
/// `DatagramSink` the timer needs to drive retransmission (spec §4.8). The
/// checksum primitive is shared across all connections since the Internet
/// checksum algorithm carries no per-connection state.
pub struct Registry<S> {
    entries: HashMap<ConnId, Entry<S>>,
    next_id: u64,
    checksum: InternetChecksum,
}

impl<S: DatagramSink> Registry<S> {
    pub fn new() -> Self {
        Registry {
            entries: HashMap::new(),
            next_id: 1,
            checksum: InternetChecksum,
        }
    }

    pub fn create(&mut self, config: &Config, sink: S) -> ConnId {
        let id = ConnId(self.next_id);
        self.next_id += 1;
        self.entries.insert(
            id,
            Entry {
                conn: Connection::new(config),
                sink,
            },
        );
        id
    }

    pub fn is_done(&self, id: ConnId) -> bool {
        self.entries.get(&id).map_or(true, |e| e.conn.is_done())
    }

    fn get_mut(&mut self, id: ConnId) -> Result<&mut Entry<S>, Error> {
        self.entries.get_mut(&id).ok_or(Error::UnknownConnection(id))
    }

    /// Removes `id` if its connection has satisfied all four teardown
    /// conditions (spec §4.7).
    fn reap(&mut self, id: ConnId) {
        if self.entries.get(&id).is_some_and(|e| e.conn.is_done()) {
            self.entries.remove(&id);
        }
    }

    pub fn on_packet<R: AppSource, W: AppSink>(
        &mut self,
        id: ConnId,
        bytes: &[u8],
        now_ms: u64,
        source: &mut R,
        app_sink: &mut W,
    ) -> Result<(), Error> {
        let checksum = self.checksum;
        let entry = self.get_mut(id)?;
        entry
            .conn
            .on_packet(bytes, now_ms, &checksum, &mut entry.sink, source, app_sink);
        self.reap(id);
        Ok(())
    }

    pub fn on_app_readable<R: AppSource>(
        &mut self,
        id: ConnId,
        now_ms: u64,
        source: &mut R,
    ) -> Result<(), Error> {
        let checksum = self.checksum;
        let entry = self.get_mut(id)?;
        entry
            .conn
            .on_app_readable(now_ms, &checksum, &mut entry.sink, source);
        self.reap(id);
        Ok(())
    }

    pub fn on_app_writable<W: AppSink>(&mut self, id: ConnId, app_sink: &mut W) -> Result<(), Error> {
        let checksum = self.checksum;
        let entry = self.get_mut(id)?;
        entry.conn.on_app_writable(&checksum, &mut entry.sink, app_sink);
        self.reap(id);
        Ok(())
    }

    /// Walks every active connection and retransmits due entries (spec
    /// §4.8). Adequate at small fan-out, per spec §9's own design note.
    pub fn on_tick(&mut self, now_ms: u64) {
        let ticked: Vec<ConnId> = self
            .entries
            .iter_mut()
            .map(|(id, entry)| {
                entry.conn.on_tick(now_ms, &mut entry.sink);
                *id
            })
            .collect();

        for id in ticked {
            self.reap(id);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: DatagramSink> Default for Registry<S> {
    fn default() -> Self {
        Self::new()
    }
}
