//! Connection state machine (spec §4.4–§4.8): sliding-window send/receive,
//! retransmission, reassembly/delivery with flow control, and teardown.

use crate::buffer::{RecBuffer, RecEntry, SendBuffer};
use crate::config::Config;
use crate::io::{AppSink, AppSource, Checksum, DatagramSink, ReadOutcome};
use crate::wire::{self, Packet, MAX_PAYLOAD};

/// Per-connection protocol state (spec §3 "Connection state").
#[derive(Debug, Clone)]
pub struct Connection {
    snd_una: u32,
    snd_nxt: u32,
    rcv_nxt: u32,
    wnd_size: u32,
    timeout_ms: u64,

    send_buffer: SendBuffer,
    rec_buffer: RecBuffer,

    read_eof_from_input: bool,
    read_eof_from_connection: bool,
    output_ready: bool,
}

impl Connection {
    /// Sequence numbers begin at 1 on both sides (spec §3 "Lifecycle").
    pub fn new(config: &Config) -> Self {
        Connection {
            snd_una: 1,
            snd_nxt: 1,
            rcv_nxt: 1,
            wnd_size: config.window() as u32,
            timeout_ms: config.timeout_ms(),
            send_buffer: SendBuffer::new(),
            rec_buffer: RecBuffer::new(),
            read_eof_from_input: false,
            read_eof_from_connection: false,
            // A fresh connection has nothing half-delivered, so output is
            // ready from birth (matches the original's `output_ready = 1`
            // at `rel_create`).
            output_ready: true,
        }
    }

    /// The four-condition teardown test (spec §3 "Lifecycle", §4.7).
    pub fn is_done(&self) -> bool {
        self.read_eof_from_connection
            && self.read_eof_from_input
            && self.send_buffer.is_empty()
            && self.rec_buffer.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn snd_una(&self) -> u32 {
        self.snd_una
    }
    #[cfg(test)]
    pub(crate) fn snd_nxt(&self) -> u32 {
        self.snd_nxt
    }
    #[cfg(test)]
    pub(crate) fn rcv_nxt(&self) -> u32 {
        self.rcv_nxt
    }
    #[cfg(test)]
    pub(crate) fn output_ready(&self) -> bool {
        self.output_ready
    }
    #[cfg(test)]
    pub(crate) fn send_buffer(&self) -> &SendBuffer {
        &self.send_buffer
    }
    #[cfg(test)]
    pub(crate) fn rec_buffer(&self) -> &RecBuffer {
        &self.rec_buffer
    }

    /// Invariant 1 of spec §8, exposed for tests: `snd_una <= snd_nxt` and
    /// the window is never over-extended.
    #[cfg(test)]
    pub(crate) fn check_send_invariants(&self) {
        assert!(self.snd_una <= self.snd_nxt);
        assert!(self.snd_nxt - self.snd_una <= self.wnd_size);
    }

    // ---- event: packet arrival (spec §4.4) ----

    pub fn on_packet<D, R, W>(
        &mut self,
        bytes: &[u8],
        now_ms: u64,
        checksum: &dyn Checksum,
        sink: &mut D,
        source: &mut R,
        app_sink: &mut W,
    ) where
        D: DatagramSink,
        R: AppSource,
        W: AppSink,
    {
        let Some(packet) = wire::codec::decode(bytes, checksum) else {
            log::debug!("dropping corrupt or malformed packet ({} bytes)", bytes.len());
            return;
        };

        match packet {
            Packet::Ack { ackno } => self.handle_ack(ackno, now_ms, checksum, sink, source),
            Packet::Data { seqno, payload } => {
                self.handle_data(seqno, false, payload, checksum, sink, app_sink)
            }
            Packet::Eof { seqno } => self.handle_data(seqno, true, Vec::new(), checksum, sink, app_sink),
        }
    }

    fn handle_ack<D, R>(
        &mut self,
        ackno: u32,
        now_ms: u64,
        checksum: &dyn Checksum,
        sink: &mut D,
        source: &mut R,
    ) where
        D: DatagramSink,
        R: AppSource,
    {
        // Clamp a runaway or malicious ackno to our own snd_nxt; this makes
        // duplicate ACKs idempotent and never errors (spec §4.4, §9).
        let clamped = self.snd_nxt.min(ackno);
        self.snd_una = self.snd_una.max(clamped);

        let removed = self.send_buffer.remove_acked(ackno);
        if removed > 0 {
            self.send_path(now_ms, checksum, sink, source);
        }
    }

    fn handle_data<D, W>(
        &mut self,
        seqno: u32,
        is_eof: bool,
        payload: Vec<u8>,
        checksum: &dyn Checksum,
        sink: &mut D,
        app_sink: &mut W,
    ) where
        D: DatagramSink,
        W: AppSink,
    {
        if seqno >= self.rcv_nxt + self.wnd_size {
            log::debug!("dropping out-of-window data packet seqno={seqno}");
            return;
        }

        if is_eof {
            self.read_eof_from_connection = true;
        }

        if seqno >= self.rcv_nxt && !self.rec_buffer.contains(seqno) {
            self.rec_buffer.insert(RecEntry::new(seqno, is_eof, payload));
        }

        if seqno == self.rcv_nxt {
            let mut nxt = self.rcv_nxt;
            for entry in self.rec_buffer.iter() {
                if entry.seqno == nxt {
                    nxt += 1;
                } else {
                    break;
                }
            }
            self.rcv_nxt = nxt;
            self.deliver(checksum, sink, app_sink);
        } else if self.output_ready {
            // Out-of-order arrival, or a duplicate below rcv_nxt: either way
            // the peer needs a fresh cumulative ACK (spec §4.4 step 5). But
            // not while a packet is still half-delivered to the app sink —
            // that would tell the peer bytes are absorbed that aren't.
            let ack = wire::codec::encode_ack(self.rcv_nxt, checksum);
            if !sink.send_datagram(&ack) {
                log::warn!("failed to send duplicate/out-of-order ack");
            }
        }
    }

    // ---- event: app source readable (spec §4.5) ----

    pub fn on_app_readable<D, R>(
        &mut self,
        now_ms: u64,
        checksum: &dyn Checksum,
        sink: &mut D,
        source: &mut R,
    ) where
        D: DatagramSink,
        R: AppSource,
    {
        self.send_path(now_ms, checksum, sink, source);
    }

    fn send_path<D, R>(&mut self, now_ms: u64, checksum: &dyn Checksum, sink: &mut D, source: &mut R)
    where
        D: DatagramSink,
        R: AppSource,
    {
        loop {
            let avail = self.wnd_size as i64 - (self.snd_nxt as i64 - self.snd_una as i64);
            if avail <= 0 || self.read_eof_from_input {
                return;
            }

            let mut buf = [0u8; MAX_PAYLOAD];
            match source.read(&mut buf) {
                ReadOutcome::Pending => return,
                ReadOutcome::Eof => {
                    self.read_eof_from_input = true;
                    self.emit_outbound(&[], now_ms, checksum, sink);
                    return;
                }
                ReadOutcome::Data(n) => {
                    self.emit_outbound(&buf[..n], now_ms, checksum, sink);
                }
            }
        }
    }

    fn emit_outbound<D: DatagramSink>(
        &mut self,
        payload: &[u8],
        now_ms: u64,
        checksum: &dyn Checksum,
        sink: &mut D,
    ) {
        let seqno = self.snd_nxt;
        self.snd_nxt += 1;

        let bytes = wire::codec::encode_data(seqno, payload, checksum);
        self.send_buffer.insert(seqno, bytes.clone(), now_ms);

        if !sink.send_datagram(&bytes) {
            log::warn!("send failed for seqno={seqno}, leaving it for the retransmit timer");
        }
    }

    // ---- event: app sink writable / has newly freed space (spec §4.6) ----

    pub fn on_app_writable<D, W>(&mut self, checksum: &dyn Checksum, sink: &mut D, app_sink: &mut W)
    where
        D: DatagramSink,
        W: AppSink,
    {
        self.deliver(checksum, sink, app_sink);
    }

    fn deliver<D, W>(&mut self, checksum: &dyn Checksum, sink: &mut D, app_sink: &mut W)
    where
        D: DatagramSink,
        W: AppSink,
    {
        loop {
            let in_order = matches!(self.rec_buffer.first(), Some(e) if e.seqno < self.rcv_nxt);
            if !in_order {
                return;
            }

            let free = app_sink.free_space();
            let remaining = self.rec_buffer.first().unwrap().remaining_len();

            if remaining <= free {
                // ACK first so the peer may advance its window before we
                // absorb the bytes (spec §4.6, Open Question in spec §9:
                // ordering is preserved as the original specified it).
                let ack = wire::codec::encode_ack(self.rcv_nxt, checksum);
                if !sink.send_datagram(&ack) {
                    log::warn!("failed to send delivery ack");
                }

                let bytes = self.rec_buffer.first().unwrap().remaining().to_vec();
                app_sink.write(&bytes);
                self.rec_buffer.remove_first();
                self.output_ready = true;
            } else if free > 0 {
                let entry = self.rec_buffer.first_mut().unwrap();
                let chunk = entry.remaining()[..free].to_vec();
                app_sink.write(&chunk);
                entry.advance(free);
                self.output_ready = false;
                return;
            } else {
                return;
            }
        }
    }

    // ---- event: timer tick (spec §4.8) ----

    pub fn on_tick<D: DatagramSink>(&mut self, now_ms: u64, sink: &mut D) {
        for entry in self.send_buffer.iter_mut() {
            if now_ms.saturating_sub(entry.last_retransmit_ms) >= self.timeout_ms {
                if !sink.send_datagram(&entry.bytes) {
                    log::warn!("retransmit failed for seqno={}", entry.seqno);
                }
                entry.last_retransmit_ms = now_ms;
            }
        }
    }
}
