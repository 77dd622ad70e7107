//! Demo glue, not part of the core's public contract (see spec §1 "Out of
//! scope"): wires `relcore::Registry` to a real `UdpSocket` and an
//! `nix::poll`-driven loop, the way the teacher repo's own `bin/server.rs`
//! wires a `TcpStream` to a tun device.
//!
//! Accepts a single peer, prints every byte it reliably receives to
//! stdout, and has nothing of its own to send — so it signals its local
//! EOF immediately and tears down once the peer's stream finishes.

use std::io::{self, Write};
use std::net::UdpSocket;
use std::os::fd::AsRawFd;
use std::time::Duration;

use nix::poll::{poll, PollFd, PollFlags};

use relcore::io::{AppSink, AppSource, DatagramSink, ReadOutcome};
use relcore::{Config, ConnId, Registry};

struct UdpSink<'a> {
    socket: &'a UdpSocket,
}

impl DatagramSink for UdpSink<'_> {
    fn send_datagram(&mut self, bytes: &[u8]) -> bool {
        self.socket.send(bytes).is_ok()
    }
}

/// The server has nothing to send, so it signals end-of-stream on its
/// first (and only) read.
struct NothingToSend;

impl AppSource for NothingToSend {
    fn read(&mut self, _buf: &mut [u8]) -> ReadOutcome {
        ReadOutcome::Eof
    }
}

struct StdoutSink;

impl AppSink for StdoutSink {
    fn free_space(&self) -> usize {
        usize::MAX
    }

    fn write(&mut self, bytes: &[u8]) {
        let _ = io::stdout().write_all(bytes);
        let _ = io::stdout().flush();
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let bind_addr = std::env::args().nth(1).unwrap_or_else(|| "127.0.0.1:9090".to_string());
    let socket = UdpSocket::bind(&bind_addr).map_err(relcore::Error::Io)?;
    println!(">>> listening on {bind_addr}, waiting for a peer...");

    let mut buf = [0u8; 1500];
    let (n, peer) = socket.recv_from(&mut buf).map_err(relcore::Error::Io)?;
    socket.connect(peer).map_err(relcore::Error::Io)?;
    println!(">>> accepted connection from {peer}");

    let config = Config::new(8, Duration::from_millis(500))?;
    let mut registry: Registry<UdpSink> = Registry::new();
    let id: ConnId = registry.create(&config, UdpSink { socket: &socket });

    let mut source = NothingToSend;
    let mut sink = StdoutSink;

    registry.on_packet(id, &buf[..n], relcore::io::now_ms(), &mut source, &mut sink)?;
    registry.on_app_readable(id, relcore::io::now_ms(), &mut source)?;

    let fd = socket.as_raw_fd();
    while !registry.is_empty() {
        registry.on_tick(relcore::io::now_ms());

        let mut fds = [PollFd::new(fd, PollFlags::POLLIN)];
        if poll(&mut fds, 50)? == 0 {
            continue;
        }

        let n = match socket.recv(&mut buf) {
            Ok(n) => n,
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => continue,
            Err(e) => return Err(relcore::Error::Io(e).into()),
        };
        registry.on_packet(id, &buf[..n], relcore::io::now_ms(), &mut source, &mut sink)?;
    }

    println!(">>> connection closed");
    Ok(())
}
