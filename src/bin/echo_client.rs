//! Demo glue (see `echo_server.rs` for the shape this mirrors). Connects to
//! an `echo-server`, reliably streams a message to it, and prints whatever
//! comes back.

use std::env;
use std::io;
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

/// Feeds a fixed message to the connection in window-sized chunks, then
/// signals end-of-stream.
struct MessageSource {
    remaining: Vec<u8>,
    eof_sent: bool,
}

impl MessageSource {
    fn new(message: Vec<u8>) -> Self {
        MessageSource {
            remaining: message,
            eof_sent: false,
        }
    }
}

impl AppSource for MessageSource {
    fn read(&mut self, buf: &mut [u8]) -> ReadOutcome {
        if self.remaining.is_empty() {
            return if self.eof_sent {
                ReadOutcome::Pending
            } else {
                self.eof_sent = true;
                ReadOutcome::Eof
            };
        }

        let n = self.remaining.len().min(buf.len());
        let chunk: Vec<u8> = self.remaining.drain(..n).collect();
        buf[..n].copy_from_slice(&chunk);
        ReadOutcome::Data(n)
    }
}

struct StdoutSink;

impl AppSink for StdoutSink {
    fn free_space(&self) -> usize {
        usize::MAX
    }

    fn write(&mut self, bytes: &[u8]) {
        use std::io::Write;
        let _ = io::stdout().write_all(bytes);
        let _ = io::stdout().flush();
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let server_addr = args.next().unwrap_or_else(|| "127.0.0.1:9090".to_string());
    let message = args
        .next()
        .unwrap_or_else(|| "hello from relcore".to_string())
        .into_bytes();

    let socket = UdpSocket::bind("0.0.0.0:0").map_err(relcore::Error::Io)?;
    socket.connect(&server_addr).map_err(relcore::Error::Io)?;
    println!(">>> connected to {server_addr}");

    let config = Config::new(8, Duration::from_millis(500))?;
    let mut registry: Registry<UdpSink> = Registry::new();
    let id: ConnId = registry.create(&config, UdpSink { socket: &socket });

    let mut source = MessageSource::new(message);
    let mut sink = StdoutSink;

    registry.on_app_readable(id, relcore::io::now_ms(), &mut source)?;

    let fd = socket.as_raw_fd();
    let mut buf = [0u8; 1500];
    while !registry.is_empty() {
        registry.on_tick(relcore::io::now_ms());

        let mut fds = [PollFd::new(fd, PollFlags::POLLIN)];
        if poll(&mut fds, 50)? == 0 {
            registry.on_app_readable(id, relcore::io::now_ms(), &mut source)?;
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
