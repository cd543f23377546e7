//! Message channels between the four services.
//!
//! Each channel mirrors a FIFO pipe: reliable, ordered per sender,
//! blocking on write and polled without blocking on read. Transport is a
//! localhost TCP socket per channel; the reading service binds the
//! endpoint, every writing service connects to it.

use std::fmt;
use std::io::{ErrorKind, Read, Write};
use std::net::{Ipv4Addr, SocketAddrV4, TcpListener, TcpStream};

use avn_protocol::errors::WireError;
use avn_protocol::frame::Frame;
use avn_protocol::Serializable;

pub mod endpoints {
    use super::*;

    /// Simulation -> Violation-Notice Service (violation reports).
    pub const SIM_TO_AVN: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::LOCALHOST, 7611);
    /// Violation-Notice Service -> Portal (full notices).
    pub const AVN_TO_PORTAL: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::LOCALHOST, 7612);
    /// Violation-Notice Service and Portal -> Payment Service (payment records).
    pub const PAYMENTS: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::LOCALHOST, 7613);
    /// Payment Service -> Portal (settlement outcomes).
    pub const PAYMENTS_TO_PORTAL: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::LOCALHOST, 7614);
}

#[derive(Debug)]
pub enum ChannelError {
    /// The endpoint could not be bound or connected. Fatal at service startup.
    ConnectionError(SocketAddrV4),
    /// An established peer connection failed mid-stream.
    IoError(std::io::Error),
    /// A frame could not be encoded.
    EncodeError(WireError),
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelError::ConnectionError(addr) => {
                write!(f, "Could not open channel endpoint {}", addr)
            }
            ChannelError::IoError(e) => write!(f, "Channel I/O error: {}", e),
            ChannelError::EncodeError(e) => write!(f, "Channel encode error: {}", e),
        }
    }
}

impl From<std::io::Error> for ChannelError {
    fn from(err: std::io::Error) -> Self {
        ChannelError::IoError(err)
    }
}

/// The writing end of a channel. Writes block until the frame is handed to
/// the transport, mirroring a FIFO writer blocked on a slow reader.
pub struct ChannelWriter {
    stream: TcpStream,
}

impl ChannelWriter {
    /// Connects to the reading service. An error here means the peer is not
    /// up, which is fatal at service startup.
    pub fn connect(addr: SocketAddrV4) -> Result<Self, ChannelError> {
        let stream =
            TcpStream::connect(addr).map_err(|_| ChannelError::ConnectionError(addr))?;
        Ok(Self { stream })
    }

    /// Connects, retrying until `timeout` elapses. Mirrors opening a pipe
    /// for writing before the reader exists, so the services can start in
    /// any order within the window.
    pub fn connect_retry(
        addr: SocketAddrV4,
        timeout: std::time::Duration,
    ) -> Result<Self, ChannelError> {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            match TcpStream::connect(addr) {
                Ok(stream) => return Ok(Self { stream }),
                Err(_) if std::time::Instant::now() < deadline => {
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
                Err(_) => return Err(ChannelError::ConnectionError(addr)),
            }
        }
    }

    pub fn send(&mut self, frame: &Frame) -> Result<(), ChannelError> {
        let bytes = frame.to_bytes().map_err(ChannelError::EncodeError)?;
        self.stream.write_all(&bytes)?;
        self.stream.flush()?;
        Ok(())
    }
}

struct Connection {
    stream: TcpStream,
    buffer: Vec<u8>,
    closed: bool,
}

impl Connection {
    /// Pulls whatever bytes are available without blocking.
    fn fill(&mut self) {
        let mut chunk = [0u8; 4096];
        loop {
            match self.stream.read(&mut chunk) {
                Ok(0) => {
                    self.closed = true;
                    return;
                }
                Ok(n) => self.buffer.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::WouldBlock => return,
                Err(_) => {
                    self.closed = true;
                    return;
                }
            }
        }
    }

    /// Removes and decodes the first complete frame in the buffer.
    /// A malformed frame discards the buffered bytes and the read continues.
    fn take_frame(&mut self) -> Option<Frame> {
        let size = match Frame::wire_size(&self.buffer) {
            Ok(Some(size)) => size,
            Ok(None) => return None,
            Err(_) => {
                self.buffer.clear();
                return None;
            }
        };

        if self.buffer.len() < size {
            return None;
        }

        let frame_bytes: Vec<u8> = self.buffer.drain(..size).collect();
        match Frame::from_bytes(&frame_bytes) {
            Ok(frame) => Some(frame),
            Err(_) => None,
        }
    }
}

/// The reading end of a channel. Accepts any number of writers and polls
/// them round-robin; `try_recv` never blocks the service loop.
pub struct ChannelReader {
    listener: TcpListener,
    connections: Vec<Connection>,
}

impl ChannelReader {
    pub fn bind(addr: SocketAddrV4) -> Result<Self, ChannelError> {
        let listener =
            TcpListener::bind(addr).map_err(|_| ChannelError::ConnectionError(addr))?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            listener,
            connections: Vec::new(),
        })
    }

    fn accept_pending(&mut self) {
        loop {
            match self.listener.accept() {
                Ok((stream, _)) => {
                    if stream.set_nonblocking(true).is_ok() {
                        self.connections.push(Connection {
                            stream,
                            buffer: Vec::new(),
                            closed: false,
                        });
                    }
                }
                Err(_) => break,
            }
        }
    }

    /// Returns the next available frame, or `None` when no writer has a
    /// complete frame pending. Never blocks.
    pub fn try_recv(&mut self) -> Option<Frame> {
        self.accept_pending();

        let mut alive = Vec::new();
        let mut found = None;

        for mut connection in self.connections.drain(..) {
            if found.is_some() {
                alive.push(connection);
                continue;
            }

            connection.fill();
            match connection.take_frame() {
                Some(frame) => {
                    found = Some(frame);
                    alive.push(connection);
                }
                // A dead writer's trailing partial frame is discarded.
                None if !connection.closed => alive.push(connection),
                None => {}
            }
        }

        self.connections = alive;
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avn_protocol::messages::report::ViolationReport;
    use avn_protocol::types::{AircraftClass, ViolationKind};
    use std::thread;
    use std::time::Duration;

    fn report(flight_number: u32) -> Frame {
        Frame::Report(ViolationReport {
            flight_number,
            airline: "PIA".to_string(),
            aircraft_class: AircraftClass::Commercial,
            kind: ViolationKind::Speed,
            recorded: 650.0,
            limit: 600.0,
        })
    }

    fn recv_blocking(reader: &mut ChannelReader) -> Frame {
        for _ in 0..200 {
            if let Some(frame) = reader.try_recv() {
                return frame;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("no frame arrived within the deadline");
    }

    #[test]
    fn frames_arrive_in_send_order() {
        let addr = SocketAddrV4::new(Ipv4Addr::LOCALHOST, 7691);
        let mut reader = ChannelReader::bind(addr).unwrap();

        let mut writer = ChannelWriter::connect(addr).unwrap();
        writer.send(&report(101)).unwrap();
        writer.send(&report(102)).unwrap();
        writer.send(&report(103)).unwrap();

        assert_eq!(recv_blocking(&mut reader), report(101));
        assert_eq!(recv_blocking(&mut reader), report(102));
        assert_eq!(recv_blocking(&mut reader), report(103));
        assert!(reader.try_recv().is_none());
    }

    #[test]
    fn reader_accepts_multiple_writers() {
        let addr = SocketAddrV4::new(Ipv4Addr::LOCALHOST, 7692);
        let mut reader = ChannelReader::bind(addr).unwrap();

        let mut first = ChannelWriter::connect(addr).unwrap();
        let mut second = ChannelWriter::connect(addr).unwrap();

        first.send(&report(201)).unwrap();
        second.send(&report(202)).unwrap();

        let mut flights = vec![];
        for _ in 0..2 {
            match recv_blocking(&mut reader) {
                Frame::Report(r) => flights.push(r.flight_number),
                other => panic!("unexpected frame {:?}", other),
            }
        }
        flights.sort_unstable();
        assert_eq!(flights, vec![201, 202]);
    }

    #[test]
    fn empty_channel_does_not_block() {
        let addr = SocketAddrV4::new(Ipv4Addr::LOCALHOST, 7693);
        let mut reader = ChannelReader::bind(addr).unwrap();
        assert!(reader.try_recv().is_none());
    }

    #[test]
    fn connect_retry_waits_for_late_reader() {
        let addr = SocketAddrV4::new(Ipv4Addr::LOCALHOST, 7694);
        let reader = thread::spawn(move || {
            thread::sleep(Duration::from_millis(200));
            ChannelReader::bind(addr).unwrap()
        });

        let writer = ChannelWriter::connect_retry(addr, Duration::from_secs(5));
        assert!(writer.is_ok());
        reader.join().unwrap();
    }

    #[test]
    fn connect_to_absent_reader_fails() {
        let addr = SocketAddrV4::new(Ipv4Addr::LOCALHOST, 7699);
        assert!(ChannelWriter::connect(addr).is_err());
    }
}
