//! TCP line transport.
//!
//! Implements [`Transport`] for the supervisor (single-client TCP server)
//! and [`RequestChannel`] for the panel (one client connection).  Both
//! speak the newline framing in [`crate::rpc::codec`].
//!
//! ## Connection model
//!
//! 1. `bind()` opens a non-blocking listener.
//! 2. `receive(wait)` accepts a pending client if none is connected,
//!    otherwise reads with a socket timeout equal to `wait`.  Either way it
//!    returns within roughly `wait` with `Ok(None)` if no full request
//!    arrived.
//! 3. A peer close drops the connection and returns to listening.
//!
//! A request line longer than [`MAX_LINE`](crate::rpc::codec::MAX_LINE)
//! is surfaced as an empty request, which the handler answers with
//! `error`.

use core::fmt;
use core::time::Duration;
use std::io::{BufRead, BufReader, ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};

use log::{debug, info, warn};

use crate::rpc::codec::{Line, LineDecoder, encode_line};
use crate::rpc::transport::{RequestChannel, Transport};

/// Shortest socket timeout; a zero timeout means "block forever" to std.
const MIN_WAIT: Duration = Duration::from_millis(1);

// ───────────────────────────────────────────────────────────────
// Error type
// ───────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum TcpTransportError {
    /// Socket I/O failure.
    Io(std::io::Error),
    /// Operation requires a connected peer but none is present.
    NotConnected,
    /// The peer closed the connection before replying.
    Closed,
}

impl fmt::Display for TcpTransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "socket I/O error: {e}"),
            Self::NotConnected => write!(f, "no client connected"),
            Self::Closed => write!(f, "connection closed by peer"),
        }
    }
}

impl std::error::Error for TcpTransportError {}

impl From<std::io::Error> for TcpTransportError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

fn is_timeout(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

// ───────────────────────────────────────────────────────────────
// Supervisor side
// ───────────────────────────────────────────────────────────────

struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    decoder: LineDecoder,
}

/// Single-client line server.
pub struct TcpLineTransport {
    listener: TcpListener,
    conn: Option<Connection>,
}

impl TcpLineTransport {
    /// Bind a listener on `addr`.  Port `0` lets the OS pick one (see
    /// [`local_addr`](Self::local_addr)).
    pub fn bind(addr: impl ToSocketAddrs) -> Result<Self, TcpTransportError> {
        let listener = TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        info!("TCP: listening on {}", listener.local_addr()?);
        Ok(Self {
            listener,
            conn: None,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TcpTransportError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Accept a waiting client.  Returns `true` if one was accepted.
    fn accept(&mut self) -> Result<bool, TcpTransportError> {
        match self.listener.accept() {
            Ok((stream, peer)) => {
                stream.set_nonblocking(false)?;
                stream.set_nodelay(true)?;
                info!("TCP: panel connected from {}", peer);
                self.conn = Some(Connection {
                    stream,
                    peer,
                    decoder: LineDecoder::new(),
                });
                Ok(true)
            }
            Err(ref e) if is_timeout(e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn disconnect(&mut self) {
        if let Some(conn) = self.conn.take() {
            info!("TCP: panel {} disconnected", conn.peer);
        }
    }

    fn take_line(conn: &mut Connection) -> Option<String> {
        conn.decoder.next_line().map(|line| match line {
            Line::Text(text) => text,
            Line::Overlong => {
                warn!("TCP: overlong request from {} discarded", conn.peer);
                String::new()
            }
        })
    }
}

impl Transport for TcpLineTransport {
    type Error = TcpTransportError;

    fn receive(&mut self, wait: Duration) -> Result<Option<String>, TcpTransportError> {
        if self.conn.is_none() && !self.accept()? {
            std::thread::sleep(wait);
            return Ok(None);
        }
        let Some(conn) = self.conn.as_mut() else {
            return Ok(None);
        };
        if let Some(line) = Self::take_line(conn) {
            return Ok(Some(line));
        }

        conn.stream.set_read_timeout(Some(wait.max(MIN_WAIT)))?;
        let mut buf = [0u8; 512];
        match conn.stream.read(&mut buf) {
            Ok(0) => {
                self.disconnect();
                Ok(None)
            }
            Ok(n) => {
                conn.decoder.feed(&buf[..n]);
                Ok(Self::take_line(conn))
            }
            Err(ref e) if is_timeout(e) => Ok(None),
            Err(e) => {
                self.disconnect();
                Err(e.into())
            }
        }
    }

    fn reply(&mut self, reply: &str) -> Result<(), TcpTransportError> {
        let conn = self.conn.as_mut().ok_or(TcpTransportError::NotConnected)?;
        let result = conn
            .stream
            .write_all(&encode_line(reply))
            .and_then(|()| conn.stream.flush());
        if let Err(e) = result {
            self.disconnect();
            return Err(e.into());
        }
        debug!("TCP: replied '{}'", reply);
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Panel side
// ───────────────────────────────────────────────────────────────

/// Blocking request channel to a supervisor.
pub struct TcpRequestChannel {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl TcpRequestChannel {
    /// Default time to wait for a reply.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

    pub fn connect(addr: SocketAddr, timeout: Duration) -> Result<Self, TcpTransportError> {
        let stream = TcpStream::connect_timeout(&addr, timeout.max(MIN_WAIT))?;
        stream.set_read_timeout(Some(timeout.max(MIN_WAIT)))?;
        stream.set_nodelay(true)?;
        let writer = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(stream),
            writer,
        })
    }
}

impl RequestChannel for TcpRequestChannel {
    type Error = TcpTransportError;

    fn request(&mut self, message: &str) -> Result<String, TcpTransportError> {
        self.writer.write_all(&encode_line(message))?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(TcpTransportError::Closed);
        }
        let reply = line.trim_end_matches(['\r', '\n']).to_owned();
        debug!("TCP: '{}' -> '{}'", message, reply);
        Ok(reply)
    }
}
