//! Newline line codec for stream transports.
//!
//! Wire format: one UTF-8 request per line, one reply per line.
//!
//! ```text
//! set:turnout:West:normal\n   ──▶   ok\n
//! status:turnout:West\r\n     ──▶   moving:42\n
//! ```
//!
//! The decoder accumulates incoming bytes and yields complete lines, so a
//! single socket read may carry part of a line or several lines.  A line
//! longer than [`MAX_LINE`] bytes is discarded up to its terminator and
//! reported as [`Line::Overlong`].

use std::collections::VecDeque;

/// Maximum line length in bytes, excluding the terminator.
pub const MAX_LINE: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Text(String),
    Overlong,
}

/// Streaming line decoder.
pub struct LineDecoder {
    buf: heapless::Vec<u8, MAX_LINE>,
    /// A `\r` held back until the next byte shows whether it ends the line.
    pending_cr: bool,
    discarding: bool,
    ready: VecDeque<Line>,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl LineDecoder {
    pub fn new() -> Self {
        Self {
            buf: heapless::Vec::new(),
            pending_cr: false,
            discarding: false,
            ready: VecDeque::new(),
        }
    }

    /// Feed bytes into the decoder.
    pub fn feed(&mut self, data: &[u8]) {
        for &byte in data {
            if byte == b'\n' {
                self.finish_line();
                continue;
            }
            if core::mem::take(&mut self.pending_cr) {
                self.push(b'\r');
            }
            if byte == b'\r' {
                self.pending_cr = true;
            } else {
                self.push(byte);
            }
        }
    }

    fn push(&mut self, byte: u8) {
        if !self.discarding && self.buf.push(byte).is_err() {
            self.discarding = true;
            self.buf.clear();
        }
    }

    fn finish_line(&mut self) {
        self.pending_cr = false;
        if self.discarding {
            self.discarding = false;
            self.ready.push_back(Line::Overlong);
            return;
        }
        let text = String::from_utf8_lossy(&self.buf).into_owned();
        self.buf.clear();
        self.ready.push_back(Line::Text(text));
    }

    /// Next complete line, oldest first.
    pub fn next_line(&mut self) -> Option<Line> {
        self.ready.pop_front()
    }

    /// Whether a complete line is waiting.
    pub fn has_line(&self) -> bool {
        !self.ready.is_empty()
    }

    /// Drop buffered input (e.g. after the peer disconnects).
    pub fn reset(&mut self) {
        self.buf.clear();
        self.pending_cr = false;
        self.discarding = false;
        self.ready.clear();
    }
}

/// Encode one message as a wire line.
pub fn encode_line(message: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(message.len() + 1);
    out.extend_from_slice(message.as_bytes());
    out.push(b'\n');
    out
}
