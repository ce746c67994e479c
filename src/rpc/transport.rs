//! Transport abstraction: an addressed request/reply channel.
//!
//! The supervisor side receives one request at a time and must answer it
//! before the next is accepted.  The panel side sends a request and blocks
//! for its reply.
//!
//! Concrete implementations live in [`crate::adapters::tcp`]; tests use
//! scripted in-memory transports.

use core::time::Duration;

/// Supervisor-side request/reply channel.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Wait at most `wait` for one request.
    /// Returns `Ok(None)` when nothing arrived in time.
    fn receive(&mut self, wait: Duration) -> Result<Option<String>, Self::Error>;

    /// Answer the request most recently received.
    fn reply(&mut self, reply: &str) -> Result<(), Self::Error>;
}

/// Panel-side channel: send one request, get its reply.
pub trait RequestChannel {
    type Error: core::fmt::Debug;

    fn request(&mut self, message: &str) -> Result<String, Self::Error>;
}

/// A null transport that never receives and discards replies.
/// Useful for driving the tick sweep with no panel attached.
pub struct NullTransport;

impl Transport for NullTransport {
    type Error = ();

    fn receive(&mut self, wait: Duration) -> Result<Option<String>, ()> {
        std::thread::sleep(wait);
        Ok(None)
    }

    fn reply(&mut self, _reply: &str) -> Result<(), ()> {
        Ok(())
    }
}
