//! Outbound supervisor events.
//!
//! The [`Supervisor`](super::service::Supervisor) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::error::DeviceKind;
use crate::rpc::reply::Reply;

/// Structured events emitted by the supervisor loop.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The loop is about to accept requests.
    Started { turnouts: usize, signals: usize },

    /// A request was decoded and answered.
    CommandHandled { request: String, reply: Reply },

    /// A device reached its final target on this tick.
    DeviceSettled {
        kind: DeviceKind,
        id: String,
        position: f32,
    },

    /// `shutdown` was acknowledged; the loop is exiting.
    Stopped,
}
