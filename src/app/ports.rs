//! Port traits: the hexagonal boundary between the supervisor core and
//! the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Supervisor / actuators (domain)
//! ```
//!
//! Servo outputs, clocks and event sinks implement these traits.  The
//! actuators and the [`Supervisor`](super::service::Supervisor) consume
//! them, so the domain core never touches hardware or wall-clock time
//! directly.

use core::time::Duration;

use crate::error::Result;

// ───────────────────────────────────────────────────────────────
// Servo output port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// One servo channel.  Exclusively owned by the actuator bound to it.
pub trait ServoOutput {
    /// Channel index this output drives (static configuration).
    fn channel(&self) -> u8;

    /// Drive the servo to `degrees` in `[0, 180]`.
    ///
    /// Callers clamp before writing; implementations may still reject the
    /// write with [`Error::DeviceFault`](crate::error::Error::DeviceFault).
    fn write_angle(&mut self, degrees: f32) -> Result<()>;
}

impl<T: ServoOutput + ?Sized> ServoOutput for Box<T> {
    fn channel(&self) -> u8 {
        (**self).channel()
    }

    fn write_angle(&mut self, degrees: f32) -> Result<()> {
        (**self).write_angle(degrees)
    }
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time source.  `now()` is the time since an arbitrary fixed
/// origin and must never go backwards.
pub trait Clock {
    fn now(&self) -> Duration;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The supervisor emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

/// Discards every event.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &super::events::AppEvent) {}
}
