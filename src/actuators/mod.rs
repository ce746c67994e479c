//! Servo-driven layout devices.
//!
//! Both device kinds compose the same [`motion::Motion`] state and own
//! exactly one [`ServoOutput`].  A failed write latches a device fault
//! that `status` reports until a later write succeeds.

pub mod motion;
pub mod signal;
pub mod turnout;

use log::{info, warn};

use crate::app::ports::ServoOutput;
use crate::drivers::servo::MAX_ANGLE;
use crate::error::Error;

/// Exclusive binding between an actuator and its servo channel.
pub struct ServoBinding {
    output: Box<dyn ServoOutput>,
    fault: Option<Error>,
}

impl ServoBinding {
    pub fn new(output: Box<dyn ServoOutput>) -> Self {
        Self {
            output,
            fault: None,
        }
    }

    pub fn channel(&self) -> u8 {
        self.output.channel()
    }

    /// Write `degrees` (clamped to the servo range).  Never fails; a
    /// rejected write is latched as a fault instead.
    pub fn write(&mut self, degrees: f32) {
        match self.output.write_angle(degrees.clamp(0.0, MAX_ANGLE)) {
            Ok(()) => {
                if self.fault.take().is_some() {
                    info!("servo ch{} recovered", self.channel());
                }
            }
            Err(e) => {
                if self.fault.is_none() {
                    warn!("servo ch{} fault: {}", self.channel(), e);
                }
                self.fault = Some(e);
            }
        }
    }

    /// Latched fault from the most recent write, if it failed.
    pub fn fault(&self) -> Option<&Error> {
        self.fault.as_ref()
    }
}

impl core::fmt::Debug for ServoBinding {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ServoBinding")
            .field("channel", &self.channel())
            .field("fault", &self.fault)
            .finish()
    }
}
