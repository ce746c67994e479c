//! Hobby servo driver on top of an `embedded-hal` PWM channel.
//!
//! Standard analogue servo timing: one pulse per 20 ms frame, pulse width
//! 0.5 ms at 0° to 2.5 ms at 180°.
//!
//! ```text
//!   duty = max_duty · pulse_us / 20_000
//! ```
//!
//! The PWM peripheral must already be configured for a 50 Hz period.

use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::app::ports::ServoOutput;
use crate::error::{Error, Result};

/// PWM frame length at 50 Hz.
pub const FRAME_US: f32 = 20_000.0;
/// Pulse width for 0°.
pub const MIN_PULSE_US: f32 = 500.0;
/// Pulse width for 180°.
pub const MAX_PULSE_US: f32 = 2_500.0;
/// Servo travel in degrees.
pub const MAX_ANGLE: f32 = 180.0;

/// Pulse width in microseconds for `degrees` (clamped to `[0, 180]`).
pub fn pulse_us_for_angle(degrees: f32) -> f32 {
    let degrees = degrees.clamp(0.0, MAX_ANGLE);
    MIN_PULSE_US + (MAX_PULSE_US - MIN_PULSE_US) * degrees / MAX_ANGLE
}

/// Servo bound to a single PWM channel.
pub struct PwmServo<P> {
    pwm: P,
    channel: u8,
    last_duty: Option<u16>,
}

impl<P: SetDutyCycle> PwmServo<P> {
    pub fn new(pwm: P, channel: u8) -> Self {
        Self {
            pwm,
            channel,
            last_duty: None,
        }
    }

    /// Duty value for `degrees` given this channel's resolution.
    pub fn duty_for_angle(&self, degrees: f32) -> u16 {
        let max = f32::from(self.pwm.max_duty_cycle());
        (max * pulse_us_for_angle(degrees) / FRAME_US).round() as u16
    }

    /// Last duty value written successfully.
    pub fn last_duty(&self) -> Option<u16> {
        self.last_duty
    }

    pub fn release(self) -> P {
        self.pwm
    }
}

impl<P: SetDutyCycle> ServoOutput for PwmServo<P> {
    fn channel(&self) -> u8 {
        self.channel
    }

    fn write_angle(&mut self, degrees: f32) -> Result<()> {
        let duty = self.duty_for_angle(degrees);
        match self.pwm.set_duty_cycle(duty) {
            Ok(()) => {
                self.last_duty = Some(duty);
                Ok(())
            }
            Err(e) => {
                warn!("servo ch{} duty write failed: {:?}", self.channel, e);
                Err(Error::DeviceFault {
                    channel: self.channel,
                })
            }
        }
    }
}
