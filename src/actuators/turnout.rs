//! Servo-driven turnout (points).
//!
//! Logical position is in degrees either side of the servo centre:
//! negative is the left throw, positive the right throw.  The servo is
//! written at `90 + position`, negated first when `invert` is set, so a
//! servo mounted the other way round still throws the right way.
//!
//! "Normal" is the left throw and "reverse" the right throw.  This is a
//! fixed convention of the system (the `r` in reverse matches right),
//! not something derived from track geometry.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use super::ServoBinding;
use super::motion::{Direction, Motion, Rates};
use crate::app::ports::ServoOutput;
use crate::error::Error;

/// Largest throw either side of centre, in degrees.
pub const MAX_THROW: f32 = 45.0;

/// Named turnout positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnoutSetting {
    #[serde(alias = "l")]
    Normal,
    #[serde(alias = "r")]
    Reverse,
    #[default]
    #[serde(alias = "c")]
    Center,
}

/// Construction parameters.  Throws are given as positive magnitudes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnoutParams {
    pub left_max: f32,
    pub right_max: f32,
    /// Degrees per second.
    pub move_speed: f32,
    pub invert: bool,
    pub set_to: TurnoutSetting,
}

impl Default for TurnoutParams {
    fn default() -> Self {
        Self {
            left_max: 35.0,
            right_max: 35.0,
            move_speed: 30.0,
            invert: false,
            set_to: TurnoutSetting::Center,
        }
    }
}

/// Clamp a throw magnitude into `[0, MAX_THROW]`.
fn clamp_throw(throw: f32) -> f32 {
    if throw.is_nan() {
        0.0
    } else {
        throw.clamp(0.0, MAX_THROW)
    }
}

pub struct Turnout {
    id: String,
    left_max: f32,
    right_max: f32,
    invert: bool,
    requested: TurnoutSetting,
    motion: Motion,
    servo: ServoBinding,
}

impl Turnout {
    /// Build a turnout and snap it to its initial setting (no animation).
    pub fn new(id: impl Into<String>, output: Box<dyn ServoOutput>, params: TurnoutParams) -> Self {
        let mut turnout = Self {
            id: id.into(),
            left_max: -clamp_throw(params.left_max),
            right_max: clamp_throw(params.right_max),
            invert: params.invert,
            requested: params.set_to,
            motion: Motion::new(0.0, Rates::symmetric(params.move_speed.abs())),
            servo: ServoBinding::new(output),
        };
        let initial = turnout.preset(params.set_to);
        turnout.motion.snap_to(initial);
        turnout.move_to(initial);
        turnout
    }

    /// Logical position for a named setting.
    pub fn preset(&self, setting: TurnoutSetting) -> f32 {
        match setting {
            TurnoutSetting::Normal => self.left_max,
            TurnoutSetting::Reverse => self.right_max,
            TurnoutSetting::Center => (self.left_max + self.right_max) / 2.0,
        }
    }

    pub fn normal(&mut self, now: Duration) {
        self.throw(TurnoutSetting::Normal, now);
    }

    pub fn reverse(&mut self, now: Duration) {
        self.throw(TurnoutSetting::Reverse, now);
    }

    pub fn center(&mut self, now: Duration) {
        self.throw(TurnoutSetting::Center, now);
    }

    pub fn throw(&mut self, setting: TurnoutSetting, now: Duration) {
        self.requested = setting;
        let target = self.preset(setting);
        self.motion.go_to(target, now);
    }

    /// Advance toward the target and write the servo.  No-op when idle.
    pub fn update(&mut self, now: Duration) {
        if let Some(position) = self.motion.update(now) {
            self.move_to(position);
        }
    }

    fn move_to(&mut self, position: f32) {
        let degree = if self.invert { -position } else { position };
        self.servo.write(degree + 90.0);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn channel(&self) -> u8 {
        self.servo.channel()
    }

    /// Left throw bound (always `<= 0`).
    pub fn left_max(&self) -> f32 {
        self.left_max
    }

    /// Right throw bound (always `>= 0`).
    pub fn right_max(&self) -> f32 {
        self.right_max
    }

    pub fn invert(&self) -> bool {
        self.invert
    }

    pub fn move_speed(&self) -> f32 {
        self.motion.rates().rise
    }

    pub fn requested(&self) -> TurnoutSetting {
        self.requested
    }

    pub fn current_position(&self) -> f32 {
        self.motion.current_position()
    }

    pub fn target_position(&self) -> f32 {
        self.motion.target_position()
    }

    pub fn direction(&self) -> Direction {
        self.motion.direction()
    }

    pub fn is_active(&self) -> bool {
        self.motion.is_active()
    }

    pub fn is_on_target(&self) -> bool {
        self.motion.is_on_target()
    }

    pub fn progress_percent(&self) -> Option<u8> {
        self.motion.progress_percent()
    }

    pub fn fault(&self) -> Option<&Error> {
        self.servo.fault()
    }

    pub fn motion(&self) -> &Motion {
        &self.motion
    }
}

impl core::fmt::Debug for Turnout {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Turnout")
            .field("id", &self.id)
            .field("left_max", &self.left_max)
            .field("right_max", &self.right_max)
            .field("invert", &self.invert)
            .field("requested", &self.requested)
            .field("motion", &self.motion)
            .field("servo", &self.servo)
            .finish()
    }
}
