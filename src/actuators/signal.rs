//! Semaphore signal arm with independent lift/drop rates and bounce.
//!
//! ## Physical bands
//!
//! | Aspect | Band (servo degrees) |
//! |--------|----------------------|
//! | Danger | 45 ..= 90            |
//! | Clear  | 90 ..= 135           |
//!
//! Positions supplied in the wrong order are swapped before clamping, so
//! `danger <= clear` always holds.
//!
//! ## Bounce
//!
//! A real arm overshoots and settles when it stops.  With bounce enabled,
//! `danger()` and `clear()` follow a waypoint sequence that alternates the
//! resting position with shrinking offsets:
//!
//! ```text
//!   drop:  d, d+12, d, d+9, d, d+6, d, d+3, d, d      (drop_speed = -75)
//!   lift:  c, c-4,  c, c-2, c, c                      (lift_speed = 25)
//! ```
//!
//! The last offset is always zero, so the sequence ends exactly on the
//! resting position.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use super::ServoBinding;
use super::motion::{Direction, MAX_WAYPOINTS, Motion, Rates, Waypoints};
use crate::app::ports::ServoOutput;
use crate::error::Error;

pub const MIN_DOWN: f32 = 45.0;
pub const MAX_DOWN: f32 = 90.0;
pub const MIN_LIFT: f32 = 90.0;
pub const MAX_LIFT: f32 = 135.0;

/// Overshoot cycles after a lift.
pub const LIFT_BOUNCES: usize = 2;
/// Overshoot cycles after a drop.
pub const DROP_BOUNCES: usize = 4;

const LIFT_BOUNCE_DIVISOR: f32 = 12.5;
const DROP_BOUNCE_DIVISOR: f32 = 25.0;

const _: () = assert!(2 * (LIFT_BOUNCES + 1) <= MAX_WAYPOINTS);
const _: () = assert!(2 * (DROP_BOUNCES + 1) <= MAX_WAYPOINTS);

/// High-level arm position last requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalAspect {
    #[serde(alias = "d")]
    Danger,
    #[serde(alias = "c")]
    Clear,
    #[default]
    #[serde(alias = "-")]
    Center,
}

/// Construction parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalParams {
    pub danger_position: f32,
    pub clear_position: f32,
    /// Degrees per second raising the arm (> 0).
    pub lift_speed: f32,
    /// Degrees per second lowering the arm (< 0).
    pub drop_speed: f32,
    pub bounce: bool,
    pub set_to: SignalAspect,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            danger_position: 45.0,
            clear_position: 90.0,
            lift_speed: 25.0,
            drop_speed: -75.0,
            bounce: true,
            set_to: SignalAspect::Center,
        }
    }
}

fn clamp_band(position: f32, lo: f32, hi: f32) -> f32 {
    if position.is_nan() { lo } else { position.clamp(lo, hi) }
}

/// Waypoints for a lift ending at `clear`.
pub fn lift_waypoints(clear: f32, lift_speed: f32, bounce: bool) -> Waypoints {
    if !bounce {
        return core::iter::once(clear).collect();
    }
    (0..=LIFT_BOUNCES)
        .flat_map(|ndx| {
            let offset = lift_speed * (LIFT_BOUNCES - ndx) as f32 / LIFT_BOUNCE_DIVISOR;
            [clear, clear - offset]
        })
        .collect()
}

/// Waypoints for a drop ending at `danger`.  `drop_speed` is negative.
pub fn drop_waypoints(danger: f32, drop_speed: f32, bounce: bool) -> Waypoints {
    if !bounce {
        return core::iter::once(danger).collect();
    }
    (0..=DROP_BOUNCES)
        .flat_map(|ndx| {
            let offset = drop_speed * (DROP_BOUNCES - ndx) as f32 / DROP_BOUNCE_DIVISOR;
            [danger, danger - offset]
        })
        .collect()
}

pub struct Signal {
    id: String,
    danger_position: f32,
    clear_position: f32,
    center_position: f32,
    lift_speed: f32,
    drop_speed: f32,
    bounce: bool,
    lift_targets: Waypoints,
    drop_targets: Waypoints,
    requested: SignalAspect,
    motion: Motion,
    servo: ServoBinding,
}

impl Signal {
    /// Build a signal and snap it to its initial aspect (no animation).
    pub fn new(id: impl Into<String>, output: Box<dyn ServoOutput>, params: SignalParams) -> Self {
        let (mut danger, mut clear) = (params.danger_position, params.clear_position);
        if danger > clear {
            core::mem::swap(&mut danger, &mut clear);
        }
        let danger_position = clamp_band(danger, MIN_DOWN, MAX_DOWN);
        let clear_position = clamp_band(clear, MIN_LIFT, MAX_LIFT);
        let center_position = danger_position + (clear_position - danger_position) / 2.0;

        let lift_speed = params.lift_speed.abs();
        let drop_speed = -params.drop_speed.abs();

        let mut signal = Self {
            id: id.into(),
            danger_position,
            clear_position,
            center_position,
            lift_speed,
            drop_speed,
            bounce: params.bounce,
            lift_targets: lift_waypoints(clear_position, lift_speed, params.bounce),
            drop_targets: drop_waypoints(danger_position, drop_speed, params.bounce),
            requested: params.set_to,
            motion: Motion::new(
                center_position,
                Rates {
                    rise: lift_speed,
                    fall: -drop_speed,
                },
            ),
            servo: ServoBinding::new(output),
        };
        let initial = signal.resting_position(params.set_to);
        signal.motion.snap_to(initial);
        signal.move_to(initial);
        signal
    }

    /// Final resting position for an aspect.
    pub fn resting_position(&self, aspect: SignalAspect) -> f32 {
        match aspect {
            SignalAspect::Danger => self.danger_position,
            SignalAspect::Clear => self.clear_position,
            SignalAspect::Center => self.center_position,
        }
    }

    pub fn danger(&mut self, now: Duration) {
        self.requested = SignalAspect::Danger;
        self.motion.follow(&self.drop_targets, now);
    }

    pub fn clear(&mut self, now: Duration) {
        self.requested = SignalAspect::Clear;
        self.motion.follow(&self.lift_targets, now);
    }

    /// Straight to the midpoint, no bounce.
    pub fn center(&mut self, now: Duration) {
        self.requested = SignalAspect::Center;
        self.motion.go_to(self.center_position, now);
    }

    pub fn set_aspect(&mut self, aspect: SignalAspect, now: Duration) {
        match aspect {
            SignalAspect::Danger => self.danger(now),
            SignalAspect::Clear => self.clear(now),
            SignalAspect::Center => self.center(now),
        }
    }

    /// Advance toward the current waypoint and write the servo.
    pub fn update(&mut self, now: Duration) {
        if let Some(position) = self.motion.update(now) {
            self.move_to(position);
        }
    }

    fn move_to(&mut self, position: f32) {
        self.servo.write(position);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn channel(&self) -> u8 {
        self.servo.channel()
    }

    pub fn danger_position(&self) -> f32 {
        self.danger_position
    }

    pub fn clear_position(&self) -> f32 {
        self.clear_position
    }

    pub fn center_position(&self) -> f32 {
        self.center_position
    }

    pub fn lift_speed(&self) -> f32 {
        self.lift_speed
    }

    pub fn drop_speed(&self) -> f32 {
        self.drop_speed
    }

    pub fn bounce(&self) -> bool {
        self.bounce
    }

    pub fn lift_targets(&self) -> &[f32] {
        &self.lift_targets
    }

    pub fn drop_targets(&self) -> &[f32] {
        &self.drop_targets
    }

    pub fn requested(&self) -> SignalAspect {
        self.requested
    }

    pub fn target_ndx(&self) -> usize {
        self.motion.target_ndx()
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

impl core::fmt::Debug for Signal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.id)
            .field("danger_position", &self.danger_position)
            .field("clear_position", &self.clear_position)
            .field("bounce", &self.bounce)
            .field("requested", &self.requested)
            .field("motion", &self.motion)
            .field("servo", &self.servo)
            .finish()
    }
}
