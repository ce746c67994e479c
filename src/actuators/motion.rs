//! Speed-limited servo motion shared by turnouts and signals.
//!
//! Position is a pure function of elapsed time since the move started:
//!
//! ```text
//! next = start + rate · (now − started_at) · direction
//! ```
//!
//! clamped so it never passes the target.  Ticks may arrive irregularly
//! without changing the total travel time.
//!
//! A move may follow an ordered waypoint sequence (signal bounce).  Each
//! waypoint is consumed as it is reached; zero-length legs are skipped in
//! the same tick.

use core::time::Duration;

/// Upper bound on waypoints in one sequence.
pub const MAX_WAYPOINTS: usize = 16;

/// Fixed-capacity waypoint sequence.
pub type Waypoints = heapless::Vec<f32, MAX_WAYPOINTS>;

/// Signed tri-state direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Down = -1,
    #[default]
    Idle = 0,
    Up = 1,
}

impl Direction {
    /// Sign as an integer (`-1`, `0`, `1`).
    pub const fn as_i8(self) -> i8 {
        self as i8
    }

    fn toward(from: f32, to: f32) -> Self {
        if to > from {
            Self::Up
        } else if to < from {
            Self::Down
        } else {
            Self::Idle
        }
    }
}

/// Travel rates in degrees/second.  Both are magnitudes (> 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rates {
    pub rise: f32,
    pub fall: f32,
}

impl Rates {
    /// Same rate in both directions.
    pub const fn symmetric(rate: f32) -> Self {
        Self {
            rise: rate,
            fall: rate,
        }
    }
}

/// Motion state of one servo.
#[derive(Debug, Clone)]
pub struct Motion {
    current: f32,
    start: f32,
    target: f32,
    direction: Direction,
    started_at: Duration,
    rates: Rates,
    /// Active sequence; empty for a direct move.
    waypoints: Waypoints,
    cursor: usize,
}

impl Motion {
    /// Create a motion resting at `position`.
    pub fn new(position: f32, rates: Rates) -> Self {
        Self {
            current: position,
            start: position,
            target: position,
            direction: Direction::Idle,
            started_at: Duration::ZERO,
            rates,
            waypoints: Waypoints::new(),
            cursor: 0,
        }
    }

    /// Jump straight to `position` with no animated transition.
    pub fn snap_to(&mut self, position: f32) {
        self.current = position;
        self.start = position;
        self.target = position;
        self.direction = Direction::Idle;
        self.waypoints.clear();
        self.cursor = 0;
    }

    /// Start a move toward `target` from the current position.
    ///
    /// No-op when `target` is the current position; a move already in
    /// progress keeps going.
    pub fn set_target(&mut self, target: f32, now: Duration) {
        if target == self.current {
            return;
        }
        self.start = self.current;
        self.target = target;
        self.started_at = now;
        self.direction = Direction::toward(self.current, target);
    }

    /// Direct move to a single target, dropping any waypoint sequence.
    pub fn go_to(&mut self, target: f32, now: Duration) {
        self.waypoints.clear();
        self.cursor = 0;
        self.set_target(target, now);
    }

    /// Follow `waypoints` in order, starting with the first.
    ///
    /// An empty sequence leaves the motion untouched.
    pub fn follow(&mut self, waypoints: &Waypoints, now: Duration) {
        let Some(&first) = waypoints.first() else {
            return;
        };
        self.waypoints.clone_from(waypoints);
        self.cursor = 0;
        self.set_target(first, now);
    }

    /// Advance the position for `now`.
    ///
    /// Returns the new position, or `None` when idle (nothing to write).
    pub fn update(&mut self, now: Duration) -> Option<f32> {
        let sign = match self.direction {
            Direction::Idle => return None,
            Direction::Up => 1.0,
            Direction::Down => -1.0,
        };
        let rate = match self.direction {
            Direction::Up => self.rates.rise,
            _ => self.rates.fall,
        };

        let next = if rate > 0.0 {
            let elapsed = now.saturating_sub(self.started_at).as_secs_f32();
            let candidate = self.start + rate * elapsed * sign;
            if sign > 0.0 {
                candidate.min(self.target)
            } else {
                candidate.max(self.target)
            }
        } else {
            self.target
        };

        self.current = next;
        if next == self.target {
            self.advance(now);
        }
        Some(next)
    }

    /// Move to the next waypoint that is not already reached, or go idle.
    fn advance(&mut self, now: Duration) {
        self.direction = Direction::Idle;
        while self.cursor + 1 < self.waypoints.len() {
            self.cursor += 1;
            let next = self.waypoints[self.cursor];
            self.set_target(next, now);
            if self.is_active() {
                return;
            }
        }
    }

    /// Completed fraction of the whole move as a percentage in `0..=99`,
    /// or `None` when on target.
    ///
    /// Counts finished waypoint legs plus the travelled share of the
    /// current leg, so it never decreases while a move is in progress.
    pub fn progress_percent(&self) -> Option<u8> {
        if !self.is_active() {
            return None;
        }
        let legs = self.waypoints.len().max(1) as f32;
        let span = (self.target - self.start).abs();
        let leg = if span > 0.0 {
            ((self.current - self.start).abs() / span).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let pct = ((self.cursor as f32 + leg) / legs * 100.0).floor();
        Some((pct as u8).min(99))
    }

    pub fn is_active(&self) -> bool {
        self.direction != Direction::Idle
    }

    pub fn is_on_target(&self) -> bool {
        !self.is_active()
    }

    pub fn current_position(&self) -> f32 {
        self.current
    }

    pub fn start_position(&self) -> f32 {
        self.start
    }

    pub fn target_position(&self) -> f32 {
        self.target
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn move_started_at(&self) -> Duration {
        self.started_at
    }

    pub fn rates(&self) -> Rates {
        self.rates
    }

    /// Index of the waypoint currently being approached.
    pub fn target_ndx(&self) -> usize {
        self.cursor
    }

    /// Active waypoint sequence (empty for a direct move).
    pub fn waypoints(&self) -> &[f32] {
        &self.waypoints
    }
}
