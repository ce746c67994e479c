//! Supervisor configuration.
//!
//! Describes the servo channels and per-device tuning for one supervisor.
//! Loaded from JSON; every device field except `id` and `channel` has a
//! default matching the stock hardware.
//!
//! ```json
//! {
//!   "name": "servo_manager",
//!   "listen": "0.0.0.0:5555",
//!   "turnouts": [{ "id": "West Turnout", "channel": 0 }],
//!   "signals":  [{ "id": "Starter", "channel": 3, "set_to": "danger" }]
//! }
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::actuators::signal::{SignalAspect, SignalParams};
use crate::actuators::turnout::{TurnoutParams, TurnoutSetting};
use crate::error::{Error, Result};

/// Top-level supervisor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// Name the supervisor is known by on the network.
    pub name: String,
    /// Socket address the request transport listens on.
    pub listen: String,
    /// Bounded wait for one request (milliseconds).
    pub poll_wait_ms: u64,
    /// Number of channels on the servo board.
    pub channels: u8,
    pub turnouts: Vec<TurnoutConfig>,
    pub signals: Vec<SignalConfig>,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            name: "servo_manager".into(),
            listen: "127.0.0.1:5555".into(),
            poll_wait_ms: 10,
            channels: 16,
            turnouts: Vec::new(),
            signals: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnoutConfig {
    pub id: String,
    pub channel: u8,
    #[serde(default = "defaults::throw")]
    pub left_max: f32,
    #[serde(default = "defaults::throw")]
    pub right_max: f32,
    /// Degrees per second.
    #[serde(default = "defaults::move_speed")]
    pub move_speed: f32,
    #[serde(default)]
    pub invert: bool,
    #[serde(default)]
    pub set_to: TurnoutSetting,
}

impl TurnoutConfig {
    pub fn params(&self) -> TurnoutParams {
        TurnoutParams {
            left_max: self.left_max,
            right_max: self.right_max,
            move_speed: self.move_speed,
            invert: self.invert,
            set_to: self.set_to,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalConfig {
    pub id: String,
    pub channel: u8,
    #[serde(default = "defaults::danger_position")]
    pub danger_position: f32,
    #[serde(default = "defaults::clear_position")]
    pub clear_position: f32,
    #[serde(default = "defaults::lift_speed")]
    pub lift_speed: f32,
    #[serde(default = "defaults::drop_speed")]
    pub drop_speed: f32,
    #[serde(default = "defaults::bounce")]
    pub bounce: bool,
    #[serde(default)]
    pub set_to: SignalAspect,
}

impl SignalConfig {
    pub fn params(&self) -> SignalParams {
        SignalParams {
            danger_position: self.danger_position,
            clear_position: self.clear_position,
            lift_speed: self.lift_speed,
            drop_speed: self.drop_speed,
            bounce: self.bounce,
            set_to: self.set_to,
        }
    }
}

mod defaults {
    use crate::actuators::signal::SignalParams;
    use crate::actuators::turnout::TurnoutParams;

    pub fn throw() -> f32 {
        TurnoutParams::default().left_max
    }

    pub fn move_speed() -> f32 {
        TurnoutParams::default().move_speed
    }

    pub fn danger_position() -> f32 {
        SignalParams::default().danger_position
    }

    pub fn clear_position() -> f32 {
        SignalParams::default().clear_position
    }

    pub fn lift_speed() -> f32 {
        SignalParams::default().lift_speed
    }

    pub fn drop_speed() -> f32 {
        SignalParams::default().drop_speed
    }

    pub fn bounce() -> bool {
        SignalParams::default().bounce
    }
}

impl SupervisorConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// Reject values that would leave a device unable to move or two
    /// devices fighting over one servo.
    ///
    /// Out-of-range throws and arm positions are not errors; the actuators
    /// clamp them.
    pub fn validate(&self) -> Result<()> {
        if self.poll_wait_ms == 0 {
            return Err(Error::Config("poll_wait_ms must be positive".into()));
        }

        let mut used = BTreeSet::new();
        let channels = self
            .turnouts
            .iter()
            .map(|t| (t.id.as_str(), t.channel))
            .chain(self.signals.iter().map(|s| (s.id.as_str(), s.channel)));
        for (id, channel) in channels {
            if channel >= self.channels {
                return Err(Error::Config(format!(
                    "'{id}': channel {channel} out of range (board has {})",
                    self.channels
                )));
            }
            if !used.insert(channel) {
                return Err(Error::Config(format!("'{id}': channel {channel} already in use")));
            }
        }

        for t in &self.turnouts {
            if t.move_speed.is_nan() || t.move_speed <= 0.0 {
                return Err(Error::Config(format!("turnout '{}': move_speed must be positive", t.id)));
            }
        }
        for s in &self.signals {
            if s.lift_speed.is_nan() || s.lift_speed <= 0.0 {
                return Err(Error::Config(format!("signal '{}': lift_speed must be positive", s.id)));
            }
            if s.drop_speed.is_nan() || s.drop_speed >= 0.0 {
                return Err(Error::Config(format!("signal '{}': drop_speed must be negative", s.id)));
            }
        }
        Ok(())
    }

    pub fn poll_wait(&self) -> core::time::Duration {
        core::time::Duration::from_millis(self.poll_wait_ms)
    }
}
