//! Device registry: owns every actuator the supervisor drives.
//!
//! Turnouts and signals live in separate maps, so the same identifier may
//! name one of each.  Registration happens once at startup; identifiers
//! are never reused or renamed afterwards.

use core::time::Duration;
use std::collections::BTreeMap;

use log::info;

use crate::actuators::signal::Signal;
use crate::actuators::turnout::Turnout;
use crate::app::ports::ServoOutput;
use crate::config::SupervisorConfig;
use crate::error::{DeviceKind, Error, Result};

/// A device that reached its final target during a [`DeviceRegistry::tick`].
#[derive(Debug, Clone, PartialEq)]
pub struct Settled {
    pub kind: DeviceKind,
    pub id: String,
    pub position: f32,
}

#[derive(Debug, Default)]
pub struct DeviceRegistry {
    turnouts: BTreeMap<String, Turnout>,
    signals: BTreeMap<String, Signal>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and register every device in `config`, binding each to the
    /// servo output returned by `output` for its channel.
    pub fn from_config(
        config: &SupervisorConfig,
        mut output: impl FnMut(u8) -> Box<dyn ServoOutput>,
    ) -> Result<Self> {
        let mut registry = Self::new();
        for t in &config.turnouts {
            registry.register_turnout(Turnout::new(t.id.clone(), output(t.channel), t.params()))?;
        }
        for s in &config.signals {
            registry.register_signal(Signal::new(s.id.clone(), output(s.channel), s.params()))?;
        }
        Ok(registry)
    }

    pub fn register_turnout(&mut self, turnout: Turnout) -> Result<()> {
        if self.turnouts.contains_key(turnout.id()) {
            return Err(Error::DuplicateIdentifier {
                kind: DeviceKind::Turnout,
                id: turnout.id().to_owned(),
            });
        }
        info!(
            "Registered turnout '{}' on ch{} at {:.1}",
            turnout.id(),
            turnout.channel(),
            turnout.current_position()
        );
        self.turnouts.insert(turnout.id().to_owned(), turnout);
        Ok(())
    }

    pub fn register_signal(&mut self, signal: Signal) -> Result<()> {
        if self.signals.contains_key(signal.id()) {
            return Err(Error::DuplicateIdentifier {
                kind: DeviceKind::Signal,
                id: signal.id().to_owned(),
            });
        }
        info!(
            "Registered signal '{}' on ch{} at {:.1}",
            signal.id(),
            signal.channel(),
            signal.current_position()
        );
        self.signals.insert(signal.id().to_owned(), signal);
        Ok(())
    }

    pub fn find_turnout(&self, id: &str) -> Result<&Turnout> {
        self.turnouts.get(id).ok_or_else(|| not_found(DeviceKind::Turnout, id))
    }

    pub fn find_turnout_mut(&mut self, id: &str) -> Result<&mut Turnout> {
        self.turnouts
            .get_mut(id)
            .ok_or_else(|| not_found(DeviceKind::Turnout, id))
    }

    pub fn find_signal(&self, id: &str) -> Result<&Signal> {
        self.signals.get(id).ok_or_else(|| not_found(DeviceKind::Signal, id))
    }

    pub fn find_signal_mut(&mut self, id: &str) -> Result<&mut Signal> {
        self.signals
            .get_mut(id)
            .ok_or_else(|| not_found(DeviceKind::Signal, id))
    }

    pub fn contains(&self, kind: DeviceKind, id: &str) -> bool {
        match kind {
            DeviceKind::Turnout => self.turnouts.contains_key(id),
            DeviceKind::Signal => self.signals.contains_key(id),
        }
    }

    /// Advance every moving actuator to `now`.  Idle ones are skipped so
    /// they never see a spurious servo write.
    ///
    /// Returns the devices that settled on this tick.
    pub fn tick(&mut self, now: Duration) -> Vec<Settled> {
        let mut settled = Vec::new();

        for signal in self.signals.values_mut().filter(|s| s.is_active()) {
            signal.update(now);
            if signal.is_on_target() {
                settled.push(Settled {
                    kind: DeviceKind::Signal,
                    id: signal.id().to_owned(),
                    position: signal.current_position(),
                });
            }
        }

        for turnout in self.turnouts.values_mut().filter(|t| t.is_active()) {
            turnout.update(now);
            if turnout.is_on_target() {
                settled.push(Settled {
                    kind: DeviceKind::Turnout,
                    id: turnout.id().to_owned(),
                    position: turnout.current_position(),
                });
            }
        }

        settled
    }

    /// Whether any actuator is still moving.
    pub fn any_active(&self) -> bool {
        self.turnouts.values().any(Turnout::is_active) || self.signals.values().any(Signal::is_active)
    }

    pub fn turnouts(&self) -> impl Iterator<Item = &Turnout> {
        self.turnouts.values()
    }

    pub fn signals(&self) -> impl Iterator<Item = &Signal> {
        self.signals.values()
    }

    pub fn turnout_count(&self) -> usize {
        self.turnouts.len()
    }

    pub fn signal_count(&self) -> usize {
        self.signals.len()
    }
}

fn not_found(kind: DeviceKind, id: &str) -> Error {
    Error::NotFound {
        kind,
        id: id.to_owned(),
    }
}
