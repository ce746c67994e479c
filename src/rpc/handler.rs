//! Request handler: applies one decoded [`Command`] to the registry.
//!
//! Every request produces exactly one [`Reply`].  Decode and lookup
//! failures are logged at debug level and answered with `error`; nothing
//! propagates back into the supervisor loop.  Work per request is bounded:
//! a `set` only records a new target, the motion itself happens on ticks.

use core::time::Duration;

use log::debug;

use super::command::Command;
use super::reply::Reply;
use crate::actuators::signal::SignalAspect;
use crate::actuators::turnout::TurnoutSetting;
use crate::error::{DeviceKind, Error, Result};
use crate::registry::DeviceRegistry;

/// Decode `request`, apply it at time `now`, and produce the reply.
pub fn dispatch(registry: &mut DeviceRegistry, request: &str, now: Duration) -> Reply {
    match Command::parse(request).and_then(|cmd| execute(registry, cmd, now)) {
        Ok(reply) => reply,
        Err(e) => {
            debug!("rejected '{}': {}", request, e);
            Reply::Error
        }
    }
}

/// Apply an already decoded command.
pub fn execute(registry: &mut DeviceRegistry, command: Command, now: Duration) -> Result<Reply> {
    match command {
        Command::SetTurnout { id, setting } => {
            let turnout = registry.find_turnout_mut(&id)?;
            match setting {
                TurnoutSetting::Normal => turnout.normal(now),
                TurnoutSetting::Reverse => turnout.reverse(now),
                TurnoutSetting::Center => return Err(Error::UnknownArgument),
            }
            Ok(Reply::Ok)
        }
        Command::SetSignal { id, aspect } => {
            let signal = registry.find_signal_mut(&id)?;
            match aspect {
                SignalAspect::Clear => signal.clear(now),
                SignalAspect::Danger => signal.danger(now),
                SignalAspect::Center => return Err(Error::UnknownArgument),
            }
            Ok(Reply::Ok)
        }
        Command::Status { kind, id } => status(registry, kind, &id),
        Command::Exists { kind, id } => {
            if registry.contains(kind, &id) {
                Ok(Reply::Ok)
            } else {
                Err(Error::NotFound { kind, id })
            }
        }
        Command::Shutdown => Ok(Reply::Bye),
    }
}

fn status(registry: &DeviceRegistry, kind: DeviceKind, id: &str) -> Result<Reply> {
    let (fault, progress) = match kind {
        DeviceKind::Turnout => {
            let t = registry.find_turnout(id)?;
            (t.fault().cloned(), t.progress_percent())
        }
        DeviceKind::Signal => {
            let s = registry.find_signal(id)?;
            (s.fault().cloned(), s.progress_percent())
        }
    };
    if let Some(fault) = fault {
        return Err(fault);
    }
    Ok(progress.map_or(Reply::Set, Reply::Moving))
}
