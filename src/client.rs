//! Panel-side client for a remote supervisor.
//!
//! The panel validates its configuration at startup with `exists` checks,
//! then commands devices with `set`.  A `set` is acknowledged as soon as
//! the new target is recorded; when `wait_for_set` is enabled the client
//! polls `status` until the device reports `set`.
//!
//! ```text
//!  panel                         supervisor
//!    │  set:turnout:West:reverse    │
//!    │ ───────────────────────────▶ │
//!    │ ◀─────────────────────── ok  │
//!    │  status:turnout:West         │
//!    │ ───────────────────────────▶ │
//!    │ ◀──────────────── moving:40  │
//!    │            ...               │
//!    │ ◀────────────────────── set  │
//! ```

use log::{debug, warn};

use crate::actuators::signal::SignalAspect;
use crate::actuators::turnout::TurnoutSetting;
use crate::error::{DeviceKind, Error, Result};
use crate::rpc::command::Command;
use crate::rpc::reply::Reply;
use crate::rpc::transport::RequestChannel;

/// Upper bound on `status` polls per `set` when waiting.
pub const DEFAULT_MAX_POLLS: u32 = 100_000;

pub struct PanelClient<C> {
    channel: C,
    wait_for_set: bool,
    max_polls: u32,
}

impl<C: RequestChannel> PanelClient<C> {
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            wait_for_set: true,
            max_polls: DEFAULT_MAX_POLLS,
        }
    }

    /// Whether `set_*` calls poll until the device is on target.
    pub fn with_wait_for_set(mut self, wait: bool) -> Self {
        self.wait_for_set = wait;
        self
    }

    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = max_polls.max(1);
        self
    }

    /// Send one command and decode its reply.
    pub fn send(&mut self, command: &Command) -> Result<Reply> {
        let request = command.to_string();
        let raw = self
            .channel
            .request(&request)
            .map_err(|e| Error::Transport(format!("{e:?}")))?;
        raw.parse().map_err(|_| {
            warn!("unexpected reply '{}' to '{}'", raw, request);
            Error::Transport(format!("unexpected reply '{raw}'"))
        })
    }

    /// Startup check: the device must exist on the supervisor.
    pub fn ensure_exists(&mut self, kind: DeviceKind, id: &str) -> Result<()> {
        let command = Command::Exists {
            kind,
            id: id.to_owned(),
        };
        match self.send(&command) {
            Ok(Reply::Ok) => Ok(()),
            Ok(_) => Err(Error::NotFound {
                kind,
                id: id.to_owned(),
            }),
            Err(e) => Err(e),
        }
    }

    pub fn set_turnout(&mut self, id: &str, setting: TurnoutSetting) -> Result<()> {
        self.set(
            Command::SetTurnout {
                id: id.to_owned(),
                setting,
            },
            DeviceKind::Turnout,
            id,
        )
    }

    pub fn set_signal(&mut self, id: &str, aspect: SignalAspect) -> Result<()> {
        self.set(
            Command::SetSignal {
                id: id.to_owned(),
                aspect,
            },
            DeviceKind::Signal,
            id,
        )
    }

    fn set(&mut self, command: Command, kind: DeviceKind, id: &str) -> Result<()> {
        match self.send(&command)? {
            Reply::Ok => {}
            other => {
                debug!("'{}' refused: {}", command, other);
                return Err(Error::NotFound {
                    kind,
                    id: id.to_owned(),
                });
            }
        }
        if !self.wait_for_set {
            return Ok(());
        }

        let status = Command::Status {
            kind,
            id: id.to_owned(),
        };
        for _ in 0..self.max_polls {
            match self.send(&status)? {
                Reply::Set => return Ok(()),
                Reply::Moving(_) => {}
                other => {
                    warn!("{} '{}' status answered '{}'", kind, id, other);
                    return Err(Error::Transport(format!("{kind} '{id}' reported {other}")));
                }
            }
        }
        Err(Error::Transport(format!("{kind} '{id}' did not settle")))
    }

    /// Ask the supervisor to stop.  Expects `bye`.
    pub fn shutdown(&mut self) -> Result<()> {
        match self.send(&Command::Shutdown)? {
            Reply::Bye => Ok(()),
            other => Err(Error::Transport(format!("shutdown answered '{other}'"))),
        }
    }

    pub fn into_inner(self) -> C {
        self.channel
    }
}
