//! Inbound protocol commands.
//!
//! Requests are colon-delimited, case-sensitive text decoded once into a
//! closed [`Command`] enum:
//!
//! | Request                               | Command                  |
//! |---------------------------------------|--------------------------|
//! | `set:turnout:<id>:normal\|reverse`    | [`Command::SetTurnout`]  |
//! | `set:signal:<id>:clear\|danger`       | [`Command::SetSignal`]   |
//! | `status:turnout\|signal:<id>`         | [`Command::Status`]      |
//! | `exists:turnout\|signal:<id>`         | [`Command::Exists`]      |
//! | `shutdown`                            | [`Command::Shutdown`]    |
//!
//! Identifiers may contain anything except `:`.

use core::fmt;
use core::str::FromStr;

use crate::actuators::signal::SignalAspect;
use crate::actuators::turnout::TurnoutSetting;
use crate::error::{DeviceKind, Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetTurnout { id: String, setting: TurnoutSetting },
    SetSignal { id: String, aspect: SignalAspect },
    Status { kind: DeviceKind, id: String },
    Exists { kind: DeviceKind, id: String },
    Shutdown,
}

impl Command {
    /// Decode one request string.
    pub fn parse(request: &str) -> Result<Self> {
        let tokens: Vec<&str> = request.split(':').collect();
        match tokens.as_slice() {
            ["shutdown"] => Ok(Self::Shutdown),
            ["set", noun, id, arg] => match parse_kind(noun)? {
                DeviceKind::Turnout => Ok(Self::SetTurnout {
                    id: (*id).to_owned(),
                    setting: parse_setting(arg)?,
                }),
                DeviceKind::Signal => Ok(Self::SetSignal {
                    id: (*id).to_owned(),
                    aspect: parse_aspect(arg)?,
                }),
            },
            ["status", noun, id] => Ok(Self::Status {
                kind: parse_kind(noun)?,
                id: (*id).to_owned(),
            }),
            ["exists", noun, id] => Ok(Self::Exists {
                kind: parse_kind(noun)?,
                id: (*id).to_owned(),
            }),
            [""] => Err(Error::MalformedCommand),
            ["shutdown" | "set" | "status" | "exists", ..] => Err(Error::MalformedCommand),
            _ => Err(Error::UnknownVerb),
        }
    }
}

fn parse_kind(token: &str) -> Result<DeviceKind> {
    match token {
        "turnout" => Ok(DeviceKind::Turnout),
        "signal" => Ok(DeviceKind::Signal),
        _ => Err(Error::UnknownNoun),
    }
}

fn parse_setting(token: &str) -> Result<TurnoutSetting> {
    match token {
        "normal" => Ok(TurnoutSetting::Normal),
        "reverse" => Ok(TurnoutSetting::Reverse),
        _ => Err(Error::UnknownArgument),
    }
}

fn parse_aspect(token: &str) -> Result<SignalAspect> {
    match token {
        "clear" => Ok(SignalAspect::Clear),
        "danger" => Ok(SignalAspect::Danger),
        _ => Err(Error::UnknownArgument),
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Encodes the request string (used by the panel client).
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetTurnout { id, setting } => {
                let arg = match setting {
                    TurnoutSetting::Normal => "normal",
                    TurnoutSetting::Reverse => "reverse",
                    TurnoutSetting::Center => "center",
                };
                write!(f, "set:turnout:{id}:{arg}")
            }
            Self::SetSignal { id, aspect } => {
                let arg = match aspect {
                    SignalAspect::Clear => "clear",
                    SignalAspect::Danger => "danger",
                    SignalAspect::Center => "center",
                };
                write!(f, "set:signal:{id}:{arg}")
            }
            Self::Status { kind, id } => write!(f, "status:{kind}:{id}"),
            Self::Exists { kind, id } => write!(f, "exists:{kind}:{id}"),
            Self::Shutdown => f.write_str("shutdown"),
        }
    }
}
