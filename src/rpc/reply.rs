//! Reply alphabet: `ok`, `error`, `set`, `moving:<n>`, `bye`.

use core::fmt;
use core::str::FromStr;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Ok,
    Error,
    /// Device is on target.
    Set,
    /// Device still moving; carries percent of travel completed.
    Moving(u8),
    /// Shutdown acknowledged.
    Bye,
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => f.write_str("ok"),
            Self::Error => f.write_str("error"),
            Self::Set => f.write_str("set"),
            Self::Moving(n) => write!(f, "moving:{n}"),
            Self::Bye => f.write_str("bye"),
        }
    }
}

impl FromStr for Reply {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "ok" => Ok(Self::Ok),
            "error" => Ok(Self::Error),
            "set" => Ok(Self::Set),
            "bye" => Ok(Self::Bye),
            _ => s
                .strip_prefix("moving:")
                .and_then(|n| n.parse().ok())
                .map(Self::Moving)
                .ok_or(Error::MalformedCommand),
        }
    }
}
