//! Unified error types for the layout supervisor.
//!
//! Registration-time errors (`DuplicateIdentifier`) are fatal configuration
//! bugs.  Everything a single request can trip over (`NotFound`,
//! `MalformedCommand`, `UnknownVerb`, ...) is recovered by the protocol
//! handler as an `error` reply and never reaches the supervisor loop.

use core::fmt;

// ---------------------------------------------------------------------------
// Device kind
// ---------------------------------------------------------------------------

/// The two families of servo-driven devices a supervisor owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeviceKind {
    Turnout,
    Signal,
}

impl DeviceKind {
    /// Protocol token for this kind (`turnout` / `signal`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Turnout => "turnout",
            Self::Signal => "signal",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An identifier was registered twice for the same device kind.
    DuplicateIdentifier { kind: DeviceKind, id: String },
    /// No device of this kind is registered under the identifier.
    NotFound { kind: DeviceKind, id: String },
    /// Wrong token count or an empty request.
    MalformedCommand,
    /// First token is not a known verb.
    UnknownVerb,
    /// Second token is not `turnout` or `signal`.
    UnknownNoun,
    /// Position/aspect argument is not valid for the device kind.
    UnknownArgument,
    /// The servo output on this channel rejected a write.
    DeviceFault { channel: u8 },
    /// The request/reply transport failed.
    Transport(String),
    /// Configuration is invalid or could not be loaded.
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateIdentifier { kind, id } => {
                write!(f, "duplicate {kind} identifier '{id}'")
            }
            Self::NotFound { kind, id } => write!(f, "{kind} '{id}' not found"),
            Self::MalformedCommand => write!(f, "malformed command"),
            Self::UnknownVerb => write!(f, "unknown verb"),
            Self::UnknownNoun => write!(f, "unknown device kind"),
            Self::UnknownArgument => write!(f, "unknown argument"),
            Self::DeviceFault { channel } => write!(f, "servo fault on channel {channel}"),
            Self::Transport(msg) => write!(f, "transport: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
