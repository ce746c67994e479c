//! Text request/reply protocol between the panel and the supervisor.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Protocol stack                         │
//! │                                                             │
//! │  ┌───────────┐   ┌──────────┐   ┌────────────────────────┐  │
//! │  │ Transport │──▶│  Codec   │──▶│ Command::parse         │  │
//! │  │ (trait)   │   │ (lines)  │   │  → handler::dispatch   │  │
//! │  └───────────┘   └──────────┘   │  → DeviceRegistry      │  │
//! │       ▲                         └───────────┬────────────┘  │
//! │       │                                     │               │
//! │       └──────────────── Reply ◀─────────────┘               │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod codec;
pub mod command;
pub mod handler;
pub mod reply;
pub mod transport;
