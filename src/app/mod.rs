//! Application core: the supervisor loop and its port boundary.
//!
//! All interaction with servos, clocks, transports and log output happens
//! through the **port traits** in [`ports`] (and the transport traits in
//! [`crate::rpc::transport`]), keeping this layer testable without real
//! peripherals or sockets.

pub mod events;
pub mod ports;
pub mod service;
