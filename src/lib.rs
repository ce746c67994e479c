//! Layout control library.
//!
//! Servo supervisor for model railway turnouts and semaphore signals.
//! Exposes the actuator model, the line protocol and the supervisor loop
//! for the `layout-supervisor` binary and for integration testing.

#![deny(unused_must_use)]

pub mod actuators;
pub mod adapters;
pub mod app;
pub mod client;
pub mod config;
pub mod drivers;
pub mod error;
pub mod registry;
pub mod rpc;
