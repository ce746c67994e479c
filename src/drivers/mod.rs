//! Servo output drivers.

pub mod servo;
