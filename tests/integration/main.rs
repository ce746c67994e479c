//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  Everything runs on the host with the simulated
//! servo kit; no hardware is required.

mod mock_hw;
mod protocol_tests;
mod supervisor_tests;
