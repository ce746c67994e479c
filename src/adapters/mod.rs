//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter      | Implements                   | Connects to              |
//! |--------------|------------------------------|--------------------------|
//! | `log_sink`   | EventSink                    | `log` output             |
//! | `servo_kit`  | ServoOutput                  | simulated servo channels |
//! | `tcp`        | Transport / RequestChannel   | TCP line protocol        |
//! | `time`       | Clock                        | `std::time::Instant`     |

pub mod log_sink;
pub mod servo_kit;
pub mod tcp;
pub mod time;
