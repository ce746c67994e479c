//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing supervisor events through the `log`
//! facade, one `TAG | key=value` record per event.

use log::{debug, info};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { turnouts, signals } => {
                info!("START | turnouts={} signals={}", turnouts, signals);
            }
            AppEvent::CommandHandled { request, reply } => {
                debug!("CMD   | '{}' -> {}", request, reply);
            }
            AppEvent::DeviceSettled { kind, id, position } => {
                info!("SET   | {} '{}' at {:.1}\u{00b0}", kind, id, position);
            }
            AppEvent::Stopped => {
                info!("STOP  | shutdown acknowledged");
            }
        }
    }
}
