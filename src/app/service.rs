//! Supervisor loop: the hexagonal core.
//!
//! [`Supervisor`] owns the [`DeviceRegistry`] and runs a single-threaded
//! cooperative loop.  One iteration:
//!
//! ```text
//!  Transport.receive(wait) ──▶ handler::dispatch ──▶ Transport.reply
//!                                     │
//!                                     ▼
//!                        DeviceRegistry.tick(clock.now())
//! ```
//!
//! The bounded receive is the only suspension point, so motion keeps
//! ticking with no traffic.  All actuator state is touched only from this
//! loop; no locking is needed.  `shutdown` is the only way out and its
//! reply is sent before the loop exits.

use core::time::Duration;

use log::{info, warn};

use crate::registry::DeviceRegistry;
use crate::rpc::handler;
use crate::rpc::reply::Reply;
use crate::rpc::transport::Transport;

use super::events::AppEvent;
use super::ports::{Clock, EventSink};

/// Default bounded wait for one request.
pub const DEFAULT_POLL_WAIT: Duration = Duration::from_millis(10);

/// Outcome of one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Shutdown,
}

pub struct Supervisor<T, C> {
    name: String,
    registry: DeviceRegistry,
    transport: T,
    clock: C,
    poll_wait: Duration,
    requests_handled: u64,
    iterations: u64,
}

impl<T: Transport, C: Clock> Supervisor<T, C> {
    /// Build the supervisor around a fully registered device set.
    pub fn new(
        name: impl Into<String>,
        registry: DeviceRegistry,
        transport: T,
        clock: C,
        poll_wait: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            registry,
            transport,
            clock,
            poll_wait,
            requests_handled: 0,
            iterations: 0,
        }
    }

    /// Run until a `shutdown` request has been answered.
    pub fn run(&mut self, sink: &mut impl EventSink) {
        info!(
            "Supervisor '{}' running: {} turnouts, {} signals, wait {:?}",
            self.name,
            self.registry.turnout_count(),
            self.registry.signal_count(),
            self.poll_wait
        );
        sink.emit(&AppEvent::Started {
            turnouts: self.registry.turnout_count(),
            signals: self.registry.signal_count(),
        });
        while self.poll_once(sink) == LoopControl::Continue {}
        info!(
            "Supervisor '{}' stopped after {} requests",
            self.name, self.requests_handled
        );
    }

    /// One iteration: at most one request, then one tick sweep.
    pub fn poll_once(&mut self, sink: &mut impl EventSink) -> LoopControl {
        self.iterations += 1;

        let mut control = LoopControl::Continue;
        match self.transport.receive(self.poll_wait) {
            Ok(Some(request)) => {
                let reply = handler::dispatch(&mut self.registry, &request, self.clock.now());
                self.requests_handled += 1;
                if reply == Reply::Bye {
                    control = LoopControl::Shutdown;
                }
                if let Err(e) = self.transport.reply(&reply.to_string()) {
                    warn!("reply to '{}' failed: {:?}", request, e);
                }
                sink.emit(&AppEvent::CommandHandled { request, reply });
            }
            Ok(None) => {}
            Err(e) => warn!("receive failed: {:?}", e),
        }

        if control == LoopControl::Shutdown {
            sink.emit(&AppEvent::Stopped);
            return control;
        }

        for settled in self.registry.tick(self.clock.now()) {
            sink.emit(&AppEvent::DeviceSettled {
                kind: settled.kind,
                id: settled.id,
                position: settled.position,
            });
        }
        control
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn requests_handled(&self) -> u64 {
        self.requests_handled
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Release the registry (and with it every servo binding).
    pub fn into_registry(self) -> DeviceRegistry {
        self.registry
    }
}
