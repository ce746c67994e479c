//! Mock adapters for integration tests.
//!
//! A manual clock that only moves when told to, a scripted transport that
//! advances that clock by the full bounded wait on every receive, and a
//! sink that records every supervisor event.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use layoutctl::adapters::servo_kit::ServoKit;
use layoutctl::app::events::AppEvent;
use layoutctl::app::ports::{Clock, EventSink};
use layoutctl::app::service::Supervisor;
use layoutctl::config::SupervisorConfig;
use layoutctl::registry::DeviceRegistry;
use layoutctl::rpc::transport::Transport;

// ── ManualClock ───────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, at: Duration) {
        self.now.set(at);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

// ── ScriptedTransport ─────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Deliver a request.
    Request(String),
    /// Nothing arrives within the wait.
    Idle,
    /// The transport reports an error.
    Fail,
}

/// Transport that plays back a script.  Once the script runs out every
/// receive is idle.  Shared handles let tests keep feeding requests while
/// the supervisor owns the transport.
#[derive(Clone)]
pub struct ScriptedTransport {
    clock: ManualClock,
    script: Rc<RefCell<VecDeque<Step>>>,
    replies: Rc<RefCell<Vec<String>>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            script: Rc::default(),
            replies: Rc::default(),
        }
    }

    pub fn push(&self, step: Step) {
        self.script.borrow_mut().push_back(step);
    }

    pub fn request(&self, request: &str) {
        self.push(Step::Request(request.to_owned()));
    }

    pub fn replies(&self) -> Vec<String> {
        self.replies.borrow().clone()
    }

    pub fn last_reply(&self) -> Option<String> {
        self.replies.borrow().last().cloned()
    }
}

impl Transport for ScriptedTransport {
    type Error = &'static str;

    fn receive(&mut self, wait: Duration) -> Result<Option<String>, &'static str> {
        self.clock.advance(wait);
        match self.script.borrow_mut().pop_front() {
            Some(Step::Request(r)) => Ok(Some(r)),
            Some(Step::Fail) => Err("scripted failure"),
            Some(Step::Idle) | None => Ok(None),
        }
    }

    fn reply(&mut self, reply: &str) -> Result<(), &'static str> {
        self.replies.borrow_mut().push(reply.to_owned());
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settled(&self) -> Vec<(String, f32)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::DeviceSettled { id, position, .. } => Some((id.clone(), *position)),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// A supervisor wired to mock adapters.
pub struct Rig {
    pub kit: ServoKit,
    pub clock: ManualClock,
    pub transport: ScriptedTransport,
    pub sink: RecordingSink,
    pub supervisor: Supervisor<ScriptedTransport, ManualClock>,
}

pub const POLL_WAIT: Duration = Duration::from_millis(10);

/// Stock layout: West/East turnouts on ch0/ch1, Starter signal on ch3.
pub const LAYOUT: &str = r#"{
    "name": "test_yard",
    "turnouts": [
        { "id": "West", "channel": 0 },
        { "id": "East", "channel": 1, "invert": true, "set_to": "normal" }
    ],
    "signals": [
        { "id": "Starter", "channel": 3 }
    ]
}"#;

#[allow(dead_code)]
impl Rig {
    pub fn new() -> Self {
        Self::with_layout(LAYOUT)
    }

    pub fn with_layout(json: &str) -> Self {
        let config = SupervisorConfig::from_json_str(json).unwrap();
        let kit = ServoKit::new(config.channels);
        let registry = DeviceRegistry::from_config(&config, |ch| Box::new(kit.channel(ch))).unwrap();
        let clock = ManualClock::new();
        let transport = ScriptedTransport::new(clock.clone());
        let supervisor = Supervisor::new(
            config.name.clone(),
            registry,
            transport.clone(),
            clock.clone(),
            POLL_WAIT,
        );
        Self {
            kit,
            clock,
            transport,
            sink: RecordingSink::new(),
            supervisor,
        }
    }

    /// Send one request and run the iteration that answers it.
    pub fn call(&mut self, request: &str) -> String {
        self.transport.request(request);
        self.supervisor.poll_once(&mut self.sink);
        self.transport.last_reply().unwrap()
    }

    /// Run idle iterations covering `span` of simulated time.
    pub fn idle_for(&mut self, span: Duration) {
        let iterations = span.as_millis() / POLL_WAIT.as_millis();
        for _ in 0..iterations {
            self.supervisor.poll_once(&mut self.sink);
        }
    }
}
