//! Request/reply protocol tests.
//!
//! The first half drives the supervisor through the scripted transport;
//! the second runs a real supervisor on a loopback socket and talks to it
//! with the panel client.

use std::thread;
use std::time::Duration;

use layoutctl::actuators::signal::SignalAspect;
use layoutctl::actuators::turnout::TurnoutSetting;
use layoutctl::adapters::servo_kit::ServoKit;
use layoutctl::adapters::tcp::{TcpLineTransport, TcpRequestChannel};
use layoutctl::adapters::time::MonotonicClock;
use layoutctl::app::ports::NullSink;
use layoutctl::app::service::Supervisor;
use layoutctl::client::PanelClient;
use layoutctl::config::SupervisorConfig;
use layoutctl::error::{DeviceKind, Error};
use layoutctl::registry::DeviceRegistry;
use layoutctl::rpc::codec::MAX_LINE;
use layoutctl::rpc::transport::RequestChannel;

use crate::mock_hw::Rig;

// ── Scripted ──────────────────────────────────────────────────

#[test]
fn every_malformed_request_gets_error() {
    let mut rig = Rig::new();
    let cases = [
        "",
        "frobnicate",
        "set",
        "set:turnout:West",
        "set:turnout:West:reverse:now",
        "set:bridge:West:normal",
        "set:turnout:West:sideways",
        "set:turnout:West:center",
        "set:signal:Starter:normal",
        "status:turnout",
        "exists:lamp:West",
        "SET:turnout:West:normal",
    ];
    for request in cases {
        assert_eq!(rig.call(request), "error", "request '{request}'");
    }
    // Nothing was commanded.
    assert!(!rig.supervisor.registry().any_active());
}

#[test]
fn unknown_devices_are_errors_for_set_status_and_exists() {
    let mut rig = Rig::new();
    assert_eq!(rig.call("set:turnout:North:normal"), "error");
    assert_eq!(rig.call("status:signal:North"), "error");
    assert_eq!(rig.call("exists:turnout:North"), "error");
    // Identifiers are per kind.
    assert_eq!(rig.call("exists:signal:West"), "error");
    assert_eq!(rig.call("exists:turnout:West"), "ok");
    assert_eq!(rig.call("exists:signal:Starter"), "ok");
}

#[test]
fn config_aliases_are_not_wire_arguments() {
    let mut rig = Rig::new();
    assert_eq!(rig.call("set:turnout:West:r"), "error");
    assert_eq!(rig.call("set:signal:Starter:c"), "error");
    assert_eq!(rig.call("set:turnout:West:reverse"), "ok");
}

#[test]
fn idle_device_reports_set() {
    let mut rig = Rig::new();
    assert_eq!(rig.call("status:turnout:West"), "set");
    assert_eq!(rig.call("status:signal:Starter"), "set");
}

#[test]
fn identifiers_may_contain_spaces() {
    let mut rig = Rig::with_layout(r#"{ "turnouts": [{ "id": "West Turnout", "channel": 0 }] }"#);
    assert_eq!(rig.call("exists:turnout:West Turnout"), "ok");
    assert_eq!(rig.call("set:turnout:West Turnout:normal"), "ok");
}

// ── Loopback TCP ──────────────────────────────────────────────

const FAST_LAYOUT: &str = r#"{
    "turnouts": [{ "id": "West", "channel": 0, "move_speed": 300 }],
    "signals": [{ "id": "Starter", "channel": 3, "bounce": false, "lift_speed": 250 }]
}"#;

#[test]
fn panel_client_drives_supervisor_over_tcp() {
    let transport = TcpLineTransport::bind("127.0.0.1:0").unwrap();
    let addr = transport.local_addr().unwrap();

    let server = thread::spawn(move || {
        let config = SupervisorConfig::from_json_str(FAST_LAYOUT).unwrap();
        let kit = ServoKit::new(config.channels);
        let registry =
            DeviceRegistry::from_config(&config, |ch| Box::new(kit.channel(ch))).unwrap();
        let mut supervisor = Supervisor::new(
            "loopback",
            registry,
            transport,
            MonotonicClock::new(),
            Duration::from_millis(5),
        );
        supervisor.run(&mut NullSink);
        (kit.last_angle(0), kit.last_angle(3), supervisor.requests_handled())
    });

    let mut channel = TcpRequestChannel::connect(addr, Duration::from_secs(5)).unwrap();
    assert_eq!(channel.request(&"x".repeat(MAX_LINE + 10)).unwrap(), "error");
    assert_eq!(channel.request("").unwrap(), "error");
    assert_eq!(channel.request("exists:turnout:West").unwrap(), "ok");

    let mut client = PanelClient::new(channel);
    client.ensure_exists(DeviceKind::Turnout, "West").unwrap();
    client.ensure_exists(DeviceKind::Signal, "Starter").unwrap();
    assert_eq!(
        client.ensure_exists(DeviceKind::Signal, "Home"),
        Err(Error::NotFound {
            kind: DeviceKind::Signal,
            id: "Home".into()
        })
    );
    client.set_turnout("West", TurnoutSetting::Reverse).unwrap();
    client.set_signal("Starter", SignalAspect::Clear).unwrap();
    assert!(client.set_turnout("North", TurnoutSetting::Normal).is_err());
    client.shutdown().unwrap();

    let (west, starter, handled) = server.join().unwrap();
    assert_eq!(west, Some(125.0));
    assert_eq!(starter, Some(90.0));
    assert!(handled >= 10);
}
