//! Supervisor loop tests: motion over simulated time, signal bounce,
//! shutdown and transport failures.

use std::time::Duration;

use layoutctl::app::events::AppEvent;
use layoutctl::app::service::LoopControl;

use crate::mock_hw::{Rig, Step};

/// Whether `expected` appears in `history` in order (gaps allowed).
fn visits_in_order(history: &[f32], expected: &[f32]) -> bool {
    let mut want = expected.iter().peekable();
    for angle in history {
        if want.peek() == Some(&angle) {
            want.next();
        }
    }
    want.peek().is_none()
}

fn moving_percent(reply: &str) -> Option<u8> {
    reply.strip_prefix("moving:").and_then(|n| n.parse().ok())
}

// ── Turnouts ──────────────────────────────────────────────────

#[test]
fn devices_start_at_their_configured_positions() {
    let rig = Rig::new();
    // West centred, East inverted and normal.
    assert_eq!(rig.kit.last_angle(0), Some(90.0));
    assert_eq!(rig.kit.last_angle(1), Some(125.0));
    assert_eq!(rig.kit.last_angle(3), Some(67.5));
}

#[test]
fn turnout_reverse_is_acknowledged_before_it_moves() {
    let mut rig = Rig::new();
    assert_eq!(rig.call("set:turnout:West:reverse"), "ok");
    // Dispatch and tick share the same instant, so nothing has moved yet.
    assert_eq!(rig.kit.last_angle(0), Some(90.0));
    assert!(moving_percent(&rig.call("status:turnout:West")).is_some());
}

#[test]
fn turnout_takes_throw_over_speed_to_settle() {
    let mut rig = Rig::new();
    assert_eq!(rig.call("set:turnout:West:reverse"), "ok");

    // 35 degrees at 30 deg/s is just under 1.17 s.
    rig.idle_for(Duration::from_millis(1100));
    assert!(moving_percent(&rig.call("status:turnout:West")).is_some());
    let angle = rig.kit.last_angle(0).unwrap();
    assert!(angle > 90.0 && angle < 125.0, "mid-throw angle {angle}");

    rig.idle_for(Duration::from_millis(100));
    assert_eq!(rig.call("status:turnout:West"), "set");
    assert_eq!(rig.kit.last_angle(0), Some(125.0));
    assert_eq!(rig.sink.settled(), vec![("West".to_owned(), 35.0)]);
}

#[test]
fn turnout_progress_never_decreases() {
    let mut rig = Rig::new();
    rig.call("set:turnout:West:reverse");

    let mut last = 0;
    let mut polls = 0;
    loop {
        let reply = rig.call("status:turnout:West");
        if reply == "set" {
            break;
        }
        let pct = moving_percent(&reply).unwrap_or_else(|| panic!("unexpected '{reply}'"));
        assert!(pct >= last, "progress went {last} -> {pct}");
        assert!(pct <= 99);
        last = pct;
        polls += 1;
        assert!(polls < 200, "turnout never settled");
    }
    assert!(last > 90);
}

#[test]
fn inverted_turnout_mirrors_output() {
    let mut rig = Rig::new();
    rig.call("set:turnout:East:reverse");
    rig.idle_for(Duration::from_secs(3));
    assert_eq!(rig.call("status:turnout:East"), "set");
    assert_eq!(rig.kit.last_angle(1), Some(55.0));
}

#[test]
fn retarget_mid_move_reverses_from_current_position() {
    let mut rig = Rig::new();
    rig.call("set:turnout:West:reverse");
    rig.idle_for(Duration::from_millis(500));
    let turned_at = rig.kit.last_angle(0).unwrap();
    assert!(turned_at > 90.0);

    rig.call("set:turnout:West:normal");
    rig.idle_for(Duration::from_millis(100));
    assert!(rig.kit.last_angle(0).unwrap() < turned_at);

    rig.idle_for(Duration::from_secs(3));
    assert_eq!(rig.kit.last_angle(0), Some(55.0));
    assert_eq!(rig.call("status:turnout:West"), "set");
}

#[test]
fn idle_devices_are_not_rewritten() {
    let mut rig = Rig::new();
    let before = rig.kit.history(1).len();
    rig.call("set:turnout:West:reverse");
    rig.idle_for(Duration::from_secs(2));
    assert_eq!(rig.kit.history(1).len(), before);
}

// ── Signals ───────────────────────────────────────────────────

#[test]
fn signal_clear_bounces_then_rests_at_clear() {
    let mut rig = Rig::new();
    assert_eq!(rig.call("set:signal:Starter:clear"), "ok");
    rig.idle_for(Duration::from_secs(3));

    let history = rig.kit.history(3);
    assert!(
        visits_in_order(&history, &[90.0, 86.0, 90.0, 88.0, 90.0]),
        "lift bounce not visited in order: {history:?}"
    );
    assert_eq!(history.last(), Some(&90.0));
    assert_eq!(rig.call("status:signal:Starter"), "set");
}

#[test]
fn signal_danger_bounces_then_rests_at_danger() {
    let mut rig = Rig::new();
    rig.call("set:signal:Starter:clear");
    rig.idle_for(Duration::from_secs(3));
    let lifted = rig.kit.history(3).len();

    assert_eq!(rig.call("set:signal:Starter:danger"), "ok");
    rig.idle_for(Duration::from_secs(4));

    let history = rig.kit.history(3)[lifted..].to_vec();
    assert!(
        visits_in_order(
            &history,
            &[45.0, 57.0, 45.0, 54.0, 45.0, 51.0, 45.0, 48.0, 45.0]
        ),
        "drop bounce not visited in order: {history:?}"
    );
    assert_eq!(history.last(), Some(&45.0));
    assert_eq!(rig.call("status:signal:Starter"), "set");
}

#[test]
fn signal_progress_spans_whole_bounce() {
    let mut rig = Rig::new();
    rig.call("set:signal:Starter:clear");

    let mut last = 0;
    let mut polls = 0;
    loop {
        let reply = rig.call("status:signal:Starter");
        if reply == "set" {
            break;
        }
        let pct = moving_percent(&reply).unwrap();
        assert!(pct >= last, "progress went {last} -> {pct}");
        last = pct;
        polls += 1;
        assert!(polls < 500, "signal never settled");
    }
}

#[test]
fn repeated_danger_at_danger_does_not_bounce() {
    let mut rig = Rig::with_layout(
        r#"{ "signals": [{ "id": "Home", "channel": 0, "set_to": "danger" }] }"#,
    );
    let before = rig.kit.history(0);
    assert_eq!(before, vec![45.0]);

    assert_eq!(rig.call("set:signal:Home:danger"), "ok");
    assert_eq!(rig.call("status:signal:Home"), "set");
    rig.idle_for(Duration::from_secs(1));
    assert_eq!(rig.kit.history(0), before);
}

#[test]
fn signal_without_bounce_moves_straight() {
    let mut rig = Rig::with_layout(
        r#"{ "signals": [{ "id": "Home", "channel": 0, "bounce": false }] }"#,
    );
    rig.call("set:signal:Home:clear");
    rig.idle_for(Duration::from_secs(2));
    let history = rig.kit.history(0);
    assert!(history.windows(2).all(|w| w[1] >= w[0]));
    assert_eq!(history.last(), Some(&90.0));
}

// ── Faults ────────────────────────────────────────────────────

#[test]
fn servo_fault_reports_error_until_a_write_succeeds() {
    let mut rig = Rig::new();
    rig.kit.set_failing(0, true);
    assert_eq!(rig.call("set:turnout:West:reverse"), "ok");
    rig.idle_for(Duration::from_millis(50));
    assert_eq!(rig.call("status:turnout:West"), "error");

    rig.kit.set_failing(0, false);
    rig.idle_for(Duration::from_millis(20));
    assert!(moving_percent(&rig.call("status:turnout:West")).is_some());

    rig.idle_for(Duration::from_secs(2));
    assert_eq!(rig.call("status:turnout:West"), "set");
}

// ── Loop control ──────────────────────────────────────────────

#[test]
fn shutdown_replies_bye_and_stops_without_ticking() {
    let mut rig = Rig::new();
    rig.transport.request("set:turnout:West:reverse");
    rig.transport.request("shutdown");
    rig.supervisor.run(&mut rig.sink);

    assert_eq!(rig.transport.replies(), vec!["ok", "bye"]);
    // Initial placement plus the single tick after `set`.
    assert_eq!(rig.kit.history(0).len(), 2);
    assert_eq!(rig.supervisor.requests_handled(), 2);
    assert!(matches!(rig.sink.events.first(), Some(AppEvent::Started { turnouts: 2, signals: 1 })));
    assert_eq!(rig.sink.events.last(), Some(&AppEvent::Stopped));
}

#[test]
fn transport_errors_do_not_stop_the_loop() {
    let mut rig = Rig::new();
    rig.transport.push(Step::Fail);
    rig.transport.push(Step::Idle);
    rig.transport.request("exists:turnout:West");

    for _ in 0..3 {
        assert_eq!(rig.supervisor.poll_once(&mut rig.sink), LoopControl::Continue);
    }
    assert_eq!(rig.transport.replies(), vec!["ok"]);
    assert_eq!(rig.supervisor.iterations(), 3);
    assert_eq!(rig.supervisor.requests_handled(), 1);
}

#[test]
fn motion_continues_without_traffic() {
    let mut rig = Rig::new();
    rig.call("set:signal:Starter:clear");
    rig.call("set:turnout:West:normal");
    rig.idle_for(Duration::from_secs(3));

    assert!(!rig.supervisor.registry().any_active());
    let mut settled = rig.sink.settled();
    settled.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(
        settled,
        vec![("Starter".to_owned(), 90.0), ("West".to_owned(), -35.0)]
    );
}
