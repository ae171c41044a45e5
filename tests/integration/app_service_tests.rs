//! Integration tests for the AppService → actuators pipeline.
//!
//! These run on the host (x86_64) and drive the service with explicit
//! timestamps, checking what reaches the relay and the servo.

use crate::mock_hw::{LogSink, MockHardware};

use petfeeder::app::clock::Timestamp;
use petfeeder::app::commands::{ActuatorId, AppCommand};
use petfeeder::app::events::AppEvent;
use petfeeder::app::service::AppService;
use petfeeder::config::FeederConfig;

const NEUTRAL: u8 = 90;
const POS_A: u8 = 120;
const POS_B: u8 = 60;

fn t(ms: u32) -> Timestamp {
    Timestamp::from_millis(ms)
}

fn make_app() -> (AppService, MockHardware, LogSink) {
    let mut app = AppService::new(&FeederConfig::default());
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    app.start(&mut hw, &mut sink);
    (app, hw, sink)
}

fn water(percent: u8) -> AppCommand {
    AppCommand::SetLevel {
        actuator: ActuatorId::Water,
        percent,
    }
}

fn food(percent: u8) -> AppCommand {
    AppCommand::SetLevel {
        actuator: ActuatorId::Food,
        percent,
    }
}

// ── Boot posture ──────────────────────────────────────────────

#[test]
fn start_drives_outputs_idle() {
    let (app, hw, sink) = make_app();
    assert!(!hw.water_on());
    assert_eq!(hw.food_position(), Some(NEUTRAL));
    assert!(!app.is_active(ActuatorId::Water));
    assert!(!app.is_active(ActuatorId::Food));
    assert_eq!(sink.events.first(), Some(&AppEvent::Started));
}

// ── Water window ──────────────────────────────────────────────

#[test]
fn water_ten_percent_runs_seventy_seconds() {
    let (mut app, mut hw, mut sink) = make_app();

    app.handle_command(water(10), t(1_000), &mut hw, &mut sink);
    assert!(hw.water_on(), "relay closes on the command itself");
    assert_eq!(sink.last_applied_delay(), Some(70_000));
    assert_eq!(
        app.state(ActuatorId::Water).deadline().at(),
        Some(t(71_000))
    );

    app.tick(t(70_999), &mut hw, &mut sink);
    assert!(hw.water_on());
    assert!(app.is_active(ActuatorId::Water));

    app.tick(t(71_000), &mut hw, &mut sink);
    assert!(!hw.water_on());
    assert!(!app.is_active(ActuatorId::Water));
    assert_eq!(sink.expiries(ActuatorId::Water), 1);
}

#[test]
fn expiry_fires_once() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(water(1), t(0), &mut hw, &mut sink);

    for now in (61_000..61_500).step_by(50) {
        app.tick(t(now), &mut hw, &mut sink);
    }
    assert_eq!(sink.expiries(ActuatorId::Water), 1);
    assert!(!hw.water_on());
}

#[test]
fn water_zero_opens_relay_immediately() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(water(80), t(0), &mut hw, &mut sink);
    assert!(hw.water_on());

    app.handle_command(water(0), t(5_000), &mut hw, &mut sink);
    assert!(!hw.water_on());
    assert!(!app.state(ActuatorId::Water).deadline().is_armed());
    assert_eq!(sink.cancellations(ActuatorId::Water), 1);
    // The window is still computed and reported.
    assert_eq!(sink.last_applied_delay(), Some(60_000));
}

#[test]
fn out_of_range_percent_is_clamped() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(water(250), t(0), &mut hw, &mut sink);
    assert_eq!(sink.last_applied_delay(), Some(160_000));
    assert_eq!(app.state(ActuatorId::Water).intensity(), 100);
}

// ── Replacement ───────────────────────────────────────────────

#[test]
fn later_command_replaces_deadline() {
    let (mut app, mut hw, mut sink) = make_app();

    app.handle_command(water(50), t(0), &mut hw, &mut sink); // → 110_000
    app.handle_command(water(1), t(10_000), &mut hw, &mut sink); // → 71_000

    app.tick(t(70_999), &mut hw, &mut sink);
    assert!(hw.water_on());
    app.tick(t(71_000), &mut hw, &mut sink);
    assert!(!hw.water_on(), "second command's deadline governs");

    app.tick(t(110_000), &mut hw, &mut sink);
    assert_eq!(sink.expiries(ActuatorId::Water), 1);
}

#[test]
fn shorter_then_longer_extends() {
    let (mut app, mut hw, mut sink) = make_app();

    app.handle_command(food(0), t(0), &mut hw, &mut sink);
    app.handle_command(food(10), t(0), &mut hw, &mut sink); // → 2_000
    app.handle_command(food(100), t(1_000), &mut hw, &mut sink); // → 12_000

    app.tick(t(2_000), &mut hw, &mut sink);
    assert!(app.is_active(ActuatorId::Food));
    app.tick(t(12_000), &mut hw, &mut sink);
    assert!(!app.is_active(ActuatorId::Food));
    assert_eq!(hw.food_position(), Some(NEUTRAL));
}

// ── Food swing ────────────────────────────────────────────────

#[test]
fn food_fifty_percent_swings_by_remaining_time() {
    let (mut app, mut hw, mut sink) = make_app();

    app.handle_command(food(50), t(0), &mut hw, &mut sink);
    assert_eq!(sink.last_applied_delay(), Some(6_000));
    assert_eq!(app.state(ActuatorId::Food).deadline().at(), Some(t(6_000)));

    app.tick(t(500), &mut hw, &mut sink); // 5500 left → phase 1
    assert_eq!(hw.food_position(), Some(POS_B));

    app.tick(t(1_500), &mut hw, &mut sink); // 4500 left → phase 0
    assert_eq!(hw.food_position(), Some(POS_A));

    app.tick(t(6_000), &mut hw, &mut sink);
    assert_eq!(hw.food_position(), Some(NEUTRAL));
    assert!(!app.is_active(ActuatorId::Food));
}

#[test]
fn food_swing_only_visits_two_positions() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(food(100), t(0), &mut hw, &mut sink); // 11 s window
    hw.clear();

    for now in (0..11_000).step_by(10) {
        app.tick(t(now), &mut hw, &mut sink);
        let pos = hw.food_position();
        assert!(pos == Some(POS_A) || pos == Some(POS_B), "at {now}: {pos:?}");
    }

    // Remaining time runs 11 000 → 10 ms: whole periods 11 down to 0,
    // each one a flip.
    assert_eq!(hw.food_trace().len(), 12);
}

#[test]
fn food_zero_goes_neutral_immediately() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(food(60), t(0), &mut hw, &mut sink);
    app.tick(t(1_000), &mut hw, &mut sink);

    app.handle_command(food(0), t(2_000), &mut hw, &mut sink);
    assert_eq!(hw.food_position(), Some(NEUTRAL));
    assert!(!app.is_active(ActuatorId::Food));

    // A deadline that was armed before the cancel never fires.
    app.tick(t(7_000), &mut hw, &mut sink);
    assert_eq!(sink.expiries(ActuatorId::Food), 0);
}

#[test]
fn actuators_are_independent() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(water(10), t(0), &mut hw, &mut sink);
    app.handle_command(food(10), t(0), &mut hw, &mut sink);

    app.tick(t(2_000), &mut hw, &mut sink);
    assert!(!app.is_active(ActuatorId::Food));
    assert!(app.is_active(ActuatorId::Water));
    assert!(hw.water_on());
}

#[test]
fn all_off_cancels_both() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(water(10), t(0), &mut hw, &mut sink);
    app.handle_command(food(10), t(0), &mut hw, &mut sink);

    app.handle_command(AppCommand::AllOff, t(100), &mut hw, &mut sink);
    assert!(!hw.water_on());
    assert_eq!(hw.food_position(), Some(NEUTRAL));
    assert_eq!(sink.cancellations(ActuatorId::Water), 1);
    assert_eq!(sink.cancellations(ActuatorId::Food), 1);
}

// ── Clock wrap ────────────────────────────────────────────────

#[test]
fn deadline_across_wrap_expires_on_time() {
    let (mut app, mut hw, mut sink) = make_app();
    let start = u32::MAX - 30_000;

    app.handle_command(water(0), t(start), &mut hw, &mut sink);
    app.handle_command(water(1), t(start), &mut hw, &mut sink); // 61 s, wraps
    let at = app.state(ActuatorId::Water).deadline().at();
    assert_eq!(at, Some(t(start.wrapping_add(61_000))));

    app.tick(t(u32::MAX), &mut hw, &mut sink);
    assert!(hw.water_on(), "must not expire at the wrap itself");
    app.tick(t(30_998), &mut hw, &mut sink);
    assert!(hw.water_on());
    app.tick(t(30_999), &mut hw, &mut sink);
    assert!(!hw.water_on());
}

#[test]
fn food_swing_across_wrap() {
    let (mut app, mut hw, mut sink) = make_app();
    let start = u32::MAX - 999;

    app.handle_command(food(50), t(start), &mut hw, &mut sink); // deadline 5000
    app.tick(t(500), &mut hw, &mut sink); // 4500 left → A
    assert_eq!(hw.food_position(), Some(POS_A));
    app.tick(t(1_500), &mut hw, &mut sink); // 3500 left → B
    assert_eq!(hw.food_position(), Some(POS_B));
}

// ── Telemetry ─────────────────────────────────────────────────

#[test]
fn snapshot_reports_remaining_time() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(water(10), t(1_000), &mut hw, &mut sink);
    app.tick(t(11_000), &mut hw, &mut sink);

    let snap = app.snapshot(t(11_000));
    assert!(snap.water.active);
    assert_eq!(snap.water.intensity, 10);
    assert_eq!(snap.water.remaining_ms, Some(60_000));
    assert!(!snap.food.active);
    assert_eq!(snap.food.remaining_ms, None);
    assert_eq!(snap.food_position_deg, NEUTRAL);
    assert_eq!(snap.ticks, 1);
}
