//! Integration tests: smart-home delivery → queue → AppService, plus the
//! loop's connectivity and watchdog duties.
//!
//! `run_iteration` mirrors one pass of the firmware control loop so the
//! ordering rules (commands before tick, feed every pass) are exercised
//! end to end.

use crate::mock_hw::{LogSink, ManualClock, MockHardware, MockWatchdog};

use petfeeder::adapters::command_queue::{CommandQueue, QUEUE_DEPTH};
use petfeeder::adapters::smart_home::SmartHomeAdapter;
use petfeeder::adapters::wifi::{ConnectivityPort, WifiAdapter};
use petfeeder::app::clock::Timestamp;
use petfeeder::app::commands::{ActuatorId, DeviceMap};
use petfeeder::app::events::AppEvent;
use petfeeder::app::liveness::LoopBudget;
use petfeeder::app::ports::{ClockPort, EventSink, WatchdogPort};
use petfeeder::app::service::AppService;
use petfeeder::config::FeederConfig;

struct Rig {
    app: AppService,
    hw: MockHardware,
    sink: LogSink,
    clock: ManualClock,
    watchdog: MockWatchdog,
    budget: LoopBudget,
    devices: DeviceMap,
}

impl Rig {
    fn new() -> Self {
        let config = FeederConfig::default();
        let mut app = AppService::new(&config);
        let mut hw = MockHardware::new();
        let mut sink = LogSink::new();
        app.start(&mut hw, &mut sink);
        let watchdog = MockWatchdog::new(config.watchdog_timeout_secs * 1000);
        let budget = LoopBudget::for_watchdog_timeout(watchdog.timeout_ms());
        Self {
            app,
            hw,
            sink,
            clock: ManualClock::at(0),
            watchdog,
            budget,
            devices: DeviceMap::from_config(&config),
        }
    }

    fn run_iteration(&mut self, queue: &CommandQueue, body_ms: u32) {
        let now = self.clock.now();
        self.budget.begin(now);

        let app = &mut self.app;
        let hw = &mut self.hw;
        let sink = &mut self.sink;
        let devices = &self.devices;
        queue.drain(|raw| match devices.translate(&raw) {
            Some(cmd) => app.handle_command(cmd, now, &mut *hw, &mut *sink),
            None => sink.emit(&AppEvent::CommandIgnored),
        });
        self.app.tick(now, &mut self.hw, &mut self.sink);

        let end = self.clock.advance(body_ms);
        self.budget.finish(end, &mut self.watchdog);
    }
}

#[test]
fn delivered_brightness_becomes_a_window() {
    let queue = CommandQueue::new();
    let mut rig = Rig::new();
    let sh = SmartHomeAdapter::new(&queue, rig.devices.clone());

    rig.clock = ManualClock::at(1_000);
    assert!(sh.deliver(Some("Cat Water"), 26)); // 26·100/255 = 10 %
    rig.run_iteration(&queue, 1);

    assert!(rig.hw.water_on());
    assert_eq!(rig.sink.last_applied_delay(), Some(70_000));
    assert_eq!(
        rig.app.state(ActuatorId::Water).deadline().at(),
        Some(Timestamp::from_millis(71_000))
    );
}

#[test]
fn unknown_and_targetless_deliveries_are_ignored() {
    let queue = CommandQueue::new();
    let mut rig = Rig::new();
    let sh = SmartHomeAdapter::new(&queue, rig.devices.clone());

    sh.deliver(Some("Porch Light"), 255);
    sh.deliver(None, 255);
    rig.run_iteration(&queue, 1);

    let ignored = rig
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::CommandIgnored))
        .count();
    assert_eq!(ignored, 2);
    assert!(!rig.hw.water_on());
    assert!(!rig.app.is_active(ActuatorId::Food));
}

#[test]
fn queued_commands_apply_in_arrival_order() {
    let queue = CommandQueue::new();
    let mut rig = Rig::new();
    let sh = SmartHomeAdapter::new(&queue, rig.devices.clone());

    sh.deliver(Some("Cat Food"), 255);
    sh.deliver(Some("Cat Food"), 0);
    rig.run_iteration(&queue, 1);
    assert!(!rig.app.is_active(ActuatorId::Food), "last command wins");

    sh.deliver(Some("Cat Food"), 0);
    sh.deliver(Some("Cat Food"), 255);
    rig.run_iteration(&queue, 1);
    assert!(rig.app.is_active(ActuatorId::Food));
}

#[test]
fn overflowing_queue_still_accepts_the_stop() {
    let queue = CommandQueue::new();
    let mut rig = Rig::new();
    let sh = SmartHomeAdapter::new(&queue, rig.devices.clone());

    for _ in 0..QUEUE_DEPTH {
        assert!(sh.deliver(Some("Cat Water"), 255));
    }
    assert!(sh.deliver(Some("Cat Water"), 0), "stop must be queued");
    rig.run_iteration(&queue, 1);

    assert!(!rig.hw.water_on());
    assert!(!rig.app.is_active(ActuatorId::Water));
    assert_eq!(queue.evicted(), 1);
    assert!(queue.is_empty());
}

#[test]
fn watchdog_fed_every_iteration() {
    let queue = CommandQueue::new();
    let mut rig = Rig::new();
    for _ in 0..50 {
        rig.run_iteration(&queue, 1);
    }
    assert_eq!(rig.watchdog.feeds, 50);
    assert_eq!(rig.budget.overruns(), 0);
    assert_eq!(rig.budget.max_body_ms(), 2_500);
}

#[test]
fn slow_iteration_counts_as_overrun_but_still_feeds() {
    let queue = CommandQueue::new();
    let mut rig = Rig::new();
    rig.run_iteration(&queue, 2_501);
    assert_eq!(rig.budget.overruns(), 1);
    assert_eq!(rig.budget.worst_body_ms(), 2_501);
    assert_eq!(rig.watchdog.feeds, 1);
}

// ── Manual mode ───────────────────────────────────────────────

#[test]
fn manual_mode_still_expires_running_windows() {
    let queue = CommandQueue::new();
    let mut rig = Rig::new();
    let mut sh = SmartHomeAdapter::new(&queue, rig.devices.clone());

    let mut wifi = WifiAdapter::new(2, 0);
    wifi.set_credentials("HomeNet", "password1").unwrap();
    wifi.connect().unwrap();
    assert!(sh.register(wifi.is_connected()).is_ok());

    sh.deliver(Some("Cat Food"), 255); // 11 s window
    rig.run_iteration(&queue, 1);
    assert!(rig.app.is_active(ActuatorId::Food));

    // Link drops mid-window.
    wifi.set_sim_link(false);
    wifi.poll(rig.clock.now());
    assert!(!wifi.is_connected());
    sh.invalidate();

    rig.clock = ManualClock::at(11_000);
    rig.run_iteration(&queue, 1);
    assert!(!rig.app.is_active(ActuatorId::Food));
    assert_eq!(rig.hw.food_position(), Some(90));
    assert_eq!(rig.sink.expiries(ActuatorId::Food), 1);
}

#[test]
fn failed_boot_connect_then_recovery_reregisters() {
    let queue = CommandQueue::new();
    let rig = Rig::new();
    let mut sh = SmartHomeAdapter::new(&queue, rig.devices.clone());

    let mut wifi = WifiAdapter::new(3, 0);
    wifi.set_credentials("HomeNet", "password1").unwrap();
    wifi.set_sim_link(false);
    assert!(wifi.connect().is_err());
    assert!(wifi.is_manual_mode());
    assert!(sh.register(wifi.is_connected()).is_err());

    wifi.set_sim_link(true);
    let was = wifi.is_connected();
    wifi.poll(rig.clock.now());
    if !was && wifi.is_connected() {
        sh.register(true).unwrap();
    }
    assert!(sh.is_registered());
}
