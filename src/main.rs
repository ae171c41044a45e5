//! PetFeeder Firmware: Main Entry Point
//!
//! Hexagonal architecture with a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   Esp32TimeAdapter  Watchdog   │
//! │  (ActuatorPort)    (EventSink)    (ClockPort)       (TWDT)     │
//! │  WifiAdapter       SmartHomeAdapter ──▶ CommandQueue           │
//! │  (Connectivity)    (device registration, deliveries)          │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  water window · food window + swing · LoopBudget       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{error, info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::EspWifi;

use petfeeder::adapters::command_queue::CommandQueue;
use petfeeder::adapters::hardware::HardwareAdapter;
use petfeeder::adapters::log_sink::LogEventSink;
use petfeeder::adapters::smart_home::SmartHomeAdapter;
use petfeeder::adapters::time::Esp32TimeAdapter;
use petfeeder::adapters::wifi::{ConnectivityPort, WifiAdapter};
use petfeeder::app::commands::{AppCommand, DeviceMap};
use petfeeder::app::deadline::Deadline;
use petfeeder::app::events::AppEvent;
use petfeeder::app::liveness::LoopBudget;
use petfeeder::app::ports::{ClockPort, EventSink, WatchdogPort};
use petfeeder::app::service::AppService;
use petfeeder::config::FeederConfig;
use petfeeder::drivers::hw_init::{self, GpioOutput, LedcChannel};
use petfeeder::drivers::relay::WaterRelay;
use petfeeder::drivers::servo::{FoodServo, PulseRange};
use petfeeder::drivers::status_led::StatusLed;
use petfeeder::drivers::watchdog::Watchdog;
use petfeeder::error::CommsError;

/// Station credentials baked in at build time.
const WIFI_SSID: &str = match option_env!("PETFEEDER_WIFI_SSID") {
    Some(s) => s,
    None => "",
};
const WIFI_PASSWORD: &str = match option_env!("PETFEEDER_WIFI_PASSWORD") {
    Some(s) => s,
    None => "",
};

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  PetFeeder v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = FeederConfig::default();
    config.validate().map_err(petfeeder::error::Error::from)?;

    // ── 2. Initialise hardware peripherals ────────────────────
    if let Err(e) = hw_init::init_peripherals(&config) {
        // Without a relay and servo there is nothing safe to do.
        error!("HAL init failed: {}, halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    let mut hw = HardwareAdapter::new(
        WaterRelay::new(GpioOutput::water_relay()),
        FoodServo::new(LedcChannel::food_servo(), PulseRange::from_config(&config)),
    );
    let mut status_led = StatusLed::new(GpioOutput::status_led());
    let mut log_sink = LogEventSink::new();
    let clock = Esp32TimeAdapter::new();

    // ── 3. Outputs idle before anything can block ─────────────
    let mut app = AppService::new(&config);
    app.start(&mut hw, &mut log_sink);

    // ── 4. WiFi (bounded; failure means manual mode) ──────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let mut wifi = WifiAdapter::from_config(&config);
    wifi.attach_driver(EspWifi::new(peripherals.modem, sysloop, Some(nvs))?);
    if let Err(e) = wifi.set_credentials(WIFI_SSID, WIFI_PASSWORD) {
        warn!("WiFi: {} (build with PETFEEDER_WIFI_SSID set)", e);
    }
    let connected = match wifi.connect() {
        Ok(()) => true,
        Err(e) => {
            warn!("{} ({}), continuing in manual mode", CommsError::from(e), e);
            false
        }
    };
    log_sink.emit(&AppEvent::Connectivity { connected });
    status_led.set(connected);

    // ── 5. Smart-home device registration ─────────────────────
    let queue = CommandQueue::new();
    let devices = DeviceMap::from_config(&config);
    // The voice-assistant protocol handler plugs in here: it calls
    // `smart_home.deliver(device, brightness)` for each received command.
    let mut smart_home = SmartHomeAdapter::new(&queue, devices.clone());
    if let Err(e) = smart_home.register(connected) {
        warn!("{}, running in manual mode", e);
    }

    // ── 6. Servo neutral, then arm the watchdog ───────────────
    // Boot connect may take longer than the watchdog timeout, so the
    // task only subscribes once it is over.
    app.handle_command(AppCommand::AllOff, clock.now(), &mut hw, &mut log_sink);
    let mut watchdog = Watchdog::new(config.watchdog_timeout_secs);
    let mut budget = LoopBudget::for_watchdog_timeout(watchdog.timeout_ms());

    let telemetry_period_ms = config.telemetry_interval_secs.saturating_mul(1000);
    let mut next_telemetry = Deadline::unset();
    next_telemetry.arm(telemetry_period_ms, clock.now());

    info!("System ready. Entering control loop.");

    // ── 7. Control loop ───────────────────────────────────────
    loop {
        let now = clock.now();
        budget.begin(now);

        // Network supervision; never blocks.
        let was_connected = wifi.is_connected();
        wifi.poll(now);
        let is_connected = wifi.is_connected();
        if was_connected != is_connected {
            log_sink.emit(&AppEvent::Connectivity {
                connected: is_connected,
            });
            if is_connected {
                if let Err(e) = smart_home.register(true) {
                    warn!("{}", e);
                }
            } else {
                smart_home.invalidate();
            }
        }
        status_led.set(is_connected);

        // Commands first, in arrival order, then the tick sees them.
        queue.drain(|raw| match devices.translate(&raw) {
            Some(cmd) => app.handle_command(cmd, now, &mut hw, &mut log_sink),
            None => log_sink.emit(&AppEvent::CommandIgnored),
        });

        app.tick(now, &mut hw, &mut log_sink);

        if next_telemetry.is_expired(now) {
            log_sink.emit(&AppEvent::Telemetry(app.snapshot(now)));
            next_telemetry.arm(telemetry_period_ms, now);
        }

        budget.finish(clock.now(), &mut watchdog);

        FreeRtos::delay_ms(config.control_loop_interval_ms);
    }
}
