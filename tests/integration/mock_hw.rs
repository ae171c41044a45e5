//! Mock adapters for integration tests.
//!
//! Records every actuator call so tests can assert on the full command
//! history without touching real GPIO/LEDC registers.

use petfeeder::app::clock::Timestamp;
use petfeeder::app::commands::ActuatorId;
use petfeeder::app::events::{AppEvent, IdleReason};
use petfeeder::app::ports::{ActuatorPort, ClockPort, EventSink, WatchdogPort};

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorCall {
    WaterRelay(bool),
    FoodPosition(u8),
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<ActuatorCall>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self { calls: Vec::new() }
    }

    pub fn water_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::WaterRelay(on) => Some(*on),
                ActuatorCall::FoodPosition(_) => None,
            })
            .unwrap_or(false)
    }

    pub fn food_position(&self) -> Option<u8> {
        self.calls.iter().rev().find_map(|c| match c {
            ActuatorCall::FoodPosition(deg) => Some(*deg),
            ActuatorCall::WaterRelay(_) => None,
        })
    }

    /// Distinct food positions commanded, in order, with repeats collapsed.
    pub fn food_trace(&self) -> Vec<u8> {
        let mut out: Vec<u8> = Vec::new();
        for c in &self.calls {
            if let ActuatorCall::FoodPosition(deg) = c {
                if out.last() != Some(deg) {
                    out.push(*deg);
                }
            }
        }
        out
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl ActuatorPort for MockHardware {
    fn set_water_relay(&mut self, on: bool) {
        self.calls.push(ActuatorCall::WaterRelay(on));
    }

    fn set_food_position(&mut self, degrees: u8) {
        self.calls.push(ActuatorCall::FoodPosition(degrees));
    }
}

// ── LogSink ───────────────────────────────────────────────────

pub struct LogSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl LogSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn expiries(&self, actuator: ActuatorId) -> usize {
        self.events
            .iter()
            .filter(|e| {
                matches!(e, AppEvent::ActuatorIdle { actuator: a, reason: IdleReason::Expired } if *a == actuator)
            })
            .count()
    }

    pub fn cancellations(&self, actuator: ActuatorId) -> usize {
        self.events
            .iter()
            .filter(|e| {
                matches!(e, AppEvent::ActuatorIdle { actuator: a, reason: IdleReason::Cancelled } if *a == actuator)
            })
            .count()
    }

    pub fn last_applied_delay(&self) -> Option<u32> {
        self.events.iter().rev().find_map(|e| match e {
            AppEvent::CommandApplied { delay_ms, .. } => Some(*delay_ms),
            _ => None,
        })
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── ManualClock ───────────────────────────────────────────────

pub struct ManualClock {
    pub now: Timestamp,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn at(ms: u32) -> Self {
        Self {
            now: Timestamp::from_millis(ms),
        }
    }

    pub fn advance(&mut self, ms: u32) -> Timestamp {
        self.now = self.now.wrapping_add(ms);
        self.now
    }
}

impl ClockPort for ManualClock {
    fn now(&self) -> Timestamp {
        self.now
    }
}

// ── MockWatchdog ──────────────────────────────────────────────

pub struct MockWatchdog {
    pub timeout_ms: u32,
    pub feeds: u32,
}

#[allow(dead_code)]
impl MockWatchdog {
    pub fn new(timeout_ms: u32) -> Self {
        Self {
            timeout_ms,
            feeds: 0,
        }
    }
}

impl WatchdogPort for MockWatchdog {
    fn feed(&mut self) {
        self.feeds += 1;
    }

    fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }
}
