//! Application service, the hexagonal core.
//!
//! [`AppService`] owns both actuator states and the timing profiles.  It
//! is the explicit context the control loop and the command path share;
//! there is no global state.  All I/O flows through port traits injected
//! at call sites, so the service runs unchanged against mock adapters.
//!
//! ```text
//!  AppCommand ──▶ ┌─────────────────────────┐ ──▶ EventSink
//!                 │        AppService        │
//! ActuatorPort ◀──│  water · food · swing    │
//!                 └─────────────────────────┘
//!                          ▲ tick(now)
//! ```
//!
//! Both entry points are bounded and non-blocking.  A command's effect on
//! outputs and deadline is visible to the very next [`AppService::tick`].

use log::info;

use crate::config::FeederConfig;

use super::clock::Timestamp;
use super::commands::{ActuatorId, AppCommand};
use super::events::{ActuatorStatus, AppEvent, IdleReason, StatusSnapshot};
use super::ports::{ActuatorPort, EventSink};
use super::state::{ActuatorState, MAX_PERCENT, SwingProfile, WindowProfile};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService {
    water: ActuatorState,
    food: ActuatorState,
    water_window: WindowProfile,
    food_window: WindowProfile,
    swing: SwingProfile,
    /// Last angle written to the food servo.
    food_position_deg: u8,
    tick_count: u64,
}

impl AppService {
    pub fn new(config: &FeederConfig) -> Self {
        let swing = SwingProfile::from_config(config);
        Self {
            water: ActuatorState::idle(),
            food: ActuatorState::idle(),
            water_window: WindowProfile::water(config),
            food_window: WindowProfile::food(config),
            swing,
            food_position_deg: swing.neutral_deg,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive both outputs to their idle posture.  Safe to call before the
    /// network is up; the service never waits on connectivity.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        self.water = ActuatorState::idle();
        self.food = ActuatorState::idle();
        hw.set_water_relay(false);
        self.set_food(hw, self.swing.neutral_deg);
        sink.emit(&AppEvent::Started);
        info!("AppService started: relay off, servo at {}°", self.swing.neutral_deg);
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply one command.  The last command for an actuator always wins:
    /// a nonzero level replaces the running window, zero cancels it.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now: Timestamp,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::SetLevel { actuator, percent } => {
                self.set_level(actuator, percent, now, hw, sink);
            }
            AppCommand::AllOff => {
                for actuator in ActuatorId::ALL {
                    if self.state_mut(actuator).cancel(0) {
                        sink.emit(&AppEvent::ActuatorIdle {
                            actuator,
                            reason: IdleReason::Cancelled,
                        });
                    }
                    self.drive(actuator, now, hw);
                }
            }
        }
    }

    fn set_level(
        &mut self,
        actuator: ActuatorId,
        percent: u8,
        now: Timestamp,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        let percent = percent.min(MAX_PERCENT);
        let delay_ms = self.window(actuator).window_ms(percent);

        sink.emit(&AppEvent::CommandApplied {
            actuator,
            percent,
            delay_ms,
        });

        if percent == 0 {
            if self.state_mut(actuator).cancel(0) {
                sink.emit(&AppEvent::ActuatorIdle {
                    actuator,
                    reason: IdleReason::Cancelled,
                });
            }
        } else {
            self.state_mut(actuator).activate(percent, delay_ms, now);
        }

        self.drive(actuator, now, hw);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// One control-loop evaluation: expire due windows first, then assert
    /// the steady-state output of each actuator.
    ///
    /// Running expiry before the swing computation means the remaining
    /// time is never read off a deadline that has already passed.
    pub fn tick(
        &mut self,
        now: Timestamp,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        self.tick_count = self.tick_count.wrapping_add(1);

        for actuator in ActuatorId::ALL {
            if self.state_mut(actuator).expire_if_due(now) {
                sink.emit(&AppEvent::ActuatorIdle {
                    actuator,
                    reason: IdleReason::Expired,
                });
            }
            self.drive(actuator, now, hw);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self, actuator: ActuatorId) -> &ActuatorState {
        match actuator {
            ActuatorId::Water => &self.water,
            ActuatorId::Food => &self.food,
        }
    }

    pub fn is_active(&self, actuator: ActuatorId) -> bool {
        self.state(actuator).is_active()
    }

    pub fn food_position(&self) -> u8 {
        self.food_position_deg
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn snapshot(&self, now: Timestamp) -> StatusSnapshot {
        let status = |st: &ActuatorState| ActuatorStatus {
            active: st.is_active(),
            intensity: st.intensity(),
            remaining_ms: st.remaining(now),
        };
        StatusSnapshot {
            now,
            water: status(&self.water),
            food: status(&self.food),
            food_position_deg: self.food_position_deg,
            ticks: self.tick_count,
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn state_mut(&mut self, actuator: ActuatorId) -> &mut ActuatorState {
        match actuator {
            ActuatorId::Water => &mut self.water,
            ActuatorId::Food => &mut self.food,
        }
    }

    fn window(&self, actuator: ActuatorId) -> &WindowProfile {
        match actuator {
            ActuatorId::Water => &self.water_window,
            ActuatorId::Food => &self.food_window,
        }
    }

    /// Translate an actuator's state into its output for this instant.
    fn drive(&mut self, actuator: ActuatorId, now: Timestamp, hw: &mut impl ActuatorPort) {
        match actuator {
            ActuatorId::Water => hw.set_water_relay(self.water.is_active()),
            ActuatorId::Food => {
                let deg = match self.food.remaining(now) {
                    Some(remaining) => self.swing.position(remaining),
                    None => self.swing.neutral_deg,
                };
                self.set_food(hw, deg);
            }
        }
    }

    fn set_food(&mut self, hw: &mut impl ActuatorPort, deg: u8) {
        hw.set_food_position(deg);
        self.food_position_deg = deg;
    }
}
