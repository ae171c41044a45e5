//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).

use log::{debug, info};

use crate::app::commands::ActuatorId;
use crate::app::events::{ActuatorStatus, AppEvent, IdleReason};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

fn tag(actuator: ActuatorId) -> &'static str {
    match actuator {
        ActuatorId::Water => "WATER",
        ActuatorId::Food => "FOOD",
    }
}

struct Status<'a>(&'a ActuatorStatus);

impl core::fmt::Display for Status<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match (self.0.active, self.0.remaining_ms) {
            (true, Some(ms)) => write!(f, "on {}% ({}ms left)", self.0.intensity, ms),
            _ => write!(f, "off"),
        }
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => {
                info!("START | outputs idle");
            }
            AppEvent::CommandApplied {
                actuator: ActuatorId::Water,
                percent,
                delay_ms,
            } => {
                info!("WATER | {}% - {}s", percent, delay_ms / 1000);
            }
            AppEvent::CommandApplied {
                actuator: ActuatorId::Food,
                percent,
                delay_ms,
            } => {
                info!("FOOD | {}% - {}ms", percent, delay_ms);
            }
            AppEvent::ActuatorIdle { actuator, reason } => {
                let why = match reason {
                    IdleReason::Expired => "window elapsed",
                    IdleReason::Cancelled => "cancelled",
                };
                info!("{} | off ({})", tag(*actuator), why);
            }
            AppEvent::CommandIgnored => {
                debug!("CMD | ignored (no matching device)");
            }
            AppEvent::Connectivity { connected: true } => {
                info!("NET | connected");
            }
            AppEvent::Connectivity { connected: false } => {
                info!("NET | disconnected, manual mode");
            }
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | t={} | water {} | food {} @ {}° | ticks={}",
                    t.now,
                    Status(&t.water),
                    Status(&t.food),
                    t.food_position_deg,
                    t.ticks,
                );
            }
        }
    }
}
