//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Delivery is best-effort;
//! nothing in the core depends on an event being seen.

use super::clock::Timestamp;
use super::commands::ActuatorId;

/// Why an actuator went back to idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleReason {
    /// The activation window ran out.
    Expired,
    /// A zero-intensity command or an all-off request.
    Cancelled,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service drove both outputs to idle at boot.
    Started,

    /// A command was applied and a new window armed.
    CommandApplied {
        actuator: ActuatorId,
        percent: u8,
        delay_ms: u32,
    },

    /// An actuator returned to idle.
    ActuatorIdle {
        actuator: ActuatorId,
        reason: IdleReason,
    },

    /// A delivery that named no known device was dropped.
    CommandIgnored,

    /// The network link came up or went down.
    Connectivity { connected: bool },

    /// Periodic status snapshot.
    Telemetry(StatusSnapshot),
}

/// Point-in-time view of one actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorStatus {
    pub active: bool,
    /// Last commanded intensity (diagnostics only).
    pub intensity: u8,
    /// Milliseconds until shutoff, if a window is running.
    pub remaining_ms: Option<u32>,
}

/// A point-in-time telemetry snapshot suitable for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub now: Timestamp,
    pub water: ActuatorStatus,
    pub food: ActuatorStatus,
    pub food_position_deg: u8,
    pub ticks: u64,
}
