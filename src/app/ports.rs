//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (clock, actuators, watchdog, event sinks) implement these
//! traits.  The [`AppService`](super::service::AppService) consumes them via
//! generics, so the domain core never touches hardware directly.

use super::clock::Timestamp;

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: hardware timer → domain)
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.  Wraps at 2^32; callers compare with
/// [`Timestamp::is_at_or_after`], never with raw subtraction.
pub trait ClockPort {
    fn now(&self) -> Timestamp;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command actuators.
///
/// Every call must be non-blocking; the control loop calls these on each
/// tick and relies on re-assertion being cheap.
pub trait ActuatorPort {
    /// Open (`false`) or close (`true`) the water relay.
    fn set_water_relay(&mut self, on: bool);

    /// Drive the food servo to `degrees` (0–180).
    fn set_food_position(&mut self, degrees: u8);
}

// ───────────────────────────────────────────────────────────────
// Liveness port (driven adapter: domain → hardware watchdog)
// ───────────────────────────────────────────────────────────────

/// Proof-of-life towards a supervisor that restarts the chip when starved.
pub trait WatchdogPort {
    /// Acknowledge the supervisor.  Must be called at least once per
    /// timeout period.
    fn feed(&mut self);

    /// Configured timeout in milliseconds.
    fn timeout_ms(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
