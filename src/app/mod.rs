//! Application core: pure domain logic, zero I/O.
//!
//! Actuator timing for the PetFeeder: the deadline tracker, the command
//! handler, the per-tick control evaluation and the loop latency budget.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod clock;
pub mod commands;
pub mod deadline;
pub mod events;
pub mod liveness;
pub mod ports;
pub mod service;
pub mod state;
