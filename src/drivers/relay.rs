//! Water pump relay driver.
//!
//! A single digital output switches the relay coil: HIGH closes the
//! contact and powers the pump, LOW opens it.
//!
//! ## Safety contract
//!
//! LOW is the fail-safe level; `hw_init` drives it before anything else
//! runs, and the control loop re-asserts it every tick while idle.  This
//! driver is a dumb actuator.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::error::ActuatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Open,
    Closed,
}

pub struct WaterRelay<P> {
    pin: P,
    state: RelayState,
}

impl<P: OutputPin> WaterRelay<P> {
    /// Wrap an output the caller has already driven LOW.
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            state: RelayState::Open,
        }
    }

    /// Close (`true`) or open (`false`) the relay.  Writes only on change.
    pub fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        let target = if on { RelayState::Closed } else { RelayState::Open };
        if target == self.state {
            return Ok(());
        }
        self.write(target)
    }

    /// Drive LOW unconditionally.
    pub fn force_off(&mut self) -> Result<(), ActuatorError> {
        self.write(RelayState::Open)
    }

    fn write(&mut self, target: RelayState) -> Result<(), ActuatorError> {
        let result = match target {
            RelayState::Closed => self.pin.set_high(),
            RelayState::Open => self.pin.set_low(),
        };
        if let Err(e) = result {
            warn!("Relay: GPIO write failed ({:?})", e);
            return Err(ActuatorError::GpioWriteFailed);
        }
        self.state = target;
        Ok(())
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    pub fn is_on(&self) -> bool {
        self.state == RelayState::Closed
    }
}
