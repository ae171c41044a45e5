//! Hardware adapter: bridges the actuator drivers to [`ActuatorPort`].
//!
//! Owns the relay and servo drivers.  Generic over the `embedded-hal`
//! output types so the same adapter runs on the LEDC/GPIO handles from
//! [`hw_init`](crate::drivers::hw_init) and on recording pins in tests.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use log::error;

use crate::app::ports::ActuatorPort;
use crate::drivers::relay::WaterRelay;
use crate::drivers::servo::FoodServo;

pub struct HardwareAdapter<R, C> {
    relay: WaterRelay<R>,
    servo: FoodServo<C>,
}

impl<R: OutputPin, C: SetDutyCycle> HardwareAdapter<R, C> {
    pub fn new(relay: WaterRelay<R>, servo: FoodServo<C>) -> Self {
        Self { relay, servo }
    }

    pub fn relay(&self) -> &WaterRelay<R> {
        &self.relay
    }

    pub fn servo(&self) -> &FoodServo<C> {
        &self.servo
    }
}

impl<R: OutputPin, C: SetDutyCycle> ActuatorPort for HardwareAdapter<R, C> {
    fn set_water_relay(&mut self, on: bool) {
        if self.relay.set(on).is_err() && on {
            // Could not close the relay; make sure it is not half-driven.
            if let Err(e) = self.relay.force_off() {
                error!("Relay: fail-safe off also failed: {}", e);
            }
        }
    }

    fn set_food_position(&mut self, degrees: u8) {
        // The driver logs the failure and retries on the next tick,
        // because it only records an angle once it has been written.
        let _ = self.servo.set_angle(degrees);
    }
}
