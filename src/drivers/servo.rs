//! Hobby servo driver for the food dispenser.
//!
//! Position is encoded as the high time of a fixed-rate PWM frame:
//! `min_pulse_us` at 0°, `max_pulse_us` at 180°, linear in between.
//! The LEDC channel runs the frame; this driver converts angles into duty
//! counts and skips redundant register writes, since the control loop
//! re-asserts the position on every tick.

use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::config::FeederConfig;
use crate::error::ActuatorError;

pub const MAX_ANGLE_DEG: u8 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseRange {
    pub min_us: u16,
    pub max_us: u16,
    pub frame_us: u32,
}

impl PulseRange {
    pub fn from_config(config: &FeederConfig) -> Self {
        Self {
            min_us: config.servo_min_pulse_us,
            max_us: config.servo_max_pulse_us,
            frame_us: 1_000_000 / config.servo_frequency_hz.max(1),
        }
    }

    /// High time for `degrees`, clamped to 0–180.
    pub fn pulse_us(&self, degrees: u8) -> u32 {
        let deg = u32::from(degrees.min(MAX_ANGLE_DEG));
        let span = u32::from(self.max_us.saturating_sub(self.min_us));
        u32::from(self.min_us) + span * deg / u32::from(MAX_ANGLE_DEG)
    }

    /// Duty count for `degrees` on a channel whose full scale is `max_duty`.
    pub fn duty(&self, degrees: u8, max_duty: u16) -> u16 {
        let counts = u64::from(max_duty) + 1;
        let duty = u64::from(self.pulse_us(degrees)) * counts / u64::from(self.frame_us.max(1));
        duty.min(u64::from(max_duty)) as u16
    }
}

pub struct FoodServo<C> {
    channel: C,
    range: PulseRange,
    angle: Option<u8>,
}

impl<C: SetDutyCycle> FoodServo<C> {
    pub fn new(channel: C, range: PulseRange) -> Self {
        Self {
            channel,
            range,
            angle: None,
        }
    }

    /// Move to `degrees` (clamped to 0–180).  Writes only on change.
    pub fn set_angle(&mut self, degrees: u8) -> Result<(), ActuatorError> {
        let degrees = degrees.min(MAX_ANGLE_DEG);
        if self.angle == Some(degrees) {
            return Ok(());
        }
        let duty = self.range.duty(degrees, self.channel.max_duty_cycle());
        if let Err(e) = self.channel.set_duty_cycle(duty) {
            warn!("Servo: PWM write failed ({:?})", e);
            return Err(ActuatorError::PwmWriteFailed);
        }
        self.angle = Some(degrees);
        Ok(())
    }

    /// Last angle written, `None` before the first write.
    pub fn angle(&self) -> Option<u8> {
        self.angle
    }
}
