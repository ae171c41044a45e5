//! Inbound commands to the application service.
//!
//! The smart-home collaborator delivers a device name and a dimmer value;
//! [`DeviceMap`] resolves that into an [`AppCommand`] the
//! [`AppService`](super::service::AppService) understands.  Anything that
//! does not resolve is dropped here, before it reaches the core.

use core::fmt;

use log::debug;

use crate::config::FeederConfig;

/// The two controlled outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActuatorId {
    Water,
    Food,
}

impl ActuatorId {
    pub const ALL: [ActuatorId; 2] = [ActuatorId::Water, ActuatorId::Food];

    pub fn name(self) -> &'static str {
        match self {
            Self::Water => "water",
            Self::Food => "food",
        }
    }
}

impl fmt::Display for ActuatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Set an actuator's intensity.  Values above 100 are clamped by the
    /// service; 0 means "stop now".
    SetLevel { actuator: ActuatorId, percent: u8 },

    /// Return both actuators to idle (manual-mode fallback, shutdown).
    AllOff,
}

/// What the command-delivery collaborator hands over: the name of the
/// virtual device that changed (if any) and its new dimmer value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommand {
    pub device: Option<heapless::String<32>>,
    /// Dimmer brightness, 0–255.
    pub brightness: u8,
}

/// Convert a 0–255 dimmer brightness into a 0–100 percentage.
pub fn percent_from_brightness(brightness: u8) -> u8 {
    (u16::from(brightness) * 100 / 255) as u8
}

/// Binds virtual device names to actuators.
#[derive(Debug, Clone)]
pub struct DeviceMap {
    water: heapless::String<32>,
    food: heapless::String<32>,
}

impl DeviceMap {
    pub fn from_config(config: &FeederConfig) -> Self {
        Self {
            water: config.water_device_name.clone(),
            food: config.food_device_name.clone(),
        }
    }

    pub fn resolve(&self, device: &str) -> Option<ActuatorId> {
        if device == self.water.as_str() {
            Some(ActuatorId::Water)
        } else if device == self.food.as_str() {
            Some(ActuatorId::Food)
        } else {
            None
        }
    }

    pub fn device_name(&self, actuator: ActuatorId) -> &str {
        match actuator {
            ActuatorId::Water => self.water.as_str(),
            ActuatorId::Food => self.food.as_str(),
        }
    }

    /// Translate a raw delivery; `None` for target-less or unknown devices.
    pub fn translate(&self, raw: &RawCommand) -> Option<AppCommand> {
        let Some(device) = raw.device.as_deref() else {
            debug!("Command without target ignored");
            return None;
        };
        let Some(actuator) = self.resolve(device) else {
            debug!("Command for unknown device '{}' ignored", device);
            return None;
        };
        Some(AppCommand::SetLevel {
            actuator,
            percent: percent_from_brightness(raw.brightness),
        })
    }
}
