//! Smart-home delivery boundary.
//!
//! The voice-assistant discovery protocol lives outside this crate.  What
//! it needs from the firmware is small: the names of the two dimmable
//! devices to announce, and somewhere to put a state change when one
//! arrives.  [`SmartHomeAdapter`] provides both.  Registration needs a
//! live network; deliveries go straight into the [`CommandQueue`] and are
//! resolved against the [`DeviceMap`] on the control-loop side.

use log::{info, warn};

use crate::app::commands::{ActuatorId, DeviceMap, RawCommand};
use crate::error::CommsError;

use super::command_queue::CommandQueue;

pub struct SmartHomeAdapter<'q> {
    queue: &'q CommandQueue,
    devices: DeviceMap,
    registered: bool,
}

impl<'q> SmartHomeAdapter<'q> {
    pub fn new(queue: &'q CommandQueue, devices: DeviceMap) -> Self {
        Self {
            queue,
            devices,
            registered: false,
        }
    }

    /// Announce both devices.  Fails while the network is down; the
    /// caller retries once the link comes back.
    pub fn register(&mut self, network_up: bool) -> Result<(), CommsError> {
        if !network_up {
            warn!("SmartHome: network down, devices not registered");
            self.registered = false;
            return Err(CommsError::DeviceRegistrationFailed);
        }
        for id in ActuatorId::ALL {
            info!("SmartHome: registered '{}' ({})", self.devices.device_name(id), id);
        }
        self.registered = true;
        Ok(())
    }

    /// Forget the registration, e.g. after the link drops.
    pub fn invalidate(&mut self) {
        self.registered = false;
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Entry point for the protocol handler: one device changed state.
    pub fn deliver(&self, device: Option<&str>, brightness: u8) -> bool {
        let device = match device {
            Some(name) => {
                let mut s = heapless::String::new();
                if s.push_str(name).is_err() {
                    warn!("SmartHome: device name too long, ignored");
                    return false;
                }
                Some(s)
            }
            None => None,
        };
        self.queue.push(RawCommand { device, brightness })
    }
}
