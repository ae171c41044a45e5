//! Command delivery queue.
//!
//! Uses an `embassy-sync` bounded channel to bridge whatever context
//! receives smart-home deliveries with the synchronous control loop.
//! The control loop is the only consumer; it drains the queue at the top
//! of every iteration, so commands are applied in arrival order and
//! never concurrently with a tick.  When full, the oldest delivery is
//! evicted so the most recent command always gets in.
//!
//! ```text
//! ┌──────────────┐  RawCommand  ┌──────────────┐
//! │ Smart-home   │────────────▶│ Control loop │
//! │ delivery     │   depth 8    │ (sync)       │
//! └──────────────┘              └──────────────┘
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use log::warn;

use crate::app::commands::RawCommand;

/// Channel depth for inbound deliveries.
pub const QUEUE_DEPTH: usize = 8;

pub struct CommandQueue {
    channel: Channel<CriticalSectionRawMutex, RawCommand, QUEUE_DEPTH>,
    evicted: AtomicU32,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            evicted: AtomicU32::new(0),
        }
    }

    /// Enqueue a delivery.  When full, the oldest queued delivery is
    /// evicted to make room.  Returns `false` only if the delivery still
    /// could not be queued.
    pub fn push(&self, raw: RawCommand) -> bool {
        match self.channel.try_send(raw) {
            Ok(()) => true,
            Err(TrySendError::Full(raw)) => {
                if let Ok(old) = self.channel.try_receive() {
                    self.evicted.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        "CommandQueue full, evicting oldest command for {:?}",
                        old.device.as_deref()
                    );
                }
                self.channel.try_send(raw).is_ok()
            }
        }
    }

    /// Hand every queued delivery to `handler`, oldest first.
    pub fn drain(&self, mut handler: impl FnMut(RawCommand)) -> usize {
        let mut n = 0;
        while let Ok(raw) = self.channel.try_receive() {
            handler(raw);
            n += 1;
        }
        n
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    /// Deliveries evicted because the queue was full.
    pub fn evicted(&self) -> u32 {
        self.evicted.load(Ordering::Relaxed)
    }
}
