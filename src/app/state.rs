//! Per-actuator state and the timing profiles that shape it.
//!
//! ```text
//!           command(percent > 0)            command(percent > 0)
//!   IDLE ────────────────────────▶ ACTIVE ◀──────────────┐
//!    ▲                              │  └──────────────────┘
//!    │   deadline reached           │     (deadline replaced)
//!    └──────────────────────────────┤
//!    │   command(percent == 0)      │
//!    └──────────────────────────────┘
//! ```
//!
//! `active` is stored rather than derived so the ACTIVE → IDLE edge fires
//! once: the expiry check only runs while `active` is set, and clears both
//! the flag and the deadline when it fires.

use super::clock::Timestamp;
use super::deadline::Deadline;
use crate::config::FeederConfig;

/// Highest accepted intensity; anything above is clamped.
pub const MAX_PERCENT: u8 = 100;

// ---------------------------------------------------------------------------
// ActuatorState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActuatorState {
    deadline: Deadline,
    active: bool,
    intensity: u8,
}

impl ActuatorState {
    /// Boot state: idle, no pending shutoff.
    pub const fn idle() -> Self {
        Self {
            deadline: Deadline::unset(),
            active: false,
            intensity: 0,
        }
    }

    /// Start (or restart) an activation window.  Replaces any prior window.
    pub fn activate(&mut self, percent: u8, delay_ms: u32, now: Timestamp) -> Timestamp {
        self.intensity = percent;
        self.active = true;
        self.deadline.arm(delay_ms, now)
    }

    /// Immediate return to idle; returns whether the actuator was active.
    pub fn cancel(&mut self, percent: u8) -> bool {
        let was_active = self.active;
        self.intensity = percent;
        self.active = false;
        self.deadline.clear();
        was_active
    }

    /// Fire the ACTIVE → IDLE edge if the window has run out.
    /// Returns `true` exactly once per window.
    pub fn expire_if_due(&mut self, now: Timestamp) -> bool {
        if self.active && self.deadline.is_expired(now) {
            self.active = false;
            self.deadline.clear();
            true
        } else {
            false
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn intensity(&self) -> u8 {
        self.intensity
    }

    pub fn deadline(&self) -> &Deadline {
        &self.deadline
    }

    pub fn remaining(&self, now: Timestamp) -> Option<u32> {
        if self.active {
            self.deadline.remaining(now)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Window profile: percent → activation window length
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowProfile {
    pub base_ms: u32,
    pub per_percent_ms: u32,
}

impl WindowProfile {
    pub fn water(config: &FeederConfig) -> Self {
        Self {
            base_ms: config.water_base_ms,
            per_percent_ms: config.water_per_percent_ms,
        }
    }

    pub fn food(config: &FeederConfig) -> Self {
        Self {
            base_ms: config.food_base_ms,
            per_percent_ms: config.food_per_percent_ms,
        }
    }

    /// `base + percent * per_percent`, with `percent` already clamped.
    pub fn window_ms(&self, percent: u8) -> u32 {
        let percent = u32::from(percent.min(MAX_PERCENT));
        self.base_ms
            .saturating_add(percent.saturating_mul(self.per_percent_ms))
    }
}

// ---------------------------------------------------------------------------
// Swing profile: food servo oscillation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwingProfile {
    pub period_ms: u32,
    pub neutral_deg: u8,
    pub position_a_deg: u8,
    pub position_b_deg: u8,
}

impl SwingProfile {
    pub fn from_config(config: &FeederConfig) -> Self {
        Self {
            period_ms: config.food_swing_period_ms.max(1),
            neutral_deg: config.servo_neutral_deg,
            position_a_deg: config.servo_position_a_deg,
            position_b_deg: config.servo_position_b_deg,
        }
    }

    /// Phase 0 or 1, counted in whole periods back from the deadline so
    /// the flips are anchored to when the window was armed.
    pub fn phase(&self, remaining_ms: u32) -> u32 {
        (remaining_ms / self.period_ms) % 2
    }

    pub fn position(&self, remaining_ms: u32) -> u8 {
        if self.phase(remaining_ms) == 0 {
            self.position_a_deg
        } else {
            self.position_b_deg
        }
    }
}
