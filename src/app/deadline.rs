//! Per-actuator shutoff deadline.
//!
//! One outstanding deadline at most: arming replaces whatever was armed
//! before, never extends or queues it.  "No pending shutoff" is `None`
//! rather than a far-future sentinel, so no legitimately wrapped timestamp
//! can be mistaken for it.

use super::clock::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Deadline {
    at: Option<Timestamp>,
}

impl Deadline {
    pub const fn unset() -> Self {
        Self { at: None }
    }

    /// Arm (or re-arm) the deadline `delay_ms` after `now`.
    pub fn arm(&mut self, delay_ms: u32, now: Timestamp) -> Timestamp {
        let at = now.wrapping_add(delay_ms);
        self.at = Some(at);
        at
    }

    /// True iff a deadline is armed and `now` has reached it.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.at.is_some_and(|at| now.is_at_or_after(at))
    }

    pub fn clear(&mut self) {
        self.at = None;
    }

    pub fn is_armed(&self) -> bool {
        self.at.is_some()
    }

    pub fn at(&self) -> Option<Timestamp> {
        self.at
    }

    /// Milliseconds left before expiry; `None` when unarmed or expired.
    pub fn remaining(&self, now: Timestamp) -> Option<u32> {
        match self.at {
            Some(at) if !now.is_at_or_after(at) => Some(now.ms_until(at)),
            _ => None,
        }
    }
}
