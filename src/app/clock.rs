//! Wrapping millisecond timestamps.
//!
//! The platform millisecond counter is 32 bits wide and wraps roughly every
//! 49.7 days.  All ordering questions are answered with modular arithmetic:
//! `a` is at or after `b` when `a - b (mod 2^32)` lies in the lower half of
//! the range.  This stays correct across the wrap for any two instants less
//! than 2^31 ms (~24.8 days) apart, which bounds the longest window the
//! firmware may arm (see [`FeederConfig::validate`](crate::config::FeederConfig::validate)).

use core::fmt;

/// Half of the counter range; differences at or above this read as "before".
const HALF_RANGE: u32 = 1 << 31;

/// A point on the wrapping millisecond clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Timestamp(u32);

impl Timestamp {
    pub const fn from_millis(ms: u32) -> Self {
        Self(ms)
    }

    /// Truncate a wide uptime counter onto the wrapping clock.
    pub const fn from_uptime_ms(ms: u64) -> Self {
        Self(ms as u32)
    }

    pub const fn as_millis(self) -> u32 {
        self.0
    }

    /// The instant `ms` milliseconds later, wrapping past `u32::MAX`.
    #[must_use]
    pub const fn wrapping_add(self, ms: u32) -> Self {
        Self(self.0.wrapping_add(ms))
    }

    /// Modular distance from `self` forward to `later`.
    pub const fn ms_until(self, later: Timestamp) -> u32 {
        later.0.wrapping_sub(self.0)
    }

    /// True iff `self` is the same instant as `other` or comes after it.
    pub const fn is_at_or_after(self, other: Timestamp) -> bool {
        self.0.wrapping_sub(other.0) < HALF_RANGE
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}
