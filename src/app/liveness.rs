//! Control-loop latency budget.
//!
//! The task watchdog restarts the chip if it is not fed within its
//! timeout.  The loop feeds it once per iteration, so the hard bound on a
//! single iteration (body + sleep) is the watchdog timeout.  The budget
//! for the body alone is half of that, leaving the other half as margin
//! for the inter-iteration sleep and scheduler jitter.
//!
//! [`LoopBudget`] measures each body against that bound.  It only
//! observes: an overrun is logged and counted, and the watchdog remains
//! the thing that recovers a loop that has truly stalled.

use log::warn;

use super::clock::Timestamp;
use super::ports::WatchdogPort;

#[derive(Debug, Clone)]
pub struct LoopBudget {
    max_body_ms: u32,
    worst_body_ms: u32,
    overruns: u32,
    iteration_start: Option<Timestamp>,
}

impl LoopBudget {
    /// Budget derived from a watchdog timeout in milliseconds.
    pub fn for_watchdog_timeout(timeout_ms: u32) -> Self {
        Self {
            max_body_ms: timeout_ms / 2,
            worst_body_ms: 0,
            overruns: 0,
            iteration_start: None,
        }
    }

    /// Longest permissible loop body in milliseconds.
    pub fn max_body_ms(&self) -> u32 {
        self.max_body_ms
    }

    pub fn begin(&mut self, now: Timestamp) {
        self.iteration_start = Some(now);
    }

    /// Close the current iteration, feed the watchdog, and return the body
    /// duration.  The watchdog is fed whether or not the budget held.
    pub fn finish(&mut self, now: Timestamp, watchdog: &mut impl WatchdogPort) -> u32 {
        let elapsed = self
            .iteration_start
            .take()
            .map_or(0, |start| start.ms_until(now));

        if elapsed > self.worst_body_ms {
            self.worst_body_ms = elapsed;
        }
        if elapsed > self.max_body_ms {
            self.overruns = self.overruns.saturating_add(1);
            warn!(
                "Loop body took {}ms (budget {}ms, watchdog {}ms)",
                elapsed,
                self.max_body_ms,
                watchdog.timeout_ms()
            );
        }

        watchdog.feed();
        elapsed
    }

    pub fn worst_body_ms(&self) -> u32 {
        self.worst_body_ms
    }

    pub fn overruns(&self) -> u32 {
        self.overruns
    }
}
