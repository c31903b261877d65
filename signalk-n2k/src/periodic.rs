//! Periodic emitter
//!
//! A recurring timer that produces a wire line on every tick without going
//! through a combinator. Missed ticks are not replayed: a late poll fires
//! once and the next deadline moves to the first period boundary after
//! `now`.

use crate::types::Timestamp;
use chrono::Duration;

/// Default system time period
pub const DEFAULT_SYSTEM_TIME_INTERVAL_MS: i64 = 1000;

/// Shortest period an emitter accepts; shorter intervals are raised to it
pub const MIN_INTERVAL_MS: i64 = 1;

/// Line producer invoked on every tick
pub type TickFn = Box<dyn Fn(Timestamp) -> Option<String> + Send>;

/// Recurring timer bound to a line producer
pub struct PeriodicEmitter {
    name: String,
    interval: Duration,
    next: Option<Timestamp>,
    tick: TickFn,
}

impl PeriodicEmitter {
    /// Create an emitter whose first tick is one `interval` after `now`
    ///
    /// Intervals below [`MIN_INTERVAL_MS`] are raised to it.
    pub fn new(name: impl Into<String>, interval: Duration, now: Timestamp, tick: TickFn) -> Self {
        let name = name.into();
        let min = Duration::milliseconds(MIN_INTERVAL_MS);
        let interval = if interval < min {
            log::warn!("timer {}: interval {} raised to {}ms", name, interval, MIN_INTERVAL_MS);
            min
        } else {
            interval
        };
        Self {
            name,
            interval,
            next: Some(now + interval),
            tick,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fire if the next tick is due at `now`
    pub fn poll(&mut self, now: Timestamp) -> Option<String> {
        let due = self.next?;
        if now < due {
            return None;
        }

        // First period boundary strictly after `now`
        let period = self.interval.num_milliseconds().max(MIN_INTERVAL_MS);
        let behind = (now - due).num_milliseconds();
        let periods = behind / period + 1;
        self.next = Some(due + Duration::milliseconds(periods * period));

        (self.tick)(now)
    }

    /// When the next tick is due; `None` once cancelled
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.next
    }

    /// Stop ticking. Safe to call more than once.
    pub fn cancel(&mut self) {
        if self.next.take().is_some() {
            log::debug!("cancel timer {}", self.name);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.next.is_none()
    }
}
