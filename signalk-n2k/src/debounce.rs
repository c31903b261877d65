//! Trailing-idle debouncer
//!
//! Every push replaces the buffered value and re-arms a single-shot timer for
//! the configured gap. When the timer expires the latest value is released
//! and the timer disarms. Values pushed during a burst are never queued:
//! only the most recent one survives.
//!
//! The debouncer does not own a clock. Callers pass `now` into every method
//! and use [`Debouncer::deadline`] to know when to poll next.

use crate::types::Timestamp;
use chrono::Duration;

/// Default idle gap before a burst is flushed
pub const DEFAULT_DEBOUNCE_MS: i64 = 10;

/// Coalescing buffer with a trailing idle timer
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    gap: Duration,
    pending: Option<T>,
    deadline: Option<Timestamp>,
}

impl<T> Debouncer<T> {
    /// Create a debouncer with the given idle gap
    pub fn new(gap: Duration) -> Self {
        Self {
            gap,
            pending: None,
            deadline: None,
        }
    }

    /// Buffer `value`, discarding any unflushed one, and re-arm the timer
    ///
    /// An armed deadline only ever moves later, so a clock that steps
    /// backwards cannot release a burst early.
    pub fn push(&mut self, value: T, now: Timestamp) {
        self.pending = Some(value);
        let rearmed = now + self.gap;
        self.deadline = Some(match self.deadline {
            Some(armed) if armed > rearmed => armed,
            _ => rearmed,
        });
    }

    /// Release the buffered value if the idle gap has elapsed at `now`
    pub fn poll(&mut self, now: Timestamp) -> Option<T> {
        match self.deadline {
            Some(deadline) if now >= deadline => self.flush(),
            _ => None,
        }
    }

    /// Release the buffered value immediately, regardless of the timer
    pub fn flush(&mut self) -> Option<T> {
        self.deadline = None;
        self.pending.take()
    }

    /// Drop the buffered value and disarm the timer
    pub fn cancel(&mut self) {
        self.pending = None;
        self.deadline = None;
    }

    /// When the armed timer fires, if any
    pub fn deadline(&self) -> Option<Timestamp> {
        self.deadline
    }

    /// True while a value is waiting for the idle gap
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(Duration::milliseconds(DEFAULT_DEBOUNCE_MS))
    }
}
