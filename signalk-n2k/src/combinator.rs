//! Temporal combinator
//!
//! Fans several independently-updating keys into one ordered snapshot. Each
//! update refreshes the slot for its key, recomputes the snapshot over all
//! declared keys (substituting `None` for stale or never-seen values) and
//! hands it to a trailing-idle debouncer, so a burst of near-simultaneous
//! updates becomes a single downstream snapshot.

use crate::debounce::Debouncer;
use crate::slot::SlotCache;
use crate::types::{BridgeError, DataValue, Key, Result, Timestamp};
use chrono::Duration;

/// Ordered values for the declared keys of one combinator
///
/// `values[i]` belongs to `keys[i]`; `None` means absent or stale.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    values: Vec<Option<DataValue>>,
}

impl Snapshot {
    /// Build a snapshot from already-ordered values
    pub fn new(values: Vec<Option<DataValue>>) -> Self {
        Self { values }
    }

    /// Value at position `index`, if present and fresh
    pub fn get(&self, index: usize) -> Option<&DataValue> {
        self.values.get(index).and_then(|v| v.as_ref())
    }

    /// Number of positions (always equals the number of declared keys)
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True for a snapshot over zero keys
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All positions in key order
    pub fn values(&self) -> &[Option<DataValue>] {
        &self.values
    }
}

/// Fan-in of several keys into debounced snapshots
#[derive(Debug, Clone)]
pub struct TemporalCombinator {
    keys: Vec<Key>,
    timeouts: Vec<Option<Duration>>,
    cache: SlotCache,
    output: Debouncer<Snapshot>,
    cancelled: bool,
}

impl TemporalCombinator {
    /// Create a combinator over `keys`
    ///
    /// `timeouts` is either empty (values never go stale) or has one entry
    /// per key. All slots start empty, stamped with `now`.
    pub fn new(
        keys: Vec<Key>,
        timeouts: Vec<Duration>,
        debounce: Duration,
        now: Timestamp,
    ) -> Result<Self> {
        if !timeouts.is_empty() && timeouts.len() != keys.len() {
            return Err(BridgeError::TimeoutArity {
                keys: keys.len(),
                timeouts: timeouts.len(),
            });
        }

        let timeouts = if timeouts.is_empty() {
            vec![None; keys.len()]
        } else {
            timeouts.into_iter().map(Some).collect()
        };

        log::debug!("keys: {:?}", keys);
        log::debug!("timeouts: {:?}", timeouts);

        let cache = SlotCache::new(&keys, now);
        Ok(Self {
            keys,
            timeouts,
            cache,
            output: Debouncer::new(debounce),
            cancelled: false,
        })
    }

    /// Declared keys, in snapshot order
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Check if this combinator listens to `key`
    pub fn tracks(&self, key: &str) -> bool {
        !self.cancelled && self.cache.contains(key)
    }

    /// Record an upstream update and buffer the resulting snapshot
    ///
    /// Returns false (and changes nothing) if the key is not declared or the
    /// combinator has been cancelled.
    pub fn update(&mut self, key: &str, value: DataValue, now: Timestamp) -> bool {
        if self.cancelled || !self.cache.update(key, value, now) {
            return false;
        }
        let snapshot = self.snapshot_at(now);
        self.output.push(snapshot, now);
        true
    }

    /// Compute the snapshot as of `now` without buffering it
    pub fn snapshot_at(&self, now: Timestamp) -> Snapshot {
        let values = self
            .keys
            .iter()
            .zip(&self.timeouts)
            .map(|(key, timeout)| {
                self.cache
                    .get(key)
                    .and_then(|slot| slot.fresh_value(*timeout, now))
                    .cloned()
            })
            .collect();
        Snapshot::new(values)
    }

    /// Deliver the buffered snapshot if the debounce gap has elapsed
    pub fn poll(&mut self, now: Timestamp) -> Option<Snapshot> {
        if self.cancelled {
            return None;
        }
        self.output.poll(now)
    }

    /// Deliver the buffered snapshot immediately
    pub fn flush(&mut self) -> Option<Snapshot> {
        if self.cancelled {
            return None;
        }
        self.output.flush()
    }

    /// When the next debounced snapshot becomes due
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.output.deadline()
    }

    /// Stop accepting updates and drop any pending snapshot
    ///
    /// Safe to call more than once.
    pub fn cancel(&mut self) {
        if !self.cancelled {
            log::debug!("cancel combinator over {:?}", self.keys);
        }
        self.cancelled = true;
        self.output.cancel();
    }

    /// True once [`cancel`](Self::cancel) has been called
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}
