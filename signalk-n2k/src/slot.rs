//! Value slot cache
//!
//! One slot per declared key, holding the last value seen for that key and
//! when it arrived. Slots are owned by exactly one combinator.

use crate::types::{DataValue, Key, Timestamp};
use chrono::Duration;
use std::collections::HashMap;

/// Last known value of one key and its arrival time
#[derive(Debug, Clone, PartialEq)]
pub struct ValueSlot {
    pub timestamp: Timestamp,
    pub value: Option<DataValue>,
}

impl ValueSlot {
    /// An empty slot created at `now`
    pub fn empty(now: Timestamp) -> Self {
        Self {
            timestamp: now,
            value: None,
        }
    }

    /// The cached value if it is fresh at `now`
    ///
    /// Without a timeout the value never goes stale. With one, the value is
    /// fresh while `now - timestamp <= timeout`.
    pub fn fresh_value(&self, timeout: Option<Duration>, now: Timestamp) -> Option<&DataValue> {
        match timeout {
            Some(limit) if now.signed_duration_since(self.timestamp) > limit => None,
            _ => self.value.as_ref(),
        }
    }
}

/// Map from key to slot for one combinator
#[derive(Debug, Clone)]
pub struct SlotCache {
    slots: HashMap<Key, ValueSlot>,
}

impl SlotCache {
    /// Create empty slots for every key, stamped with `now`
    pub fn new<'a>(keys: impl IntoIterator<Item = &'a Key>, now: Timestamp) -> Self {
        let slots = keys
            .into_iter()
            .map(|k| (k.clone(), ValueSlot::empty(now)))
            .collect();
        Self { slots }
    }

    /// Store a new value for `key`
    ///
    /// Returns false if the key is not tracked by this cache. The slot
    /// timestamp never moves backwards, even if `at` is older than the
    /// previous arrival.
    pub fn update(&mut self, key: &str, value: DataValue, at: Timestamp) -> bool {
        match self.slots.get_mut(key) {
            Some(slot) => {
                if at > slot.timestamp {
                    slot.timestamp = at;
                }
                slot.value = Some(value);
                true
            }
            None => false,
        }
    }

    /// Look up the slot for `key`
    pub fn get(&self, key: &str) -> Option<&ValueSlot> {
        self.slots.get(key)
    }

    /// Check if `key` is tracked
    pub fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    /// Number of tracked keys
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True if no keys are tracked
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_new_slots_are_empty() {
        let keys = vec!["a".to_string(), "b".to_string()];
        let cache = SlotCache::new(&keys, t0());
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), Some(&ValueSlot::empty(t0())));
        assert!(cache.get("c").is_none());
    }

    #[test]
    fn test_update_unknown_key_is_rejected() {
        let keys = vec!["a".to_string()];
        let mut cache = SlotCache::new(&keys, t0());
        assert!(!cache.update("b", DataValue::Number(1.0), t0()));
        assert!(cache.update("a", DataValue::Number(1.0), t0()));
    }

    #[test]
    fn test_timestamp_is_non_decreasing() {
        let keys = vec!["a".to_string()];
        let mut cache = SlotCache::new(&keys, t0());
        let later = t0() + Duration::milliseconds(500);
        cache.update("a", DataValue::Number(1.0), later);
        cache.update("a", DataValue::Number(2.0), t0());

        let slot = cache.get("a").unwrap();
        assert_eq!(slot.timestamp, later);
        assert_eq!(slot.value, Some(DataValue::Number(2.0)));
    }

    #[test]
    fn test_freshness_boundary() {
        let slot = ValueSlot {
            timestamp: t0(),
            value: Some(DataValue::Number(12.6)),
        };
        let limit = Some(Duration::milliseconds(1000));

        assert!(slot.fresh_value(limit, t0() + Duration::milliseconds(1000)).is_some());
        assert!(slot.fresh_value(limit, t0() + Duration::milliseconds(1001)).is_none());
        assert!(slot.fresh_value(None, t0() + Duration::days(30)).is_some());
    }
}
