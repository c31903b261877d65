//! PGN 127508 Battery Status (standard format)
//!
//! One encoder per configured battery. Voltage, current and temperature go
//! stale independently after the battery timeout; stale fields are left out
//! of the record rather than reported as zero.

use super::{Encoded, Encoder};
use crate::combinator::Snapshot;
use crate::pgn::{BatteryStatus, PgnMessage, PGN_BATTERY_STATUS};
use crate::types::{Key, Timestamp};
use chrono::Duration;

/// Default staleness limit for battery readings
pub const DEFAULT_BATTERY_TIMEOUT_MS: i64 = 1000;

const SID: u8 = 18;

pub struct BatteryStatusEncoder {
    name: String,
    instance: u8,
    keys: Vec<Key>,
    timeouts: Vec<Duration>,
}

impl BatteryStatusEncoder {
    /// Encoder for `electrical.batteries.<signalk_id>.*` reported as `instance`
    pub fn new(signalk_id: &str, instance: u8, timeout: Duration) -> Self {
        let keys: Vec<Key> = ["voltage", "current", "temperature"]
            .iter()
            .map(|leaf| format!("electrical.batteries.{}.{}", signalk_id, leaf))
            .collect();
        let timeouts = vec![timeout; keys.len()];

        Self {
            name: format!("BATTERY_STATUS[{}]", signalk_id),
            instance,
            keys,
            timeouts,
        }
    }
}

impl Encoder for BatteryStatusEncoder {
    fn name(&self) -> &str {
        &self.name
    }

    fn pgn(&self) -> u32 {
        PGN_BATTERY_STATUS
    }

    fn keys(&self) -> &[Key] {
        &self.keys
    }

    fn timeouts(&self) -> &[Duration] {
        &self.timeouts
    }

    fn encode(&self, snapshot: &Snapshot, _now: Timestamp) -> Option<Encoded> {
        let field = |i: usize| snapshot.get(i).and_then(|v| v.as_f64());

        Some(Encoded::Pgn(PgnMessage::BatteryStatus(BatteryStatus {
            instance: self.instance,
            sid: SID,
            voltage: field(0),
            current: field(1),
            temperature: field(2),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataValue;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn encoder() -> BatteryStatusEncoder {
        BatteryStatusEncoder::new("house", 3, Duration::milliseconds(DEFAULT_BATTERY_TIMEOUT_MS))
    }

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_keys_and_timeouts() {
        let e = encoder();
        assert_eq!(
            e.keys(),
            &[
                "electrical.batteries.house.voltage".to_string(),
                "electrical.batteries.house.current".to_string(),
                "electrical.batteries.house.temperature".to_string(),
            ]
        );
        assert_eq!(e.timeouts(), &[Duration::milliseconds(1000); 3]);
        assert_eq!(e.name(), "BATTERY_STATUS[house]");
    }

    #[test]
    fn test_only_fresh_fields_present() {
        let snapshot = Snapshot::new(vec![Some(DataValue::Number(12.7)), None, None]);
        let Some(Encoded::Pgn(msg)) = encoder().encode(&snapshot, now()) else {
            panic!("expected a PGN record");
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"id": 127508, "Battery Instance": 3, "SID": 18, "Voltage": 12.7})
        );
    }

    #[test]
    fn test_all_stale_still_emits_header_fields() {
        let snapshot = Snapshot::new(vec![None, None, None]);
        let Some(Encoded::Pgn(msg)) = encoder().encode(&snapshot, now()) else {
            panic!("expected a PGN record");
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"id": 127508, "Battery Instance": 3, "SID": 18})
        );
    }
}
