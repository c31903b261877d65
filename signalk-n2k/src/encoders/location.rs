//! PGN 129025 Position, Rapid Update (fast-format)

use super::{Encoded, Encoder};
use crate::combinator::Snapshot;
use crate::pgn::PGN_POSITION_RAPID;
use crate::types::{iso_timestamp, Key, Position, Timestamp};
use crate::wire::{fast_format_line, pack_i32, BROADCAST};

pub const POSITION: &str = "navigation.position";

const PRIORITY: u8 = 7;
const SOURCE: u8 = 1;
/// Raw units per degree
const SCALE: f64 = 1e7;

pub struct GpsLocationEncoder {
    keys: Vec<Key>,
}

impl GpsLocationEncoder {
    pub fn new() -> Self {
        Self {
            keys: vec![POSITION.to_string()],
        }
    }
}

impl Default for GpsLocationEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder for GpsLocationEncoder {
    fn name(&self) -> &str {
        "GPS_LOCATION"
    }

    fn pgn(&self) -> u32 {
        PGN_POSITION_RAPID
    }

    fn keys(&self) -> &[Key] {
        &self.keys
    }

    fn encode(&self, snapshot: &Snapshot, now: Timestamp) -> Option<Encoded> {
        let position = snapshot.get(0)?.as_position()?;
        Some(Encoded::Wire(encode_location(position, now)))
    }
}

/// Raw 1e-7 degree value of a coordinate
pub fn coordinate_raw(degrees: f64) -> i64 {
    (degrees * SCALE).round() as i64
}

/// Format one position line: latitude then longitude, each i32 LE
pub fn encode_location(position: Position, now: Timestamp) -> String {
    let lat = pack_i32(coordinate_raw(position.latitude));
    let lon = pack_i32(coordinate_raw(position.longitude));

    let mut payload = [0u8; 8];
    payload[..4].copy_from_slice(&lat);
    payload[4..].copy_from_slice(&lon);

    fast_format_line(
        &iso_timestamp(&now),
        PRIORITY,
        PGN_POSITION_RAPID,
        SOURCE,
        BROADCAST,
        &payload,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataValue;
    use chrono::{TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    fn payload_bytes(line: &str) -> Vec<u8> {
        line.split(',')
            .skip(6)
            .map(|h| u8::from_str_radix(h, 16).unwrap())
            .collect()
    }

    #[test]
    fn test_latitude_round_trips() {
        let line = encode_location(
            Position {
                latitude: 60.1234567,
                longitude: 24.9876543,
            },
            now(),
        );
        assert!(line.starts_with("2024-06-01T08:00:00.000Z,7,129025,1,255,8,"));

        let bytes = payload_bytes(&line);
        assert_eq!(bytes.len(), 8);
        let lat = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let lon = i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        assert_eq!(lat, 601234567);
        assert_eq!(lon, 249876543);
    }

    #[test]
    fn test_southern_western_hemisphere() {
        let line = encode_location(
            Position {
                latitude: -33.8688,
                longitude: -151.2093,
            },
            now(),
        );
        let bytes = payload_bytes(&line);
        let lat = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let lon = i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        assert_eq!(lat, -338688000);
        assert_eq!(lon, -1512093000);
    }

    #[test]
    fn test_non_position_value_skips_cycle() {
        let encoder = GpsLocationEncoder::new();
        let snapshot = Snapshot::new(vec![Some(DataValue::Number(60.0))]);
        assert_eq!(encoder.encode(&snapshot, now()), None);
        assert_eq!(encoder.encode(&Snapshot::new(vec![None]), now()), None);
    }
}
