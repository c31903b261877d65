//! Snapshot encoders
//!
//! An encoder declares the ordered keys it needs and turns one snapshot over
//! those keys into either a finished wire line (fast-format) or a structured
//! PGN record (standard format) that still has to go through a
//! [`PgnSerializer`](crate::serializer::PgnSerializer).
//!
//! Returning `None` from [`Encoder::encode`] means "nothing to emit this
//! cycle" and is not an error.

pub mod battery;
pub mod heading;
pub mod location;
pub mod system_time;
pub mod wind;

pub use battery::BatteryStatusEncoder;
pub use heading::HeadingEncoder;
pub use location::GpsLocationEncoder;
pub use system_time::encode_system_time;
pub use wind::WindEncoder;

use crate::combinator::Snapshot;
use crate::pgn::PgnMessage;
use crate::serializer::PgnSerializer;
use crate::types::{Key, Timestamp};
use crate::wire::to_actisense_serial_format;
use chrono::Duration;

/// Output of one encode cycle
#[derive(Debug, Clone, PartialEq)]
pub enum Encoded {
    /// A complete serial log line
    Wire(String),
    /// A record that still needs serializing
    Pgn(PgnMessage),
}

/// Maps snapshots over a fixed key list to protocol output
pub trait Encoder: Send {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// PGN this encoder produces
    fn pgn(&self) -> u32;

    /// Keys in the order the snapshot delivers them
    fn keys(&self) -> &[Key];

    /// Per-key staleness limits; empty means values never go stale
    fn timeouts(&self) -> &[Duration] {
        &[]
    }

    /// Encode one snapshot
    ///
    /// `snapshot.len()` always equals `self.keys().len()`.
    fn encode(&self, snapshot: &Snapshot, now: Timestamp) -> Option<Encoded>;
}

/// Run one encode cycle through to a wire line
///
/// Checks the snapshot against the encoder's key list, encodes, and for
/// standard-format output serializes and formats the record. Any step may
/// yield nothing, in which case nothing is emitted.
pub fn encode_to_wire(
    encoder: &dyn Encoder,
    serializer: &dyn PgnSerializer,
    snapshot: &Snapshot,
    now: Timestamp,
) -> Option<String> {
    if snapshot.len() != encoder.keys().len() {
        log::warn!(
            "{}: snapshot has {} values for {} keys, skipping",
            encoder.name(),
            snapshot.len(),
            encoder.keys().len()
        );
        return None;
    }

    let Some(encoded) = encoder.encode(snapshot, now) else {
        log::debug!("{}: required input missing, skipping cycle", encoder.name());
        return None;
    };

    match encoded {
        Encoded::Wire(line) => Some(line),
        Encoded::Pgn(message) => {
            if message.pgn() != encoder.pgn() {
                log::warn!(
                    "{}: produced PGN {} but declares {}, skipping",
                    encoder.name(),
                    message.pgn(),
                    encoder.pgn()
                );
                return None;
            }
            log::debug!("{}: {}", encoder.name(), message);
            let Some(bytes) = serializer.to_bytes(&message) else {
                log::debug!("{}: serializer produced no bytes", encoder.name());
                return None;
            };
            Some(to_actisense_serial_format(message.pgn(), &bytes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::Pgn2000Serializer;
    use crate::types::DataValue;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_length_mismatch_is_skipped() {
        let encoder = WindEncoder::new();
        let snapshot = Snapshot::new(vec![Some(DataValue::Number(0.5))]);
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        assert_eq!(
            encode_to_wire(&encoder, &Pgn2000Serializer, &snapshot, now),
            None
        );
    }

    #[test]
    fn test_standard_format_goes_through_serializer() {
        let encoder = HeadingEncoder::new();
        let snapshot = Snapshot::new(vec![Some(DataValue::Number(90.0))]);
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();

        let line = encode_to_wire(&encoder, &Pgn2000Serializer, &snapshot, now).unwrap();
        // 90 * pi/180 = 1.5708 rad = 15708 = 0x3d5c
        assert_eq!(
            line,
            "1970-01-01T00:00:00.000,4,127250,43,255,8,57,5c,3d,ff,7f,ff,7f,fd"
        );
    }

    /// Declares the wind PGN but produces a heading record
    struct Mislabelled {
        keys: Vec<Key>,
    }

    impl Encoder for Mislabelled {
        fn name(&self) -> &str {
            "MISLABELLED"
        }

        fn pgn(&self) -> u32 {
            crate::pgn::PGN_WIND_DATA
        }

        fn keys(&self) -> &[Key] {
            &self.keys
        }

        fn encode(&self, snapshot: &Snapshot, now: Timestamp) -> Option<Encoded> {
            HeadingEncoder::new().encode(snapshot, now)
        }
    }

    #[test]
    fn test_record_must_match_declared_pgn() {
        let encoder = Mislabelled {
            keys: vec!["navigation.headingMagnetic".to_string()],
        };
        let snapshot = Snapshot::new(vec![Some(DataValue::Number(90.0))]);
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        assert_eq!(
            encode_to_wire(&encoder, &Pgn2000Serializer, &snapshot, now),
            None
        );
    }

    struct Refusing;

    impl PgnSerializer for Refusing {
        fn to_bytes(&self, _message: &PgnMessage) -> Option<Vec<u8>> {
            None
        }
    }

    #[test]
    fn test_serializer_refusal_emits_nothing() {
        let encoder = HeadingEncoder::new();
        let snapshot = Snapshot::new(vec![Some(DataValue::Number(90.0))]);
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        assert_eq!(encode_to_wire(&encoder, &Refusing, &snapshot, now), None);
    }
}
