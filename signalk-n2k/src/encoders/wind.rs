//! PGN 130306 Wind Data (fast-format)

use super::{Encoded, Encoder};
use crate::combinator::Snapshot;
use crate::pgn::PGN_WIND_DATA;
use crate::types::{iso_timestamp, Key, Timestamp};
use crate::wire::{fast_format_line, pack_i16, pack_u16, BROADCAST};

pub const ANGLE_APPARENT: &str = "environment.wind.angleApparent";
pub const SPEED_APPARENT: &str = "environment.wind.speedApparent";

const PRIORITY: u8 = 2;
const SOURCE: u8 = 1;
/// SID, not used
const NO_SID: u8 = 0xff;
/// Reference = apparent, reserved bits set
const REFERENCE_APPARENT: u8 = 0xfa;

/// Apparent wind angle (rad) and speed (m/s)
pub struct WindEncoder {
    keys: Vec<Key>,
}

impl WindEncoder {
    pub fn new() -> Self {
        Self {
            keys: vec![ANGLE_APPARENT.to_string(), SPEED_APPARENT.to_string()],
        }
    }
}

impl Default for WindEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder for WindEncoder {
    fn name(&self) -> &str {
        "WIND"
    }

    fn pgn(&self) -> u32 {
        PGN_WIND_DATA
    }

    fn keys(&self) -> &[Key] {
        &self.keys
    }

    fn encode(&self, snapshot: &Snapshot, now: Timestamp) -> Option<Encoded> {
        let angle = snapshot.get(0)?.as_f64()?;
        let speed = snapshot.get(1)?.as_f64()?;
        Some(Encoded::Wire(encode_wind(angle, speed, now)))
    }
}

/// Format one wind line
///
/// Speed is in 0.01 m/s (rounded, unsigned), angle in 0.0001 rad
/// (truncated, signed).
pub fn encode_wind(angle: f64, speed: f64, now: Timestamp) -> String {
    let speed_raw = (speed * 100.0).round() as i64;
    let angle_raw = (angle * 10000.0).trunc() as i64;

    let [speed_lo, speed_hi] = pack_u16(speed_raw);
    let [angle_lo, angle_hi] = pack_i16(angle_raw);
    let payload = [
        NO_SID,
        speed_lo,
        speed_hi,
        angle_lo,
        angle_hi,
        REFERENCE_APPARENT,
        0xff,
        0xff,
    ];

    fast_format_line(
        &iso_timestamp(&now),
        PRIORITY,
        PGN_WIND_DATA,
        SOURCE,
        BROADCAST,
        &payload,
    )
}
