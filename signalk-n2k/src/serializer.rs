//! PGN serialization
//!
//! The [`PgnSerializer`] trait is the seam between structured records and raw
//! payload bytes. Returning `None` means "this record cannot be serialized"
//! and is a normal outcome: the caller emits nothing for that cycle.
//!
//! [`Pgn2000Serializer`] is the built-in implementation for the records this
//! crate produces. Both supported PGNs are single-frame (8 bytes), fields are
//! little-endian, and a field without a value is written with the NMEA 2000
//! "data not available" pattern.

use crate::pgn::{BatteryStatus, PgnMessage, VesselHeading};
use byteorder::{LittleEndian, WriteBytesExt};
use std::io;

/// Converts structured PGN records into payload bytes
pub trait PgnSerializer {
    /// Serialize `message`, or `None` if it cannot be represented
    fn to_bytes(&self, message: &PgnMessage) -> Option<Vec<u8>>;
}

/// Unsigned 16-bit "data not available"
const U16_NA: u16 = 0xffff;
/// Largest unsigned 16-bit data value (0xfffd..=0xffff are reserved)
const U16_MAX_DATA: f64 = 0xfffc as f64;
/// Signed 16-bit "data not available"
const I16_NA: i16 = 0x7fff;
/// Largest signed 16-bit data value (0x7ffd..=0x7fff are reserved)
const I16_MAX_DATA: f64 = 0x7ffc as f64;

/// Heading, deviation and variation resolution (radians)
const ANGLE_RESOLUTION: f64 = 1e-4;
/// Battery voltage resolution (volts)
const VOLTAGE_RESOLUTION: f64 = 0.01;
/// Battery current resolution (amperes)
const CURRENT_RESOLUTION: f64 = 0.1;
/// Battery temperature resolution (kelvin)
const TEMPERATURE_RESOLUTION: f64 = 0.01;

/// Built-in serializer for the standard-format PGNs
#[derive(Debug, Clone, Copy, Default)]
pub struct Pgn2000Serializer;

impl Pgn2000Serializer {
    pub fn new() -> Self {
        Self
    }

    fn vessel_heading(msg: &VesselHeading) -> io::Result<Option<Vec<u8>>> {
        let heading = match msg.heading {
            Some(h) if h.is_finite() => h,
            _ => return Ok(None),
        };

        let mut buf = Vec::with_capacity(8);
        buf.write_u8(msg.sid)?;
        buf.write_u16::<LittleEndian>(scaled_u16(Some(heading), ANGLE_RESOLUTION))?;
        buf.write_i16::<LittleEndian>(scaled_i16(msg.deviation, ANGLE_RESOLUTION))?;
        buf.write_i16::<LittleEndian>(scaled_i16(msg.variation, ANGLE_RESOLUTION))?;
        // Reference in the low 2 bits, the 6 reserved bits set
        buf.write_u8(0xfc | msg.reference.code())?;
        Ok(Some(buf))
    }

    fn battery_status(msg: &BatteryStatus) -> io::Result<Option<Vec<u8>>> {
        let mut buf = Vec::with_capacity(8);
        buf.write_u8(msg.instance)?;
        buf.write_u16::<LittleEndian>(scaled_u16(msg.voltage, VOLTAGE_RESOLUTION))?;
        buf.write_i16::<LittleEndian>(scaled_i16(msg.current, CURRENT_RESOLUTION))?;
        buf.write_u16::<LittleEndian>(scaled_u16(msg.temperature, TEMPERATURE_RESOLUTION))?;
        buf.write_u8(msg.sid)?;
        Ok(Some(buf))
    }
}

impl PgnSerializer for Pgn2000Serializer {
    fn to_bytes(&self, message: &PgnMessage) -> Option<Vec<u8>> {
        let result = match message {
            PgnMessage::VesselHeading(msg) => Self::vessel_heading(msg),
            PgnMessage::BatteryStatus(msg) => Self::battery_status(msg),
        };

        match result {
            Ok(bytes) => {
                if bytes.is_none() {
                    log::debug!("PGN {} not serializable: {}", message.pgn(), message);
                }
                bytes
            }
            Err(e) => {
                log::warn!("PGN {} serialization failed: {}", message.pgn(), e);
                None
            }
        }
    }
}

/// Scale a physical value into an unsigned 16-bit field
fn scaled_u16(value: Option<f64>, resolution: f64) -> u16 {
    match value.map(|v| (v / resolution).round()) {
        Some(raw) if raw.is_finite() && (0.0..=U16_MAX_DATA).contains(&raw) => raw as u16,
        _ => U16_NA,
    }
}

/// Scale a physical value into a signed 16-bit field
fn scaled_i16(value: Option<f64>, resolution: f64) -> i16 {
    match value.map(|v| (v / resolution).round()) {
        Some(raw) if raw.is_finite() && (i16::MIN as f64..=I16_MAX_DATA).contains(&raw) => {
            raw as i16
        }
        _ => I16_NA,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pgn::HeadingReference;

    #[test]
    fn test_vessel_heading_layout() {
        let msg = PgnMessage::VesselHeading(VesselHeading {
            sid: 87,
            heading: Some(1.0),
            deviation: None,
            variation: None,
            reference: HeadingReference::Magnetic,
        });
        let bytes = Pgn2000Serializer.to_bytes(&msg).unwrap();
        // 1.0 rad = 10000 = 0x2710
        assert_eq!(bytes, vec![87, 0x10, 0x27, 0xff, 0x7f, 0xff, 0x7f, 0xfd]);
    }

    #[test]
    fn test_vessel_heading_requires_heading() {
        let msg = PgnMessage::VesselHeading(VesselHeading {
            sid: 87,
            heading: None,
            deviation: None,
            variation: None,
            reference: HeadingReference::True,
        });
        assert_eq!(Pgn2000Serializer.to_bytes(&msg), None);
    }

    #[test]
    fn test_battery_status_layout() {
        let msg = PgnMessage::BatteryStatus(BatteryStatus {
            instance: 2,
            sid: 18,
            voltage: Some(12.5),
            current: Some(-1.5),
            temperature: None,
        });
        let bytes = Pgn2000Serializer.to_bytes(&msg).unwrap();
        // 1250 = 0x04e2, -15 = 0xfff1
        assert_eq!(bytes, vec![2, 0xe2, 0x04, 0xf1, 0xff, 0xff, 0xff, 18]);
    }

    #[test]
    fn test_out_of_range_is_not_available() {
        assert_eq!(scaled_u16(Some(-1.0), 0.01), U16_NA);
        assert_eq!(scaled_u16(Some(1000.0), 0.01), U16_NA);
        assert_eq!(scaled_i16(Some(5000.0), 0.1), I16_NA);
        assert_eq!(scaled_i16(Some(f64::NAN), 0.1), I16_NA);
        assert_eq!(scaled_i16(Some(-3276.8), 0.1), i16::MIN);
    }
}
