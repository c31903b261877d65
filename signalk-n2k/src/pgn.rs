//! Structured PGN records
//!
//! Standard-format encoders produce these records; a [`PgnSerializer`]
//! turns them into bytes. Optional fields are genuinely optional: a field
//! that is `None` is left out of the record, not zero-filled.
//!
//! Records serialize to JSON with the field names used on the NMEA 2000 side
//! (`SID`, `Battery Instance`, ...) plus the numeric `id`, which is what the
//! debug log prints.
//!
//! [`PgnSerializer`]: crate::serializer::PgnSerializer

use serde::ser::Serializer;
use serde::Serialize;
use std::fmt;

/// PGN 126992 System Time
pub const PGN_SYSTEM_TIME: u32 = 126992;
/// PGN 127250 Vessel Heading
pub const PGN_VESSEL_HEADING: u32 = 127250;
/// PGN 127508 Battery Status
pub const PGN_BATTERY_STATUS: u32 = 127508;
/// PGN 129025 Position, Rapid Update
pub const PGN_POSITION_RAPID: u32 = 129025;
/// PGN 130306 Wind Data
pub const PGN_WIND_DATA: u32 = 130306;

/// Heading reference of PGN 127250
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HeadingReference {
    True,
    Magnetic,
}

impl HeadingReference {
    /// 2-bit lookup value on the wire
    pub fn code(self) -> u8 {
        match self {
            HeadingReference::True => 0,
            HeadingReference::Magnetic => 1,
        }
    }
}

/// PGN 127250 Vessel Heading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VesselHeading {
    #[serde(rename = "SID")]
    pub sid: u8,
    /// Heading in radians
    #[serde(rename = "Heading", skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    #[serde(rename = "Deviation", skip_serializing_if = "Option::is_none")]
    pub deviation: Option<f64>,
    #[serde(rename = "Variation", skip_serializing_if = "Option::is_none")]
    pub variation: Option<f64>,
    #[serde(rename = "Reference")]
    pub reference: HeadingReference,
}

/// PGN 127508 Battery Status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatteryStatus {
    #[serde(rename = "Battery Instance")]
    pub instance: u8,
    #[serde(rename = "SID")]
    pub sid: u8,
    /// Volts
    #[serde(rename = "Voltage", skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f64>,
    /// Amperes
    #[serde(rename = "Current", skip_serializing_if = "Option::is_none")]
    pub current: Option<f64>,
    /// Kelvin
    #[serde(rename = "Temperature", skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// A structured message ready for serialization
#[derive(Debug, Clone, PartialEq)]
pub enum PgnMessage {
    VesselHeading(VesselHeading),
    BatteryStatus(BatteryStatus),
}

impl PgnMessage {
    /// Parameter group number of this message
    pub fn pgn(&self) -> u32 {
        match self {
            PgnMessage::VesselHeading(_) => PGN_VESSEL_HEADING,
            PgnMessage::BatteryStatus(_) => PGN_BATTERY_STATUS,
        }
    }
}

#[derive(Serialize)]
struct WithId<'a, T: Serialize> {
    id: u32,
    #[serde(flatten)]
    fields: &'a T,
}

impl Serialize for PgnMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let id = self.pgn();
        match self {
            PgnMessage::VesselHeading(fields) => WithId { id, fields }.serialize(serializer),
            PgnMessage::BatteryStatus(fields) => WithId { id, fields }.serialize(serializer),
        }
    }
}

impl fmt::Display for PgnMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "PGN {}", self.pgn()),
        }
    }
}
