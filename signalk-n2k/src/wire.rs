//! Wire formatting
//!
//! Little-endian field packing shared by the binary encoders, and the
//! Actisense serial log line format every emitted message ends up in.
//!
//! A serial log line looks like:
//!
//! ```text
//! <timestamp>,<priority>,<pgn>,<source>,<destination>,<length>,<b0>,...,<bN-1>
//! ```
//!
//! Each data byte is rendered as exactly two lowercase hex digits.

use byteorder::{ByteOrder, LittleEndian};

/// Timestamp used by serializer-produced lines (receivers ignore it)
pub const EPOCH_TIMESTAMP: &str = "1970-01-01T00:00:00.000";

/// Priority used by serializer-produced lines
pub const DEFAULT_PRIORITY: u8 = 4;

/// Source address used by serializer-produced lines
pub const DEFAULT_SOURCE: u8 = 43;

/// Global (broadcast) destination address
pub const BROADCAST: u8 = 255;

/// Render one byte as two lowercase hex digits
pub fn hex_byte(b: u8) -> String {
    format!("{:02x}", b)
}

/// Render bytes as comma separated lowercase hex pairs
pub fn hex_join(bytes: &[u8]) -> String {
    bytes.iter().map(|b| hex_byte(*b)).collect::<Vec<_>>().join(",")
}

/// Pack an unsigned 16-bit field
///
/// The raw value is truncated to the low 16 bits.
pub fn pack_u16(raw: i64) -> [u8; 2] {
    let mut buf = [0u8; 2];
    LittleEndian::write_u16(&mut buf, raw as u16);
    buf
}

/// Pack a signed 16-bit field (two's complement, truncated to 16 bits)
pub fn pack_i16(raw: i64) -> [u8; 2] {
    let mut buf = [0u8; 2];
    LittleEndian::write_i16(&mut buf, raw as i16);
    buf
}

/// Pack an unsigned 32-bit field
///
/// The raw value is truncated to the low 32 bits.
pub fn pack_u32(raw: i64) -> [u8; 4] {
    let mut buf = [0u8; 4];
    LittleEndian::write_u32(&mut buf, raw as u32);
    buf
}

/// Pack a signed 32-bit field (two's complement, truncated to 32 bits)
pub fn pack_i32(raw: i64) -> [u8; 4] {
    let mut buf = [0u8; 4];
    LittleEndian::write_i32(&mut buf, raw as i32);
    buf
}

/// Build a fast-format line from its header fields and payload
pub fn fast_format_line(
    timestamp: &str,
    priority: u8,
    pgn: u32,
    source: u8,
    destination: u8,
    payload: &[u8],
) -> String {
    format!(
        "{},{},{},{},{},{},{}",
        timestamp,
        priority,
        pgn,
        source,
        destination,
        payload.len(),
        hex_join(payload)
    )
}

/// Convert serialized PGN bytes into an Actisense serial log line
///
/// # Example
/// ```
/// use signalk_n2k::wire::to_actisense_serial_format;
///
/// let line = to_actisense_serial_format(127250, &[0x00, 0xff, 0x10]);
/// assert_eq!(line, "1970-01-01T00:00:00.000,4,127250,43,255,3,00,ff,10");
/// ```
pub fn to_actisense_serial_format(pgn: u32, data: &[u8]) -> String {
    fast_format_line(
        EPOCH_TIMESTAMP,
        DEFAULT_PRIORITY,
        pgn,
        DEFAULT_SOURCE,
        BROADCAST,
        data,
    )
}
