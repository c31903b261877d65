//! PGN 126992 System Time (fast-format, timer driven)
//!
//! Has no input keys: the periodic emitter calls [`encode_system_time`]
//! directly with the current time.

use crate::pgn::PGN_SYSTEM_TIME;
use crate::types::{iso_timestamp, Timestamp};
use crate::wire::{fast_format_line, pack_u16, pack_u32, BROADCAST};
use chrono::Timelike;

const PRIORITY: u8 = 3;
const SOURCE: u8 = 1;
const MILLIS_PER_DAY: i64 = 86_400_000;
/// Raw time units per second
const TIME_SCALE: i64 = 10_000;

/// Format one system time line for `now`
///
/// Date is days since 1970-01-01 (u16), time is whole seconds since UTC
/// midnight in 0.0001 s units (u32). SID and source bytes are unset.
pub fn encode_system_time(now: Timestamp) -> String {
    let days = now.timestamp_millis() / MILLIS_PER_DAY;
    let time = i64::from(now.num_seconds_from_midnight()) * TIME_SCALE;

    let [d0, d1] = pack_u16(days);
    let [t0, t1, t2, t3] = pack_u32(time);
    let payload = [0xff, 0xff, d0, d1, t0, t1, t2, t3];

    fast_format_line(
        &iso_timestamp(&now),
        PRIORITY,
        PGN_SYSTEM_TIME,
        SOURCE,
        BROADCAST,
        &payload,
    )
}
