//! Signal K → NMEA 2000 Library
//!
//! Turns live, independently updating Signal K values into NMEA 2000 messages
//! rendered as Actisense serial log lines.
//!
//! # Architecture
//!
//! - [`TemporalCombinator`] merges the keys an encoder needs into one ordered
//!   [`Snapshot`], replacing stale values with `None` and debouncing bursts
//!   of updates into a single snapshot
//! - [`Encoder`]s turn a snapshot into a finished line (fast-format) or a
//!   [`PgnMessage`] record (standard format)
//! - a [`PgnSerializer`] turns records into bytes and
//!   [`to_actisense_serial_format`] into a line
//! - [`Session`] owns the combinators and timers of one configuration and
//!   [`Bridge`] starts and stops sessions
//!
//! The library never reads the clock: every entry point takes `now`, and a
//! driver uses [`Bridge::next_deadline`] to know when to poll.
//!
//! # Example Usage
//!
//! ```
//! use chrono::{Duration, Utc};
//! use signalk_n2k::{Bridge, BridgeConfig, DataValue};
//!
//! let config = BridgeConfig::new().with_wind(true);
//! let mut bridge = Bridge::new();
//! let start = Utc::now();
//! bridge.start(&config, start).unwrap();
//!
//! let mut out: Vec<String> = Vec::new();
//! bridge.handle_value("environment.wind.angleApparent", DataValue::Number(0.5), start, &mut out);
//! bridge.handle_value("environment.wind.speedApparent", DataValue::Number(5.14), start, &mut out);
//! bridge.poll(start + Duration::milliseconds(10), &mut out);
//!
//! assert_eq!(out.len(), 1);
//! assert!(out[0].ends_with(",2,130306,1,255,8,ff,02,02,88,13,fa,ff,ff"));
//! bridge.stop();
//! ```

// Public modules
pub mod bridge;
pub mod combinator;
pub mod config;
pub mod debounce;
pub mod encoders;
pub mod periodic;
pub mod pgn;
pub mod serializer;
pub mod session;
pub mod sink;
pub mod slot;
pub mod types;
pub mod wire;

// Re-export main types for convenience
pub use bridge::Bridge;
pub use combinator::{Snapshot, TemporalCombinator};
pub use config::{BatteryConfig, BridgeConfig, TimingConfig};
pub use debounce::Debouncer;
pub use encoders::{Encoded, Encoder};
pub use periodic::PeriodicEmitter;
pub use pgn::{BatteryStatus, HeadingReference, PgnMessage, VesselHeading};
pub use serializer::{Pgn2000Serializer, PgnSerializer};
pub use session::{Session, SubscriptionId, TimerId};
pub use sink::{LineWriter, OutputSink};
pub use types::{BridgeError, DataValue, Key, Position, Result, Timestamp};
pub use wire::to_actisense_serial_format;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
