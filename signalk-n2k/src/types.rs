//! Core types for the Signal K → NMEA 2000 bridge
//!
//! This module defines the values that flow from the Signal K side into the
//! combinators, the timestamp type shared by every component, and the
//! library error type.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp type used throughout the bridge
pub type Timestamp = DateTime<Utc>;

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Logical Signal K path of one data point (e.g. `navigation.position`)
pub type Key = String;

/// Errors that can occur while building combinators or sessions
///
/// Encoding itself never fails with an error: a snapshot that cannot be
/// encoded simply produces no output for that cycle.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Timeout list has {timeouts} entries but {keys} keys were declared")]
    TimeoutArity { keys: usize, timeouts: usize },

    #[error("Encoder declares no keys: {0}")]
    NoKeys(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

/// A Signal K value as delivered by an upstream update
///
/// Signal K carries plain JSON; the variants below are the shapes the
/// encoders care about, anything else is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged, from = "serde_json::Value")]
pub enum DataValue {
    /// Numeric value in SI units (radians, m/s, volts, kelvin, ...)
    Number(f64),
    /// Position object with `latitude` and `longitude`
    Position(Position),
    /// String value
    Text(String),
    /// Any other JSON shape
    Other(serde_json::Value),
}

impl DataValue {
    /// Numeric value, if this is a finite number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DataValue::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    /// Position value, if this is a position with finite coordinates
    pub fn as_position(&self) -> Option<Position> {
        match self {
            DataValue::Position(p) if p.latitude.is_finite() && p.longitude.is_finite() => {
                Some(*p)
            }
            _ => None,
        }
    }
}

impl From<f64> for DataValue {
    fn from(v: f64) -> Self {
        DataValue::Number(v)
    }
}

impl From<Position> for DataValue {
    fn from(p: Position) -> Self {
        DataValue::Position(p)
    }
}

impl From<serde_json::Value> for DataValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(v) => DataValue::Number(v),
                None => DataValue::Other(serde_json::Value::Number(n)),
            },
            serde_json::Value::String(s) => DataValue::Text(s),
            serde_json::Value::Object(map) => {
                let coordinate = |name: &str| map.get(name).and_then(serde_json::Value::as_f64);
                match (coordinate("latitude"), coordinate("longitude")) {
                    (Some(latitude), Some(longitude)) => DataValue::Position(Position {
                        latitude,
                        longitude,
                    }),
                    _ => DataValue::Other(serde_json::Value::Object(map)),
                }
            }
            other => DataValue::Other(other),
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Number(v) => write!(f, "{}", v),
            DataValue::Position(p) => write!(f, "({:.7}, {:.7})", p.latitude, p.longitude),
            DataValue::Text(s) => write!(f, "{:?}", s),
            DataValue::Other(v) => write!(f, "{}", v),
        }
    }
}

/// Format a timestamp the way the serial log lines expect it
///
/// Millisecond precision with a `Z` suffix, e.g. `2024-03-01T12:00:00.000Z`.
pub fn iso_timestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
