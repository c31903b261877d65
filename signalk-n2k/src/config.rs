//! Bridge configuration types
//!
//! Selects which encoders a session runs. Data-driven encoders are switched
//! on with flags, the system time emitter with `system_time`, and every
//! entry in `battery_status` yields its own battery encoder.

use crate::debounce::DEFAULT_DEBOUNCE_MS;
use crate::encoders::battery::DEFAULT_BATTERY_TIMEOUT_MS;
use crate::periodic::DEFAULT_SYSTEM_TIME_INTERVAL_MS;
use crate::types::{BridgeError, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Configuration for one bridge session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// 130306 Wind
    #[serde(default, alias = "WIND")]
    pub wind: bool,

    /// 129025 Location
    #[serde(default, alias = "GPS_LOCATION")]
    pub gps_location: bool,

    /// 126992 System Time
    #[serde(default, alias = "SYSTEM_TIME")]
    pub system_time: bool,

    /// 127250 Heading
    #[serde(default, alias = "HEADING")]
    pub heading: bool,

    /// 127508 Battery status, one entry per battery
    #[serde(default, alias = "BATTERYSTATUS")]
    pub battery_status: Vec<BatteryConfig>,

    /// Full context of the own vessel; deltas without a context or for
    /// `vessels.self` are always accepted
    #[serde(default)]
    pub self_context: Option<String>,

    #[serde(default)]
    pub timing: TimingConfig,
}

/// Maps a Signal K battery to an NMEA 2000 battery instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatteryConfig {
    /// Signal K battery id (`electrical.batteries.<id>`)
    #[serde(alias = "signalkId")]
    pub signalk_id: String,
    /// NMEA 2000 battery instance
    #[serde(alias = "instanceId")]
    pub instance_id: u32,
}

impl BatteryConfig {
    pub fn new(signalk_id: impl Into<String>, instance_id: u32) -> Self {
        Self {
            signalk_id: signalk_id.into(),
            instance_id,
        }
    }
}

/// Timer settings in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Idle gap before a burst of updates is encoded (default: 10ms)
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,

    /// System time period (default: 1000ms)
    #[serde(default = "default_system_time_interval")]
    pub system_time_interval_ms: u64,

    /// Staleness limit for battery readings (default: 1000ms)
    #[serde(default = "default_battery_timeout")]
    pub battery_timeout_ms: u64,
}

fn default_debounce() -> u64 {
    DEFAULT_DEBOUNCE_MS as u64
}

fn default_system_time_interval() -> u64 {
    DEFAULT_SYSTEM_TIME_INTERVAL_MS as u64
}

fn default_battery_timeout() -> u64 {
    DEFAULT_BATTERY_TIMEOUT_MS as u64
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce(),
            system_time_interval_ms: default_system_time_interval(),
            battery_timeout_ms: default_battery_timeout(),
        }
    }
}

impl TimingConfig {
    pub fn debounce(&self) -> Duration {
        millis(self.debounce_ms)
    }

    pub fn system_time_interval(&self) -> Duration {
        millis(self.system_time_interval_ms)
    }

    pub fn battery_timeout(&self) -> Duration {
        millis(self.battery_timeout_ms)
    }
}

/// Upper bound for every timer setting (one day)
const MAX_TIMER_MS: u64 = 86_400_000;

fn millis(ms: u64) -> Duration {
    Duration::milliseconds(ms.min(MAX_TIMER_MS) as i64)
}

impl BridgeConfig {
    /// Create a configuration with every encoder disabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: enable or disable wind
    pub fn with_wind(mut self, enabled: bool) -> Self {
        self.wind = enabled;
        self
    }

    /// Builder method: enable or disable position
    pub fn with_gps_location(mut self, enabled: bool) -> Self {
        self.gps_location = enabled;
        self
    }

    /// Builder method: enable or disable the system time emitter
    pub fn with_system_time(mut self, enabled: bool) -> Self {
        self.system_time = enabled;
        self
    }

    /// Builder method: enable or disable heading
    pub fn with_heading(mut self, enabled: bool) -> Self {
        self.heading = enabled;
        self
    }

    /// Builder method: add a battery
    pub fn add_battery(mut self, signalk_id: impl Into<String>, instance_id: u32) -> Self {
        self.battery_status.push(BatteryConfig::new(signalk_id, instance_id));
        self
    }

    /// Builder method: set the accepted delta context
    pub fn with_self_context(mut self, context: impl Into<String>) -> Self {
        self.self_context = Some(context.into());
        self
    }

    /// Builder method: set the debounce gap
    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.timing.debounce_ms = ms;
        self
    }

    /// Check values the session cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.timing.debounce_ms == 0 {
            return Err(BridgeError::InvalidConfig(
                "debounce_ms must be greater than zero".to_string(),
            ));
        }
        let timers = [
            ("debounce_ms", self.timing.debounce_ms),
            ("system_time_interval_ms", self.timing.system_time_interval_ms),
            ("battery_timeout_ms", self.timing.battery_timeout_ms),
        ];
        for (name, ms) in timers {
            if ms > MAX_TIMER_MS {
                return Err(BridgeError::InvalidConfig(format!(
                    "{} must not exceed {}",
                    name, MAX_TIMER_MS
                )));
            }
        }
        if self.system_time && self.timing.system_time_interval_ms == 0 {
            return Err(BridgeError::InvalidConfig(
                "system_time_interval_ms must be greater than zero".to_string(),
            ));
        }
        for battery in &self.battery_status {
            if battery.signalk_id.is_empty() {
                return Err(BridgeError::InvalidConfig(
                    "battery signalk_id must not be empty".to_string(),
                ));
            }
            if battery.instance_id > u32::from(u8::MAX) {
                return Err(BridgeError::InvalidConfig(format!(
                    "battery '{}' instance {} is out of range 0..=255",
                    battery.signalk_id, battery.instance_id
                )));
            }
        }
        Ok(())
    }

    /// True if no encoder or timer is enabled
    pub fn is_empty(&self) -> bool {
        !self.wind
            && !self.gps_location
            && !self.system_time
            && !self.heading
            && self.battery_status.is_empty()
    }
}
