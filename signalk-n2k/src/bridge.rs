//! Lifecycle controller
//!
//! [`Bridge`] is the start/stop surface a host drives. It owns at most one
//! [`Session`]; starting again replaces the running session, and stopping
//! when nothing runs is a no-op.

use crate::config::BridgeConfig;
use crate::serializer::Pgn2000Serializer;
use crate::session::{Session, SharedSerializer};
use crate::sink::OutputSink;
use crate::types::{DataValue, Result, Timestamp};
use std::sync::Arc;

/// Start/stop controller around a [`Session`]
pub struct Bridge {
    serializer: SharedSerializer,
    session: Option<Session>,
}

impl Bridge {
    /// Bridge using the built-in PGN serializer
    pub fn new() -> Self {
        Self::with_serializer(Arc::new(Pgn2000Serializer::new()))
    }

    /// Bridge using a custom PGN serializer
    pub fn with_serializer(serializer: SharedSerializer) -> Self {
        Self {
            serializer,
            session: None,
        }
    }

    /// Start a session for `config`, stopping any running one first
    ///
    /// On error the bridge is left stopped.
    pub fn start(&mut self, config: &BridgeConfig, now: Timestamp) -> Result<()> {
        self.stop();
        let session = Session::start(config, Arc::clone(&self.serializer), now)?;
        self.session = Some(session);
        Ok(())
    }

    /// Stop the running session, if any
    pub fn stop(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.stop();
        }
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Access the running session
    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    /// Forward an upstream value; ignored while stopped
    pub fn handle_value(
        &mut self,
        key: &str,
        value: DataValue,
        now: Timestamp,
        sink: &mut dyn OutputSink,
    ) -> usize {
        match &mut self.session {
            Some(session) => session.handle_value(key, value, now, sink),
            None => 0,
        }
    }

    /// Deliver everything due at `now`; ignored while stopped
    pub fn poll(&mut self, now: Timestamp, sink: &mut dyn OutputSink) -> usize {
        match &mut self.session {
            Some(session) => session.poll(now, sink),
            None => 0,
        }
    }

    /// Deliver every pending snapshot immediately; ignored while stopped
    pub fn flush(&mut self, now: Timestamp, sink: &mut dyn OutputSink) -> usize {
        match &mut self.session {
            Some(session) => session.flush(now, sink),
            None => 0,
        }
    }

    /// Earliest instant at which [`poll`](Self::poll) has work
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.session.as_ref().and_then(|s| s.next_deadline())
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn at(ms: i64) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap() + Duration::milliseconds(ms)
    }

    #[test]
    fn test_stop_without_start() {
        let mut bridge = Bridge::new();
        bridge.stop();
        bridge.stop();
        assert!(!bridge.is_running());
    }

    #[test]
    fn test_restart_replaces_session() {
        let mut bridge = Bridge::new();
        bridge.start(&BridgeConfig::new().with_wind(true), at(0)).unwrap();
        bridge.start(&BridgeConfig::new().with_heading(true), at(0)).unwrap();

        let session = bridge.session_mut().unwrap();
        assert_eq!(session.subscription_count(), 1);
        assert!(session.is_routed("navigation.headingMagnetic"));
        assert!(!session.is_routed("environment.wind.angleApparent"));
    }

    #[test]
    fn test_failed_start_leaves_bridge_stopped() {
        let mut bridge = Bridge::new();
        bridge.start(&BridgeConfig::new().with_wind(true), at(0)).unwrap();
        let bad = BridgeConfig::new().add_battery("house", 999);
        assert!(bridge.start(&bad, at(0)).is_err());
        assert!(!bridge.is_running());
    }

    #[test]
    fn test_values_ignored_while_stopped() {
        let mut bridge = Bridge::new();
        let mut out: Vec<String> = Vec::new();
        assert_eq!(
            bridge.handle_value("navigation.headingMagnetic", DataValue::Number(1.0), at(0), &mut out),
            0
        );
        assert_eq!(bridge.poll(at(100), &mut out), 0);
        assert_eq!(bridge.next_deadline(), None);
    }
}
