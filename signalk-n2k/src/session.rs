//! Session: everything one running configuration owns
//!
//! A session holds one combinator subscription per data-driven encoder and
//! one periodic emitter per timer. Upstream values are routed to the
//! combinators that declared their key; flushed snapshots are encoded and
//! written to the output sink. [`Session::stop`] releases every subscription
//! and timer at once and leaves the session inert.
//!
//! The session never reads the clock. Drivers call
//! [`handle_value`](Session::handle_value) when a value arrives and
//! [`poll`](Session::poll) when [`next_deadline`](Session::next_deadline)
//! passes.

use crate::combinator::TemporalCombinator;
use crate::config::BridgeConfig;
use crate::encoders::{
    encode_system_time, encode_to_wire, BatteryStatusEncoder, Encoder, GpsLocationEncoder,
    HeadingEncoder, WindEncoder,
};
use crate::periodic::PeriodicEmitter;
use crate::serializer::PgnSerializer;
use crate::sink::OutputSink;
use crate::types::{BridgeError, DataValue, Key, Result, Timestamp};
use chrono::Duration;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared handle to the serializer used for standard-format output
pub type SharedSerializer = Arc<dyn PgnSerializer + Send + Sync>;

/// Handle returned by [`Session::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

/// Handle returned by [`Session::schedule`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(usize);

struct Subscription {
    id: SubscriptionId,
    combinator: TemporalCombinator,
    encoder: Box<dyn Encoder>,
}

/// Active combinators and timers of one run
pub struct Session {
    serializer: SharedSerializer,
    debounce: Duration,
    subscriptions: Vec<Subscription>,
    /// Upstream key → subscriptions listening to it
    routes: HashMap<Key, Vec<SubscriptionId>>,
    timers: Vec<(TimerId, PeriodicEmitter)>,
    next_id: usize,
    stopped: bool,
}

impl Session {
    /// Create an empty session
    pub fn new(serializer: SharedSerializer, debounce: Duration) -> Self {
        Self {
            serializer,
            debounce,
            subscriptions: Vec::new(),
            routes: HashMap::new(),
            timers: Vec::new(),
            next_id: 0,
            stopped: false,
        }
    }

    /// Create a session running exactly the encoders `config` enables
    pub fn start(config: &BridgeConfig, serializer: SharedSerializer, now: Timestamp) -> Result<Self> {
        config.validate()?;
        log::info!("Starting session");

        let mut session = Self::new(serializer, config.timing.debounce());

        if config.wind {
            session.subscribe(Box::new(WindEncoder::new()), now)?;
        }
        if config.gps_location {
            session.subscribe(Box::new(GpsLocationEncoder::new()), now)?;
        }
        if config.system_time {
            let timer = PeriodicEmitter::new(
                "SYSTEM_TIME",
                config.timing.system_time_interval(),
                now,
                Box::new(|at| {
                    let line = encode_system_time(at);
                    log::debug!("system time: {}", line);
                    Some(line)
                }),
            );
            session.schedule(timer);
        }
        if config.heading {
            session.subscribe(Box::new(HeadingEncoder::new()), now)?;
        }
        for battery in &config.battery_status {
            let instance = u8::try_from(battery.instance_id).map_err(|_| {
                BridgeError::InvalidConfig(format!(
                    "battery instance {} out of range",
                    battery.instance_id
                ))
            })?;
            session.subscribe(
                Box::new(BatteryStatusEncoder::new(
                    &battery.signalk_id,
                    instance,
                    config.timing.battery_timeout(),
                )),
                now,
            )?;
        }

        log::info!(
            "Session started: {} subscriptions, {} timers",
            session.subscriptions.len(),
            session.timers.len()
        );
        Ok(session)
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Attach a combinator for `encoder` and route its keys to it
    pub fn subscribe(&mut self, encoder: Box<dyn Encoder>, now: Timestamp) -> Result<SubscriptionId> {
        if self.stopped {
            return Err(BridgeError::InvalidConfig("session is stopped".to_string()));
        }
        if encoder.keys().is_empty() {
            return Err(BridgeError::NoKeys(encoder.name().to_string()));
        }

        let combinator = TemporalCombinator::new(
            encoder.keys().to_vec(),
            encoder.timeouts().to_vec(),
            self.debounce,
            now,
        )?;

        let id = SubscriptionId(self.next_id());
        for key in encoder.keys() {
            self.routes.entry(key.clone()).or_default().push(id);
        }
        log::debug!("subscribe {} for PGN {} ({:?})", encoder.name(), encoder.pgn(), id);

        self.subscriptions.push(Subscription {
            id,
            combinator,
            encoder,
        });
        Ok(id)
    }

    /// Detach a subscription and drop its pending snapshot
    ///
    /// Returns false if the handle was already released.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let Some(pos) = self.subscriptions.iter().position(|s| s.id == id) else {
            return false;
        };
        let mut sub = self.subscriptions.remove(pos);
        sub.combinator.cancel();

        self.routes.retain(|_, ids| {
            ids.retain(|other| *other != id);
            !ids.is_empty()
        });
        log::debug!("unsubscribe {} ({:?})", sub.encoder.name(), id);
        true
    }

    /// Add a periodic emitter
    pub fn schedule(&mut self, mut timer: PeriodicEmitter) -> TimerId {
        let id = TimerId(self.next_id());
        if self.stopped {
            timer.cancel();
            return id;
        }
        log::debug!("schedule {} ({:?})", timer.name(), id);
        self.timers.push((id, timer));
        id
    }

    /// Cancel a periodic emitter. Returns false if it was already gone.
    pub fn cancel_timer(&mut self, id: TimerId) -> bool {
        let Some(pos) = self.timers.iter().position(|(t, _)| *t == id) else {
            return false;
        };
        let (_, mut timer) = self.timers.remove(pos);
        timer.cancel();
        true
    }

    /// Feed one upstream value to every combinator declaring `key`
    ///
    /// Snapshots that were already due are delivered first so the new value
    /// cannot overwrite them. Returns how many combinators took the value.
    pub fn handle_value(
        &mut self,
        key: &str,
        value: DataValue,
        now: Timestamp,
        sink: &mut dyn OutputSink,
    ) -> usize {
        if self.stopped {
            return 0;
        }
        self.poll(now, sink);

        let Some(ids) = self.routes.get(key) else {
            return 0;
        };
        log::trace!("{} = {}", key, value);

        let mut accepted = 0;
        for sub in self.subscriptions.iter_mut().filter(|s| ids.contains(&s.id)) {
            if sub.combinator.update(key, value.clone(), now) {
                accepted += 1;
            }
        }
        accepted
    }

    /// Deliver every due snapshot and timer tick at `now`
    ///
    /// Returns the number of lines emitted.
    pub fn poll(&mut self, now: Timestamp, sink: &mut dyn OutputSink) -> usize {
        if self.stopped {
            return 0;
        }

        let mut emitted = 0;
        for sub in &mut self.subscriptions {
            if let Some(snapshot) = sub.combinator.poll(now) {
                log::trace!("{:?}: {:?}", sub.combinator.keys(), snapshot.values());
                let line =
                    encode_to_wire(sub.encoder.as_ref(), self.serializer.as_ref(), &snapshot, now);
                if let Some(line) = line {
                    log::debug!("emit: {}", line);
                    sink.emit(line);
                    emitted += 1;
                }
            }
        }

        for (_, timer) in &mut self.timers {
            if let Some(line) = timer.poll(now) {
                sink.emit(line);
                emitted += 1;
            }
        }
        emitted
    }

    /// Deliver every pending snapshot immediately, ignoring debounce timers
    pub fn flush(&mut self, now: Timestamp, sink: &mut dyn OutputSink) -> usize {
        if self.stopped {
            return 0;
        }

        let mut emitted = 0;
        for sub in &mut self.subscriptions {
            let Some(snapshot) = sub.combinator.flush() else {
                continue;
            };
            let line =
                encode_to_wire(sub.encoder.as_ref(), self.serializer.as_ref(), &snapshot, now);
            if let Some(line) = line {
                log::debug!("emit: {}", line);
                sink.emit(line);
                emitted += 1;
            }
        }
        emitted
    }

    /// Earliest pending debounce flush or timer tick
    pub fn next_deadline(&self) -> Option<Timestamp> {
        let flushes = self
            .subscriptions
            .iter()
            .filter_map(|s| s.combinator.next_deadline());
        let ticks = self.timers.iter().filter_map(|(_, t)| t.next_deadline());
        flushes.chain(ticks).min()
    }

    /// Release every subscription and timer
    ///
    /// Idempotent: stopping a stopped session does nothing.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        for sub in &mut self.subscriptions {
            sub.combinator.cancel();
        }
        for (_, timer) in &mut self.timers {
            timer.cancel();
        }
        log::info!(
            "Session stopped: released {} subscriptions, {} timers",
            self.subscriptions.len(),
            self.timers.len()
        );
        self.subscriptions.clear();
        self.timers.clear();
        self.routes.clear();
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    /// Check if any subscription listens to `key`
    pub fn is_routed(&self, key: &str) -> bool {
        self.routes.contains_key(key)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop();
    }
}
