//! Real-time driver
//!
//! A reader thread parses delta lines and sends them over a channel. The
//! main thread owns the bridge exclusively: it waits for the next delta or
//! the bridge's next deadline, whichever comes first, and stamps everything
//! with the wall clock.

use crate::delta::{parse_line, ContextFilter, Delta};
use anyhow::Result;
use chrono::Utc;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use signalk_n2k::{Bridge, OutputSink};
use std::io::BufRead;
use std::thread;

/// Counters reported when the run ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub deltas: u64,
    pub skipped_deltas: u64,
    pub values: u64,
    pub lines: u64,
}

/// Spawn a thread feeding parsed deltas from `reader` into a channel
///
/// The channel disconnects when the reader hits end of input.
pub fn spawn_reader<R>(reader: R) -> Result<Receiver<Delta>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = crossbeam_channel::unbounded();
    thread::Builder::new()
        .name("delta-reader".to_string())
        .spawn(move || read_deltas(reader, tx))?;
    Ok(rx)
}

fn read_deltas<R: BufRead>(reader: R, tx: Sender<Delta>) {
    for (lineno, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::error!("Input read failed: {}", e);
                break;
            }
        };
        match parse_line(&line) {
            Ok(Some(delta)) => {
                if tx.send(delta).is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => log::warn!("line {}: {:#}", lineno + 1, e),
        }
    }
    log::debug!("Input ended");
}

/// Counts lines on their way to the real sink
struct CountingSink<'a> {
    inner: &'a mut dyn OutputSink,
    count: u64,
}

impl OutputSink for CountingSink<'_> {
    fn emit(&mut self, line: String) {
        self.count += 1;
        self.inner.emit(line);
    }
}

/// Drive `bridge` until the input ends (and, with `keep_alive`, while
/// timers remain)
pub fn run(
    bridge: &mut Bridge,
    filter: &ContextFilter,
    input: Receiver<Delta>,
    keep_alive: bool,
    sink: &mut dyn OutputSink,
) -> RunStats {
    let mut stats = RunStats::default();
    let mut sink = CountingSink {
        inner: sink,
        count: 0,
    };

    loop {
        let received = match bridge.next_deadline() {
            Some(deadline) => {
                let wait = (deadline - Utc::now()).to_std().unwrap_or_default();
                input.recv_timeout(wait)
            }
            None => input.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        let now = Utc::now();
        match received {
            Ok(delta) => {
                stats.deltas += 1;
                if !filter.accepts(&delta) {
                    stats.skipped_deltas += 1;
                    log::trace!("skip delta for {:?}", delta.context);
                    continue;
                }
                for (path, value) in delta.into_values() {
                    stats.values += 1;
                    bridge.handle_value(&path, value, now, &mut sink);
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                bridge.poll(now, &mut sink);
            }
            Err(RecvTimeoutError::Disconnected) => {
                bridge.flush(now, &mut sink);
                if keep_alive {
                    run_timers(bridge, &mut sink);
                }
                break;
            }
        }
    }

    bridge.stop();
    stats.lines = sink.count;
    stats
}

/// Keep polling timers after the input is gone
fn run_timers(bridge: &mut Bridge, sink: &mut dyn OutputSink) {
    while let Some(deadline) = bridge.next_deadline() {
        if let Ok(wait) = (deadline - Utc::now()).to_std() {
            thread::sleep(wait);
        }
        bridge.poll(Utc::now(), sink);
    }
}
