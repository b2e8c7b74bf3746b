//! Named countdown timers.
//!
//! The registry owns every running timer. Each timer is its own tokio task
//! ticking at a fixed cadence and reporting into one channel. Starting a
//! name that is already running replaces it; cancelling is immediate: once
//! `cancel` returns, that timer will not report again.
//!
//! Timers must be started from within a tokio runtime.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::logging::log_countdown;
use crate::timestamp::{format_remaining, parse_instant};

mod clock;

pub use clock::{Clock, SystemClock, VirtualClock};

pub const DEFAULT_CADENCE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CountdownState {
    Remaining { seconds: i64 },
    /// Terminal; reported once.
    Expired,
    /// Terminal; the target could not be parsed.
    Invalid { input: String },
}

impl CountdownState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CountdownState::Remaining { .. })
    }

    pub fn display(&self) -> String {
        match self {
            CountdownState::Remaining { seconds } => format_remaining(*seconds),
            CountdownState::Expired => "EXPIRED".to_string(),
            CountdownState::Invalid { .. } => "Invalid Date".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tick {
    pub name: String,
    pub state: CountdownState,
}

pub fn evaluate(target: DateTime<Utc>, now: DateTime<Utc>) -> CountdownState {
    if now >= target {
        CountdownState::Expired
    } else {
        CountdownState::Remaining {
            seconds: (target - now).num_seconds(),
        }
    }
}

struct TimerEntry {
    generation: u64,
    target: DateTime<Utc>,
    handle: JoinHandle<()>,
}

type TimerTable = Arc<Mutex<HashMap<String, TimerEntry>>>;

fn lock(table: &Mutex<HashMap<String, TimerEntry>>) -> MutexGuard<'_, HashMap<String, TimerEntry>> {
    table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct CountdownRegistry {
    timers: TimerTable,
    sink: mpsc::UnboundedSender<Tick>,
    clock: Arc<dyn Clock>,
    cadence: Duration,
    next_generation: AtomicU64,
}

impl CountdownRegistry {
    pub fn new(sink: mpsc::UnboundedSender<Tick>) -> Self {
        Self::with_clock(sink, Arc::new(SystemClock), DEFAULT_CADENCE)
    }

    pub fn with_clock(sink: mpsc::UnboundedSender<Tick>, clock: Arc<dyn Clock>, cadence: Duration) -> Self {
        Self {
            timers: Arc::new(Mutex::new(HashMap::new())),
            sink,
            clock,
            cadence: if cadence.is_zero() { DEFAULT_CADENCE } else { cadence },
            next_generation: AtomicU64::new(0),
        }
    }

    /// Parses `target` (bare timestamps are UTC) and starts counting down to
    /// it. An unparsable target stops any timer under `name` and reports
    /// `Invalid` once.
    pub fn start(&self, name: &str, target: &str) -> CountdownState {
        match parse_instant(target) {
            Ok(at) => self.start_at(name, at),
            Err(e) => {
                let mut timers = lock(&self.timers);
                if let Some(old) = timers.remove(name) {
                    old.handle.abort();
                }
                log_countdown(name, "invalid_target", &e.to_string());
                let state = CountdownState::Invalid {
                    input: target.to_string(),
                };
                self.emit(name, &state);
                state
            }
        }
    }

    /// Reports the current state immediately, then once per cadence until
    /// the target passes.
    pub fn start_at(&self, name: &str, target: DateTime<Utc>) -> CountdownState {
        let mut timers = lock(&self.timers);
        if let Some(old) = timers.remove(name) {
            old.handle.abort();
            log_countdown(name, "replaced", "");
        }

        let state = evaluate(target, self.clock.now());
        self.emit(name, &state);
        if state.is_terminal() {
            log_countdown(name, "expired", "");
            return state;
        }

        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        let handle = tokio::spawn(run_timer(
            name.to_string(),
            generation,
            target,
            Arc::clone(&self.timers),
            self.sink.clone(),
            Arc::clone(&self.clock),
            self.cadence,
        ));
        timers.insert(
            name.to_string(),
            TimerEntry {
                generation,
                target,
                handle,
            },
        );
        log_countdown(name, "started", &target.to_rfc3339());
        state
    }

    /// No-op when `name` is not running.
    pub fn cancel(&self, name: &str) -> bool {
        match lock(&self.timers).remove(name) {
            Some(entry) => {
                entry.handle.abort();
                log_countdown(name, "cancelled", "");
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) -> usize {
        let mut timers = lock(&self.timers);
        let count = timers.len();
        for (name, entry) in timers.drain() {
            entry.handle.abort();
            log_countdown(&name, "cancelled", "");
        }
        count
    }

    pub fn is_active(&self, name: &str) -> bool {
        lock(&self.timers).contains_key(name)
    }

    pub fn active_count(&self) -> usize {
        lock(&self.timers).len()
    }

    pub fn active_names(&self) -> Vec<String> {
        let mut names: Vec<String> = lock(&self.timers).keys().cloned().collect();
        names.sort();
        names
    }

    pub fn target_of(&self, name: &str) -> Option<DateTime<Utc>> {
        lock(&self.timers).get(name).map(|e| e.target)
    }

    fn emit(&self, name: &str, state: &CountdownState) {
        let _ = self.sink.send(Tick {
            name: name.to_string(),
            state: state.clone(),
        });
    }
}

impl Drop for CountdownRegistry {
    fn drop(&mut self) {
        for (_, entry) in lock(&self.timers).drain() {
            entry.handle.abort();
        }
    }
}

async fn run_timer(
    name: String,
    generation: u64,
    target: DateTime<Utc>,
    timers: TimerTable,
    sink: mpsc::UnboundedSender<Tick>,
    clock: Arc<dyn Clock>,
    cadence: Duration,
) {
    let mut interval = interval_at(Instant::now() + cadence, cadence);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        interval.tick().await;

        // The table lock is held while reporting, so a concurrent cancel
        // either happens-before this check or waits for the send.
        let mut table = lock(&timers);
        match table.get(&name) {
            Some(entry) if entry.generation == generation => {}
            _ => return,
        }
        let state = evaluate(target, clock.now());
        let _ = sink.send(Tick {
            name: name.clone(),
            state: state.clone(),
        });
        if state.is_terminal() {
            table.remove(&name);
            drop(table);
            log_countdown(&name, "expired", "");
            return;
        }
    }
}
