//! Countdown registry lifecycle under paused tokio time.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use galacticwar::countdown::{CountdownRegistry, CountdownState, Tick, VirtualClock};

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
}

fn registry() -> (CountdownRegistry, UnboundedReceiver<Tick>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let clock = Arc::new(VirtualClock::starting_at(base() - chrono::Duration::seconds(3)));
    (CountdownRegistry::with_clock(tx, clock, Duration::from_secs(1)), rx)
}

fn drain(rx: &mut UnboundedReceiver<Tick>) -> Vec<Tick> {
    let mut out = Vec::new();
    while let Ok(t) = rx.try_recv() {
        out.push(t);
    }
    out
}

#[tokio::test(start_paused = true)]
async fn restarting_a_name_leaves_one_timer() {
    let (reg, mut rx) = registry();
    reg.start("mo", "2030-01-01 00:00:00");
    reg.start("mo", "2030-01-01 00:00:00");
    assert_eq!(reg.active_count(), 1);

    tokio::time::sleep(Duration::from_secs(10)).await;
    let expired = drain(&mut rx)
        .into_iter()
        .filter(|t| t.name == "mo" && t.state == CountdownState::Expired)
        .count();
    assert_eq!(expired, 1);
    assert!(!reg.is_active("mo"));
}

#[tokio::test(start_paused = true)]
async fn cancel_all_silences_every_timer() {
    let (reg, mut rx) = registry();
    reg.start_at("a", base());
    reg.start_at("b", base() + chrono::Duration::seconds(30));
    assert_eq!(reg.cancel_all(), 2);
    assert_eq!(reg.active_count(), 0);

    drain(&mut rx);
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancelling_one_timer_leaves_others_running() {
    let (reg, mut rx) = registry();
    reg.start_at("a", base() + chrono::Duration::seconds(60));
    reg.start_at("b", base() + chrono::Duration::seconds(60));
    assert!(reg.cancel("a"));
    drain(&mut rx);

    tokio::time::sleep(Duration::from_millis(2500)).await;
    let ticks = drain(&mut rx);
    assert_eq!(ticks.len(), 2);
    assert!(ticks.iter().all(|t| t.name == "b"));
    assert!(reg.is_active("b"));
}

#[tokio::test(start_paused = true)]
async fn bare_target_counts_down_as_utc() {
    let (reg, mut rx) = registry();
    let first = reg.start("ny", "2030-01-01 00:00:00");
    assert_eq!(first, CountdownState::Remaining { seconds: 3 });

    let mut states = Vec::new();
    loop {
        let tick = rx.recv().await.unwrap();
        states.push(tick.state.display());
        if tick.state.is_terminal() {
            break;
        }
    }
    assert_eq!(
        states,
        ["0d 00h 00m 03s", "0d 00h 00m 02s", "0d 00h 00m 01s", "EXPIRED"]
    );
}

#[tokio::test(start_paused = true)]
async fn garbage_target_is_terminal_invalid() {
    let (reg, mut rx) = registry();
    let state = reg.start("x", "not-a-date");
    assert_eq!(state, CountdownState::Invalid { input: "not-a-date".to_string() });
    assert_eq!(reg.active_count(), 0);

    tokio::time::sleep(Duration::from_secs(5)).await;
    let ticks = drain(&mut rx);
    assert_eq!(ticks.len(), 1);
    assert_eq!(ticks[0].state.display(), "Invalid Date");
}

#[tokio::test(start_paused = true)]
async fn dropping_registry_stops_timers() {
    let (reg, mut rx) = registry();
    reg.start_at("a", base() + chrono::Duration::seconds(60));
    drop(reg);
    drain(&mut rx);
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(rx.try_recv().is_err());
}
