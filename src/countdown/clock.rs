use chrono::{DateTime, Duration, Utc};

/// Wall-clock source for countdown arithmetic.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Wall clock pinned to tokio's timer: `base` plus whatever tokio time has
/// elapsed since construction. Under a paused runtime it advances only when
/// tokio time does, which makes countdowns deterministic in tests.
#[derive(Debug, Clone, Copy)]
pub struct VirtualClock {
    base: DateTime<Utc>,
    origin: tokio::time::Instant,
}

impl VirtualClock {
    pub fn starting_at(base: DateTime<Utc>) -> Self {
        Self {
            base,
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = Duration::from_std(self.origin.elapsed()).unwrap_or_else(|_| Duration::zero());
        self.base + elapsed
    }
}
