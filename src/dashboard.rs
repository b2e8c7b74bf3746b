//! View loading: fetch, normalize, assemble, then arm the view's countdowns.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::countdown::{Clock, CountdownRegistry, SystemClock, Tick};
use crate::error::{DashboardError, ErrorKind};
use crate::gateway::Gateway;
use crate::logging::{log_view_failed, log_view_loaded, log_view_superseded, v_str, ProfileScope};
use crate::model::GalaxyStats;
use crate::normalize::{normalize, normalize_orders, normalize_stats, normalize_territories};
use crate::view::{assemble, ViewKind, ViewModel, ViewOptions};

/// The single user-facing failure of a view load. No partial data rides along.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorState {
    pub view: String,
    pub kind: ErrorKind,
    /// Short text for display
    pub message: String,
    pub detail: String,
}

impl ErrorState {
    fn unknown_view(name: &str) -> Self {
        Self {
            view: name.to_string(),
            kind: ErrorKind::UnknownView,
            message: "404 - Page Not Found".to_string(),
            detail: format!("no view named {:?}", name),
        }
    }

    fn from_error(view: ViewKind, err: &DashboardError) -> Self {
        Self {
            view: view.as_str().to_string(),
            kind: err.kind(),
            message: format!("Error loading {} data.", view_title(view)),
            detail: err.to_string(),
        }
    }
}

fn view_title(view: ViewKind) -> &'static str {
    match view {
        ViewKind::Overview => "homepage",
        ViewKind::Territories => "territory",
        ViewKind::Orders => "major order",
        ViewKind::GalaxyStats => "galaxy stats",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "body", rename_all = "snake_case")]
pub enum ViewOutcome {
    Ready(ViewModel),
    Failed(ErrorState),
}

impl ViewOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, ViewOutcome::Ready(_))
    }

    pub fn model(&self) -> Option<&ViewModel> {
        match self {
            ViewOutcome::Ready(m) => Some(m),
            ViewOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorState> {
        match self {
            ViewOutcome::Ready(_) => None,
            ViewOutcome::Failed(e) => Some(e),
        }
    }
}

pub struct Dashboard<G: Gateway> {
    gateway: G,
    registry: CountdownRegistry,
    options: ViewOptions,
    clock: Arc<dyn Clock>,
    /// Bumped by every load; only the newest load may arm timers.
    load_generation: AtomicU64,
}

impl<G: Gateway> Dashboard<G> {
    /// Returns the dashboard and the stream its countdowns report into.
    pub fn new(gateway: G, cfg: &Config) -> (Self, mpsc::UnboundedReceiver<Tick>) {
        Self::with_clock(
            gateway,
            ViewOptions::from(cfg),
            Arc::new(SystemClock),
            cfg.countdown_cadence(),
        )
    }

    pub fn with_clock(
        gateway: G,
        options: ViewOptions,
        clock: Arc<dyn Clock>,
        cadence: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<Tick>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let registry = CountdownRegistry::with_clock(tx, Arc::clone(&clock), cadence);
        let dashboard = Self {
            gateway,
            registry,
            options,
            clock,
            load_generation: AtomicU64::new(0),
        };
        (dashboard, rx)
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn registry(&self) -> &CountdownRegistry {
        &self.registry
    }

    /// Timers from the previous view are cancelled before anything is
    /// fetched, whether or not this load succeeds. Loads may overlap: a load
    /// that another `load_view` call overtook while it was fetching still
    /// returns its outcome but arms no timers.
    pub async fn load_view(&self, name: &str) -> ViewOutcome {
        let generation = self.load_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.registry.cancel_all();

        let kind = match name.parse::<ViewKind>() {
            Ok(kind) => kind,
            Err(detail) => {
                log_view_failed(name, ErrorKind::UnknownView.as_str(), &detail);
                return ViewOutcome::Failed(ErrorState::unknown_view(name));
            }
        };

        let _scope = ProfileScope::with_context("load_view", &[("view", v_str(kind.as_str()))]);
        let now = self.clock.now();
        let built = self.build(kind, now).await;

        if !self.is_current(generation) {
            log_view_superseded(kind.as_str());
            return match built {
                Ok(model) => ViewOutcome::Ready(model),
                Err(err) => ViewOutcome::Failed(ErrorState::from_error(kind, &err)),
            };
        }
        // an older load may have armed timers between our entry and now
        self.registry.cancel_all();

        match built {
            Ok(model) => {
                for countdown in model.countdowns() {
                    self.registry.start(&countdown.target_id, &countdown.expires);
                }
                log_view_loaded(kind.as_str(), model.item_count(), model.countdowns().len());
                ViewOutcome::Ready(model)
            }
            Err(err) => {
                let state = ErrorState::from_error(kind, &err);
                log_view_failed(kind.as_str(), state.kind.as_str(), &state.detail);
                ViewOutcome::Failed(state)
            }
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.load_generation.load(Ordering::SeqCst) == generation
    }

    async fn build(&self, kind: ViewKind, now: DateTime<Utc>) -> Result<ViewModel, DashboardError> {
        let gw = &self.gateway;
        let opts = &self.options;
        match kind {
            ViewKind::Overview => {
                // all three or nothing
                let (territories, orders, stats) =
                    tokio::try_join!(gw.get_territories(), gw.get_orders(), gw.get_stats())?;
                let snap = normalize(&territories, &orders, &stats, now)?;
                Ok(assemble(kind, &snap.territories, &snap.orders, &snap.stats, opts, now))
            }
            ViewKind::Territories => {
                let batch = normalize_territories(&gw.get_territories().await?)?;
                Ok(assemble(kind, &batch.items, &[], &GalaxyStats::default(), opts, now))
            }
            ViewKind::Orders => {
                let batch = normalize_orders(&gw.get_orders().await?, &[], now)?;
                Ok(assemble(kind, &[], &batch.items, &GalaxyStats::default(), opts, now))
            }
            ViewKind::GalaxyStats => {
                let stats = normalize_stats(&gw.get_stats().await?)?;
                Ok(assemble(kind, &[], &[], &stats, opts, now))
            }
        }
    }
}
