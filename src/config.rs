use serde::Serialize;
use std::time::Duration;

/// Runtime settings, read from the environment with fallbacks.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_base: String,
    pub planets_path: String,
    pub orders_path: String,
    pub stats_path: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// How many territories the overview highlights
    pub top_territories: usize,
    pub grid: GridLayout,
    pub countdown_cadence_ms: u64,
}

/// Fixed virtual grid the territory graph is laid out on.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GridLayout {
    pub columns: usize,
    pub spacing_x: f64,
    pub spacing_y: f64,
    pub origin_x: f64,
    pub origin_y: f64,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            columns: 5,
            spacing_x: 150.0,
            spacing_y: 120.0,
            origin_x: 100.0,
            origin_y: 80.0,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "http://127.0.0.1:8000".to_string(),
            planets_path: "/api/planets".to_string(),
            orders_path: "/api/major_orders".to_string(),
            stats_path: "/api/galaxy_stats".to_string(),
            user_agent: "galacticwar-dashboard/0.1".to_string(),
            request_timeout_secs: 10,
            top_territories: 6,
            grid: GridLayout::default(),
            countdown_cadence_ms: 1000,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let d = Self::default();
        let g = d.grid;
        Self {
            api_base: std::env::var("WAR_API_BASE").unwrap_or(d.api_base),
            planets_path: std::env::var("WAR_PLANETS_PATH").unwrap_or(d.planets_path),
            orders_path: std::env::var("WAR_ORDERS_PATH").unwrap_or(d.orders_path),
            stats_path: std::env::var("WAR_STATS_PATH").unwrap_or(d.stats_path),
            user_agent: std::env::var("WAR_USER_AGENT").unwrap_or(d.user_agent),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(d.request_timeout_secs),
            top_territories: std::env::var("TOP_TERRITORIES").ok().and_then(|v| v.parse().ok()).unwrap_or(d.top_territories),
            grid: GridLayout {
                // zero columns would divide by zero in the layout
                columns: std::env::var("GRID_COLUMNS").ok().and_then(|v| v.parse().ok()).filter(|c| *c > 0).unwrap_or(g.columns),
                spacing_x: std::env::var("GRID_SPACING_X").ok().and_then(|v| v.parse().ok()).unwrap_or(g.spacing_x),
                spacing_y: std::env::var("GRID_SPACING_Y").ok().and_then(|v| v.parse().ok()).unwrap_or(g.spacing_y),
                origin_x: std::env::var("GRID_ORIGIN_X").ok().and_then(|v| v.parse().ok()).unwrap_or(g.origin_x),
                origin_y: std::env::var("GRID_ORIGIN_Y").ok().and_then(|v| v.parse().ok()).unwrap_or(g.origin_y),
            },
            countdown_cadence_ms: std::env::var("COUNTDOWN_CADENCE_MS").ok().and_then(|v| v.parse().ok()).filter(|ms| *ms > 0).unwrap_or(d.countdown_cadence_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn countdown_cadence(&self) -> Duration {
        Duration::from_millis(self.countdown_cadence_ms)
    }
}
