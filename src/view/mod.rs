//! Per-view presentation models.
//!
//! `assemble` is pure: it takes a canonical snapshot plus the clock reading
//! used for campaign progress and returns a fully resolved `ViewModel`.
//! Every view accepts empty inputs and yields an empty but well-formed model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{Config, GridLayout};
use crate::metrics;
use crate::model::{Faction, GalaxyStats, Order, Territory};
use crate::timestamp::humanize_duration;

pub mod cards;
pub mod layout;
pub mod overview;

pub use cards::{KillSummary, MissionSummary, OrderCard, TaskCard, TerritoryCard, TerritoryStatus};
pub use overview::{CurrentOrder, OverviewModel, CURRENT_ORDER_COUNTDOWN};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Overview,
    Territories,
    Orders,
    GalaxyStats,
}

impl ViewKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewKind::Overview => "overview",
            ViewKind::Territories => "territories",
            ViewKind::Orders => "orders",
            ViewKind::GalaxyStats => "galaxy_stats",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewKind {
    type Err = String;

    /// Accepts route-style names too (`#home`, `#planets`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_start_matches('#').to_ascii_lowercase();
        match name.as_str() {
            "overview" | "home" => Ok(ViewKind::Overview),
            "territories" | "planets" => Ok(ViewKind::Territories),
            "orders" | "major_orders" => Ok(ViewKind::Orders),
            "galaxy_stats" | "stats" => Ok(ViewKind::GalaxyStats),
            _ => Err(format!("unknown view {:?}", s)),
        }
    }
}

/// A countdown the consumer must start once the view is shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountdownDescriptor {
    pub target_id: String,
    /// Target instant as delivered; may be unparsable.
    pub expires: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerritoryNode {
    pub index: u64,
    pub name: String,
    pub owner: Faction,
    pub css_class: &'static str,
    pub color: &'static str,
    pub players: u64,
    pub sector: String,
    pub biome: String,
    pub contested: bool,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerritoriesModel {
    pub nodes: Vec<TerritoryNode>,
    pub grid: GridLayout,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrdersModel {
    pub orders: Vec<OrderCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsModel {
    pub kills: KillSummary,
    pub missions: MissionSummary,
    pub total_players: u64,
    pub deaths: u64,
    pub kills_per_life: f64,
    pub accuracy: f64,
    pub friendlies: u64,
    pub mission_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewModel {
    Overview(OverviewModel),
    Territories(TerritoriesModel),
    Orders(OrdersModel),
    GalaxyStats(StatsModel),
}

impl ViewModel {
    pub fn kind(&self) -> ViewKind {
        match self {
            ViewModel::Overview(_) => ViewKind::Overview,
            ViewModel::Territories(_) => ViewKind::Territories,
            ViewModel::Orders(_) => ViewKind::Orders,
            ViewModel::GalaxyStats(_) => ViewKind::GalaxyStats,
        }
    }

    /// Countdowns to register after rendering; only the overview has any.
    pub fn countdowns(&self) -> &[CountdownDescriptor] {
        match self {
            ViewModel::Overview(m) => &m.countdowns,
            _ => &[],
        }
    }

    /// Number of primary entries shown, for logging.
    pub fn item_count(&self) -> usize {
        match self {
            ViewModel::Overview(m) => m.top_territories.len(),
            ViewModel::Territories(m) => m.nodes.len(),
            ViewModel::Orders(m) => m.orders.len(),
            ViewModel::GalaxyStats(_) => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewOptions {
    pub top_territories: usize,
    pub grid: GridLayout,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ViewOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            top_territories: cfg.top_territories,
            grid: cfg.grid,
        }
    }
}

pub fn assemble(
    view: ViewKind,
    territories: &[Territory],
    orders: &[Order],
    stats: &GalaxyStats,
    opts: &ViewOptions,
    now: DateTime<Utc>,
) -> ViewModel {
    match view {
        ViewKind::Overview => ViewModel::Overview(overview::build(
            territories,
            orders,
            stats,
            opts.top_territories,
            now,
        )),
        ViewKind::Territories => ViewModel::Territories(territories_model(territories, &opts.grid)),
        ViewKind::Orders => ViewModel::Orders(OrdersModel {
            orders: orders.iter().map(cards::order_card).collect(),
        }),
        ViewKind::GalaxyStats => ViewModel::GalaxyStats(stats_model(stats)),
    }
}

fn territories_model(territories: &[Territory], grid: &GridLayout) -> TerritoriesModel {
    let nodes = territories
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let (x, y) = layout::grid_position(i, grid);
            TerritoryNode {
                index: t.index,
                name: t.name.clone(),
                owner: t.owner,
                css_class: metrics::faction_class(t.owner),
                color: metrics::faction_color(t.owner),
                players: t.players,
                sector: t.sector.clone(),
                biome: t.biome.clone(),
                contested: t.is_contested(),
                x,
                y,
            }
        })
        .collect::<Vec<_>>();
    let (width, height) = layout::canvas_extent(nodes.len(), grid);
    TerritoriesModel {
        nodes,
        grid: *grid,
        width,
        height,
    }
}

fn stats_model(stats: &GalaxyStats) -> StatsModel {
    StatsModel {
        kills: cards::kill_summary(stats),
        missions: cards::mission_summary(stats),
        total_players: stats.total_players,
        deaths: stats.deaths,
        kills_per_life: metrics::kills_per_life(stats),
        accuracy: metrics::accuracy(stats),
        friendlies: stats.friendlies,
        mission_time: stats
            .mission_time_text
            .clone()
            .unwrap_or_else(|| humanize_duration(stats.mission_time_secs)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_stats;
    use serde_json::json;

    fn territory(index: u64, owner: Faction) -> Territory {
        Territory {
            index,
            name: format!("T{}", index),
            owner,
            current_health: 0,
            max_health: 0,
            players: index * 10,
            sector: String::new(),
            biome: String::new(),
            position: None,
            campaign: None,
        }
    }

    #[test]
    fn test_view_kind_aliases() {
        assert_eq!("#home".parse::<ViewKind>(), Ok(ViewKind::Overview));
        assert_eq!("planets".parse::<ViewKind>(), Ok(ViewKind::Territories));
        assert_eq!("#major_orders".parse::<ViewKind>(), Ok(ViewKind::Orders));
        assert_eq!("Galaxy_Stats".parse::<ViewKind>(), Ok(ViewKind::GalaxyStats));
        assert!("#armory".parse::<ViewKind>().is_err());
    }

    #[test]
    fn test_every_view_tolerates_empty_input() {
        let opts = ViewOptions::default();
        for view in [ViewKind::Overview, ViewKind::Territories, ViewKind::Orders, ViewKind::GalaxyStats] {
            let m = assemble(view, &[], &[], &GalaxyStats::default(), &opts, Utc::now());
            assert_eq!(m.kind(), view);
            assert!(m.countdowns().is_empty());
            assert!(serde_json::to_value(&m).is_ok());
        }
    }

    #[test]
    fn test_territory_layout_is_deterministic() {
        let ts = vec![territory(3, Faction::Terminids), territory(1, Faction::Humans), territory(2, Faction::Illuminate)];
        let opts = ViewOptions::default();
        let a = assemble(ViewKind::Territories, &ts, &[], &GalaxyStats::default(), &opts, Utc::now());
        let b = assemble(ViewKind::Territories, &ts, &[], &GalaxyStats::default(), &opts, Utc::now());
        assert_eq!(a, b);
        let ViewModel::Territories(m) = a else { panic!("wrong view") };
        assert_eq!((m.nodes[0].x, m.nodes[0].y), (100.0, 80.0));
        assert_eq!((m.nodes[2].x, m.nodes[2].y), (400.0, 80.0));
        assert_eq!(m.nodes[0].css_class, "terminid-color");
    }

    #[test]
    fn test_stats_view() {
        let stats = GalaxyStats {
            missions_won: 3,
            missions_lost: 1,
            mission_time_secs: 3_600,
            ..Default::default()
        };
        let m = assemble(ViewKind::GalaxyStats, &[], &[], &stats, &ViewOptions::default(), Utc::now());
        let ViewModel::GalaxyStats(s) = m else { panic!("wrong view") };
        assert_eq!(s.missions.win_percent, 75.0);
        assert_eq!(s.mission_time, "1 hour");
    }

    #[test]
    fn test_stats_view_passes_formatted_mission_time_through() {
        let stats = GalaxyStats {
            mission_time_text: Some("2 years, 3 months".to_string()),
            ..Default::default()
        };
        let m = assemble(ViewKind::GalaxyStats, &[], &[], &stats, &ViewOptions::default(), Utc::now());
        let ViewModel::GalaxyStats(s) = m else { panic!("wrong view") };
        assert_eq!(s.mission_time, "2 years, 3 months");
    }

    #[test]
    fn test_stats_view_accuracy_from_upstream_counters() {
        let stats = normalize_stats(&json!({"statistics": {"bulletsFired": 100, "bulletsHit": 400}})).unwrap();
        let m = assemble(ViewKind::GalaxyStats, &[], &[], &stats, &ViewOptions::default(), Utc::now());
        let ViewModel::GalaxyStats(s) = m else { panic!("wrong view") };
        assert_eq!(s.accuracy, 25.0);
    }

    #[test]
    fn test_serialized_shape() {
        let m = assemble(ViewKind::Overview, &[], &[], &GalaxyStats::default(), &ViewOptions::default(), Utc::now());
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v["view"], "overview");
        assert_eq!(v["current_order"], json!({"state": "none"}));
    }
}
