use chrono::{DateTime, Utc};
use serde::Serialize;

use super::cards::{self, KillSummary, MissionSummary, OrderCard, TerritoryCard};
use super::CountdownDescriptor;
use crate::model::{GalaxyStats, Order, Territory};

pub const CURRENT_ORDER_COUNTDOWN: &str = "current-order";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CurrentOrder {
    Active(OrderCard),
    /// The renderer shows a placeholder instead of an order card.
    #[serde(rename = "none")]
    NoActiveOrder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewModel {
    pub top_territories: Vec<TerritoryCard>,
    pub current_order: CurrentOrder,
    pub kills: KillSummary,
    pub missions: MissionSummary,
    pub total_players: u64,
    pub countdowns: Vec<CountdownDescriptor>,
}

/// Territories ranked by player count, highest first; ties keep input order.
pub fn top_by_players(territories: &[Territory], n: usize) -> Vec<&Territory> {
    let mut ranked: Vec<&Territory> = territories.iter().collect();
    ranked.sort_by(|a, b| b.players.cmp(&a.players));
    ranked.truncate(n);
    ranked
}

pub fn build(
    territories: &[Territory],
    orders: &[Order],
    stats: &GalaxyStats,
    top_n: usize,
    now: DateTime<Utc>,
) -> OverviewModel {
    let top = top_by_players(territories, top_n);
    let mut countdowns = Vec::new();

    // first order in response order is the current one
    let current = orders.first();
    if let Some(expires) = current.and_then(|o| o.expires.as_deref()).filter(|e| !e.trim().is_empty()) {
        countdowns.push(CountdownDescriptor {
            target_id: CURRENT_ORDER_COUNTDOWN.to_string(),
            expires: expires.to_string(),
        });
    }
    for t in &top {
        if let Some(c) = &t.campaign {
            countdowns.push(CountdownDescriptor {
                target_id: cards::defense_countdown_id(t.index),
                expires: c.end.to_rfc3339(),
            });
        }
    }

    OverviewModel {
        top_territories: top
            .iter()
            .map(|t| cards::territory_card(t, stats.total_players, now))
            .collect(),
        current_order: match current {
            Some(order) => CurrentOrder::Active(cards::order_card(order)),
            None => CurrentOrder::NoActiveOrder,
        },
        kills: cards::kill_summary(stats),
        missions: cards::mission_summary(stats),
        total_players: stats.total_players,
        countdowns,
    }
}
