use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::metrics::{self, CampaignProgress};
use crate::model::{CampaignMode, Faction, GalaxyStats, Order, Territory};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerritoryCard {
    pub index: u64,
    pub name: String,
    pub owner: Faction,
    pub color: &'static str,
    pub players: u64,
    /// Percent of all active players fighting here
    pub player_share: f64,
    pub sector: String,
    pub biome: String,
    pub status: TerritoryStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TerritoryStatus {
    Uncontested {
        liberation_percent: f64,
    },
    Contested {
        attacker: Faction,
        attacker_color: &'static str,
        mode: CampaignMode,
        defender_percent: f64,
        attacker_percent: f64,
        ends_at: String,
        countdown_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskCard {
    pub kind: String,
    pub label: String,
    pub target: String,
    pub progress: u64,
    pub goal: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderCard {
    pub id: String,
    pub title: String,
    pub briefing: String,
    pub expires: Option<String>,
    pub reward: Option<u64>,
    pub tasks: Vec<TaskCard>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FactionShares {
    pub terminids: f64,
    pub automatons: f64,
    pub illuminate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KillSummary {
    pub terminids: u64,
    pub automatons: u64,
    pub illuminate: u64,
    pub total: u64,
    pub shares: FactionShares,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MissionSummary {
    pub won: u64,
    pub lost: u64,
    pub total: u64,
    pub win_percent: f64,
}

pub fn defense_countdown_id(index: u64) -> String {
    format!("defense-{}", index)
}

pub fn territory_card(t: &Territory, total_players: u64, now: DateTime<Utc>) -> TerritoryCard {
    let status = match &t.campaign {
        Some(c) => {
            let CampaignProgress {
                defender_percent,
                attacker_percent,
            } = metrics::campaign_progress(c, t, now);
            TerritoryStatus::Contested {
                attacker: c.attacker,
                attacker_color: metrics::faction_color(c.attacker),
                mode: c.mode,
                defender_percent: metrics::round_to(defender_percent, 3),
                attacker_percent: metrics::round_to(attacker_percent, 3),
                ends_at: c.end.to_rfc3339_opts(SecondsFormat::Secs, true),
                countdown_id: defense_countdown_id(t.index),
            }
        }
        None => TerritoryStatus::Uncontested {
            liberation_percent: metrics::round_to(metrics::liberation_progress(t), 3),
        },
    };
    TerritoryCard {
        index: t.index,
        name: t.name.clone(),
        owner: t.owner,
        color: metrics::faction_color(t.owner),
        players: t.players,
        player_share: metrics::player_share(t.players, total_players),
        sector: t.sector.clone(),
        biome: t.biome.clone(),
        status,
    }
}

pub fn order_card(order: &Order) -> OrderCard {
    OrderCard {
        id: order.id.clone(),
        title: order.title.clone(),
        briefing: order.briefing.clone(),
        expires: order.expires.clone(),
        reward: order.reward,
        tasks: order
            .tasks
            .iter()
            .map(|task| TaskCard {
                kind: task.kind.clone(),
                label: task.label.clone(),
                target: task.target.clone(),
                progress: task.progress,
                goal: task.goal,
                percent: metrics::task_progress(task),
            })
            .collect(),
    }
}

pub fn kill_summary(stats: &GalaxyStats) -> KillSummary {
    let total = stats.total_kills();
    KillSummary {
        terminids: stats.terminid_kills,
        automatons: stats.automaton_kills,
        illuminate: stats.illuminate_kills,
        total,
        shares: FactionShares {
            terminids: metrics::kill_share(stats.terminid_kills, total),
            automatons: metrics::kill_share(stats.automaton_kills, total),
            illuminate: metrics::kill_share(stats.illuminate_kills, total),
        },
    }
}

pub fn mission_summary(stats: &GalaxyStats) -> MissionSummary {
    MissionSummary {
        won: stats.missions_won,
        lost: stats.missions_lost,
        total: stats.total_missions(),
        win_percent: metrics::win_percent(stats.missions_won, stats.missions_lost),
    }
}
