//! Canonical snapshot types produced by the normalizer.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// The warring sides. `Humans` is the default holder of every territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Faction {
    Humans,
    Terminids,
    Automatons,
    Illuminate,
}

impl Faction {
    pub const ALL: [Faction; 4] = [
        Faction::Humans,
        Faction::Terminids,
        Faction::Automatons,
        Faction::Illuminate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Faction::Humans => "Super Earth",
            Faction::Terminids => "Terminids",
            Faction::Automatons => "Automatons",
            Faction::Illuminate => "Illuminate",
        }
    }

    pub fn is_default_holder(&self) -> bool {
        matches!(self, Faction::Humans)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignMode {
    Defense,
    Liberation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Campaign {
    pub attacker: Faction,
    pub mode: CampaignMode,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Territory {
    pub index: u64,
    pub name: String,
    pub owner: Faction,
    pub current_health: u64,
    pub max_health: u64,
    pub players: u64,
    pub sector: String,
    pub biome: String,
    pub position: Option<Position>,
    pub campaign: Option<Campaign>,
}

impl Territory {
    pub fn is_contested(&self) -> bool {
        self.campaign.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub kind: String,
    /// Display form of `kind`, e.g. `Liberate Planet`
    pub label: String,
    pub target: String,
    pub progress: u64,
    pub goal: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: String,
    pub title: String,
    pub briefing: String,
    /// Expiration as delivered; parsed lazily by the countdown registry.
    pub expires: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub reward: Option<u64>,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GalaxyStats {
    pub total_players: u64,
    pub terminid_kills: u64,
    pub automaton_kills: u64,
    pub illuminate_kills: u64,
    pub missions_won: u64,
    pub missions_lost: u64,
    pub deaths: u64,
    pub bullets_fired: u64,
    pub bullets_hit: u64,
    pub friendlies: u64,
    /// Accumulated mission time in seconds
    pub mission_time_secs: u64,
    /// Mission time the backend already formatted for display.
    pub mission_time_text: Option<String>,
}

impl GalaxyStats {
    pub fn total_kills(&self) -> u64 {
        self.terminid_kills
            .saturating_add(self.automaton_kills)
            .saturating_add(self.illuminate_kills)
    }

    pub fn total_missions(&self) -> u64 {
        self.missions_won.saturating_add(self.missions_lost)
    }
}
