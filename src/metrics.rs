//! Derived figures over canonical data. Pure: no I/O, no clock reads.
//!
//! Every ratio defines its zero-denominator result and every percentage is
//! clamped to [0, 100], so nothing here can hand a NaN to a renderer.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{Campaign, Faction, GalaxyStats, Task, Territory};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CampaignProgress {
    pub defender_percent: f64,
    pub attacker_percent: f64,
}

pub fn clamp_percent(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 100.0)
    }
}

pub fn round_to(x: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (x * scale).round() / scale
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

/// Share of `count` in `total`, as a percent rounded to 2 places.
pub fn kill_share(count: u64, total: u64) -> f64 {
    round_to(clamp_percent(ratio(count as f64, total as f64) * 100.0), 2)
}

pub fn player_share(players: u64, total_players: u64) -> f64 {
    kill_share(players, total_players)
}

pub fn win_percent(won: u64, lost: u64) -> f64 {
    kill_share(won, won.saturating_add(lost))
}

/// Health-bar progress of an uncontested territory. The bar is inverted for
/// territories the default holder does not own.
pub fn liberation_progress(territory: &Territory) -> f64 {
    if territory.max_health == 0 {
        return 0.0;
    }
    let held = ratio(territory.current_health as f64, territory.max_health as f64) * 100.0;
    let progress = if territory.owner.is_default_holder() { held } else { 100.0 - held };
    clamp_percent(progress)
}

pub fn campaign_progress(campaign: &Campaign, territory: &Territory, now: DateTime<Utc>) -> CampaignProgress {
    let defender = if territory.max_health == 0 {
        0.0
    } else {
        (1.0 - ratio(territory.current_health as f64, territory.max_health as f64)) * 100.0
    };

    let window_ms = (campaign.end - campaign.start).num_milliseconds();
    let attacker = if window_ms <= 0 {
        // already at its boundary
        100.0
    } else {
        let elapsed_ms = (now - campaign.start).num_milliseconds();
        elapsed_ms as f64 / window_ms as f64 * 100.0
    };

    CampaignProgress {
        defender_percent: clamp_percent(defender),
        attacker_percent: clamp_percent(attacker),
    }
}

/// A zero-goal task has no measurable progress.
pub fn task_progress(task: &Task) -> f64 {
    if task.goal == 0 {
        return 0.0;
    }
    round_to(clamp_percent(ratio(task.progress as f64, task.goal as f64) * 100.0), 2)
}

/// Total kills per death, one decimal; 0 with no deaths.
pub fn kills_per_life(stats: &GalaxyStats) -> f64 {
    round_to(ratio(stats.total_kills() as f64, stats.deaths as f64), 1)
}

/// Upstream swaps the two bullet counters: `bulletsHit` carries shots fired
/// and `bulletsFired` carries hits. 0 when nothing was fired.
pub fn accuracy(stats: &GalaxyStats) -> f64 {
    round_to(clamp_percent(ratio(stats.bullets_fired as f64, stats.bullets_hit as f64) * 100.0), 2)
}

pub const DEFAULT_COLOR: &str = "#41639c";

pub fn faction_color(faction: Faction) -> &'static str {
    match faction {
        Faction::Terminids => "#ff9f00",
        Faction::Automatons => "#fe6a67",
        Faction::Illuminate => "#db58fb",
        Faction::Humans => DEFAULT_COLOR,
    }
}

pub fn faction_class(faction: Faction) -> &'static str {
    match faction {
        Faction::Terminids => "terminid-color",
        Faction::Automatons => "automaton-color",
        Faction::Illuminate => "illuminate-color",
        Faction::Humans => "seaf-color",
    }
}
