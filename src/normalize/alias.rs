//! Field alias tables.
//!
//! Upstream has shipped more than one name for the same field. Each canonical
//! field lists the names it may appear under, primary first; lookups take the
//! first one that is present and non-null.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy)]
pub struct FieldAlias {
    pub field: &'static str,
    pub names: &'static [&'static str],
}

const fn alias(field: &'static str, names: &'static [&'static str]) -> FieldAlias {
    FieldAlias { field, names }
}

pub const TERRITORY_FIELDS: &[FieldAlias] = &[
    alias("index", &["index", "id"]),
    alias("name", &["name", "planetName"]),
    alias("owner", &["owner", "currentOwner"]),
    alias("current_health", &["currentHealth", "health"]),
    alias("max_health", &["maxHealth", "max_health"]),
    alias("players", &["players", "playerCount"]),
    alias("sector", &["sector", "sectorName"]),
    alias("biome", &["biome", "biomeName"]),
    alias("position", &["position"]),
    alias("event", &["event", "campaign"]),
];

pub const CAMPAIGN_FIELDS: &[FieldAlias] = &[
    alias("under_attack", &["isUnderAttack", "underAttack"]),
    alias("start", &["eventStartTime", "startTime"]),
    alias("end", &["eventEndTime", "endTime"]),
    alias("attacker", &["attackingFaction", "faction", "race"]),
    alias("mode", &["campaignType", "eventType"]),
    alias("current_health", &["health", "currentHealth"]),
    alias("max_health", &["maxHealth", "max_health"]),
];

pub const ORDER_FIELDS: &[FieldAlias] = &[
    alias("id", &["id", "order_id", "id32"]),
    alias("title", &["orderTitle", "order_title", "title"]),
    alias("briefing", &["orderBriefing", "order_briefing", "briefing"]),
    alias("expires", &["orderExpires", "order_expires", "expiration"]),
    alias("reward", &["rewardsAmount", "rewards_amount"]),
    alias("tasks", &["tasks"]),
];

pub const TASK_FIELDS: &[FieldAlias] = &[
    alias("kind", &["typeName", "type_name", "type"]),
    alias("target", &["targetName", "target_name"]),
    alias("progress", &["progress"]),
    alias("goal", &["goal"]),
];

pub const STATS_FIELDS: &[FieldAlias] = &[
    alias("total_players", &["totalPlayers", "playerCount"]),
    alias("terminid_kills", &["terminidKills", "bugKills"]),
    alias("automaton_kills", &["automatonKills", "botKills"]),
    alias("illuminate_kills", &["illuminateKills", "squidKills"]),
    alias("missions_won", &["missionsWon"]),
    alias("missions_lost", &["missionsLost"]),
    alias("deaths", &["deaths"]),
    alias("bullets_fired", &["bulletsFired"]),
    alias("bullets_hit", &["bulletsHit"]),
    alias("friendlies", &["friendlies"]),
    alias("mission_time", &["missionTime", "timePlayed"]),
    alias("mission_time_text", &["totalMissionTime"]),
];

fn names_for(table: &'static [FieldAlias], field: &str) -> &'static [&'static str] {
    table
        .iter()
        .find(|a| a.field == field)
        .map(|a| a.names)
        .unwrap_or(&[])
}

pub fn lookup<'a>(record: &'a Map<String, Value>, table: &'static [FieldAlias], field: &str) -> Option<&'a Value> {
    names_for(table, field)
        .iter()
        .filter_map(|name| record.get(*name))
        .find(|v| !v.is_null())
}

/// Non-negative integer reading; floats are truncated, numeric strings accepted.
pub fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|i| i.max(0) as u64))
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.max(0.0) as u64)),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.max(0.0) as u64),
        _ => None,
    }
}

/// First alias that reads as a count, or 0 when none does.
pub fn count(record: &Map<String, Value>, table: &'static [FieldAlias], field: &str) -> u64 {
    names_for(table, field)
        .iter()
        .filter_map(|name| record.get(*name))
        .find_map(as_count)
        .unwrap_or(0)
}

/// Text field; an object is read through its `name` member.
pub fn text(record: &Map<String, Value>, table: &'static [FieldAlias], field: &str) -> Option<String> {
    match lookup(record, table, field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(o) => o.get("name").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

pub fn flag(record: &Map<String, Value>, table: &'static [FieldAlias], field: &str) -> bool {
    match lookup(record, table, field) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(Value::String(s)) => matches!(s.to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
        _ => false,
    }
}
