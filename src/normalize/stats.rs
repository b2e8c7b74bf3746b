use serde_json::{Map, Value};

use super::alias::{self, STATS_FIELDS};
use crate::error::DashboardError;
use crate::model::GalaxyStats;

/// Reads the aggregate record, either flat or nested under `statistics`.
pub fn normalize_stats(doc: &Value) -> Result<GalaxyStats, DashboardError> {
    let top = doc
        .as_object()
        .ok_or_else(|| DashboardError::schema("stats", format!("expected an object, got {}", kind_of(doc))))?;
    let record: &Map<String, Value> = top
        .get("statistics")
        .and_then(Value::as_object)
        .unwrap_or(top);

    let c = |field: &str| alias::count(record, STATS_FIELDS, field);

    // the parsed backend overwrites missionTime with display text
    let mission_time_text = match alias::lookup(record, STATS_FIELDS, "mission_time").and_then(alias::as_count) {
        Some(_) => None,
        None => alias::text(record, STATS_FIELDS, "mission_time")
            .or_else(|| alias::text(record, STATS_FIELDS, "mission_time_text"))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    };

    Ok(GalaxyStats {
        total_players: c("total_players"),
        terminid_kills: c("terminid_kills"),
        automaton_kills: c("automaton_kills"),
        illuminate_kills: c("illuminate_kills"),
        missions_won: c("missions_won"),
        missions_lost: c("missions_lost"),
        deaths: c("deaths"),
        bullets_fired: c("bullets_fired"),
        bullets_hit: c("bullets_hit"),
        friendlies: c("friendlies"),
        mission_time_secs: c("mission_time"),
        mission_time_text,
    })
}

pub(crate) fn kind_of(doc: &Value) -> &'static str {
    match doc {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_and_nested_agree() {
        let flat = json!({"totalPlayers": 90, "terminidKills": 10, "automatonKills": 20,
                          "illuminateKills": 30, "missionsWon": 8, "missionsLost": 2});
        let nested = json!({"statistics": {"playerCount": 90, "bugKills": 10, "botKills": 20,
                            "squidKills": 30, "missionsWon": 8, "missionsLost": 2}});
        let a = normalize_stats(&flat).unwrap();
        assert_eq!(a, normalize_stats(&nested).unwrap());
        assert_eq!(a.total_kills(), 60);
        assert_eq!(a.total_missions(), 10);
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let s = normalize_stats(&json!({})).unwrap();
        assert_eq!(s, GalaxyStats::default());
    }

    #[test]
    fn test_formatted_mission_time_is_kept() {
        let s = normalize_stats(&json!({"statistics": {"missionTime": "2 years, 3 months"}})).unwrap();
        assert_eq!(s.mission_time_secs, 0);
        assert_eq!(s.mission_time_text.as_deref(), Some("2 years, 3 months"));

        let s = normalize_stats(&json!({"totalMissionTime": "5 days"})).unwrap();
        assert_eq!(s.mission_time_text.as_deref(), Some("5 days"));

        let s = normalize_stats(&json!({"missionTime": 3600, "totalMissionTime": "1 hour"})).unwrap();
        assert_eq!(s.mission_time_secs, 3600);
        assert!(s.mission_time_text.is_none());
    }

    #[test]
    fn test_non_object_is_schema_error() {
        let err = normalize_stats(&json!(["No overall stats available."])).unwrap_err();
        assert!(matches!(err, DashboardError::Schema { .. }));
        assert!(normalize_stats(&json!("text")).is_err());
    }
}
