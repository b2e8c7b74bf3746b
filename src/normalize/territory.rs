use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::alias::{self, CAMPAIGN_FIELDS, TERRITORY_FIELDS};
use super::faction::resolve_faction;
use crate::error::RecordError;
use crate::model::{Campaign, CampaignMode, Position, Territory};
use crate::timestamp::parse_instant_value;

const BATCH: &str = "territory";

/// Reads one territory record. A record without an index of its own takes
/// the mapping key when the document was keyed by id, else its position.
pub fn normalize_territory(position: usize, key: Option<&str>, raw: &Value) -> Result<Territory, RecordError> {
    let record = raw
        .as_object()
        .ok_or_else(|| RecordError::new(BATCH, position, "not an object"))?;

    let index = alias::lookup(record, TERRITORY_FIELDS, "index")
        .and_then(alias::as_count)
        .or_else(|| key.and_then(|k| k.trim().parse::<u64>().ok()))
        .unwrap_or(position as u64);

    let mut current_health = alias::count(record, TERRITORY_FIELDS, "current_health");
    let mut max_health = alias::count(record, TERRITORY_FIELDS, "max_health");

    let campaign = match campaign_source(record) {
        Some((src, nested)) => {
            // a nested event tracks its own health bar
            if nested && alias::lookup(src, CAMPAIGN_FIELDS, "current_health").is_some() {
                current_health = alias::count(src, CAMPAIGN_FIELDS, "current_health");
            }
            if nested && alias::lookup(src, CAMPAIGN_FIELDS, "max_health").is_some() {
                max_health = alias::count(src, CAMPAIGN_FIELDS, "max_health");
            }
            Some(read_campaign(position, src)?)
        }
        None => None,
    };

    Ok(Territory {
        index,
        name: alias::text(record, TERRITORY_FIELDS, "name").unwrap_or_else(|| "Unknown".to_string()),
        owner: resolve_faction(alias::lookup(record, TERRITORY_FIELDS, "owner")),
        current_health: current_health.min(max_health),
        max_health,
        players: alias::count(record, TERRITORY_FIELDS, "players"),
        sector: alias::text(record, TERRITORY_FIELDS, "sector").unwrap_or_else(|| "Unknown Sector".to_string()),
        biome: alias::text(record, TERRITORY_FIELDS, "biome").unwrap_or_else(|| "Unknown Biome".to_string()),
        position: read_position(record),
        campaign,
    })
}

/// Nested `event` object when present, otherwise the record itself when it
/// flags an attack with flat fields.
fn campaign_source(record: &Map<String, Value>) -> Option<(&Map<String, Value>, bool)> {
    if let Some(event) = alias::lookup(record, TERRITORY_FIELDS, "event").and_then(Value::as_object) {
        return Some((event, true));
    }
    if alias::flag(record, CAMPAIGN_FIELDS, "under_attack") {
        return Some((record, false));
    }
    None
}

fn read_campaign(position: usize, src: &Map<String, Value>) -> Result<Campaign, RecordError> {
    let instant = |field: &str| -> Result<DateTime<Utc>, RecordError> {
        let raw = alias::lookup(src, CAMPAIGN_FIELDS, field)
            .ok_or_else(|| RecordError::new(BATCH, position, format!("campaign missing {}", field)))?;
        parse_instant_value(raw).map_err(|e| RecordError::new(BATCH, position, format!("campaign {}: {}", field, e)))
    };
    let start = instant("start")?;
    let end = instant("end")?;
    if end < start {
        return Err(RecordError::new(BATCH, position, "campaign ends before it starts"));
    }

    let mode = match alias::lookup(src, CAMPAIGN_FIELDS, "mode") {
        Some(Value::String(s)) if s.to_ascii_lowercase().contains("liberat") => CampaignMode::Liberation,
        _ => CampaignMode::Defense,
    };

    Ok(Campaign {
        attacker: resolve_faction(alias::lookup(src, CAMPAIGN_FIELDS, "attacker")),
        mode,
        start,
        end,
    })
}

fn read_position(record: &Map<String, Value>) -> Option<Position> {
    let pos = alias::lookup(record, TERRITORY_FIELDS, "position")?.as_object()?;
    Some(Position {
        x: pos.get("x")?.as_f64()?,
        y: pos.get("y")?.as_f64()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Faction;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_flat_schema() {
        let raw = json!({
            "index": 7, "name": "Malevelon Creek", "owner": 3, "players": 1200,
            "currentHealth": 250000, "maxHealth": 1000000,
            "sector": "Severin", "biome": "Jungle",
            "position": {"x": 0.5, "y": -0.25}
        });
        let t = normalize_territory(0, None, &raw).unwrap();
        assert_eq!(t.index, 7);
        assert_eq!(t.owner, Faction::Automatons);
        assert_eq!(t.current_health, 250_000);
        assert_eq!(t.position, Some(Position { x: 0.5, y: -0.25 }));
        assert!(t.campaign.is_none());
    }

    #[test]
    fn test_flat_campaign() {
        let raw = json!({
            "index": 1, "name": "Hellmire", "owner": "Super Earth",
            "isUnderAttack": true, "attackingFaction": "Terminids",
            "campaignType": "Defend",
            "eventStartTime": "2030-01-01 00:00:00", "eventEndTime": "2030-01-02 00:00:00",
            "currentHealth": 10, "maxHealth": 100
        });
        let t = normalize_territory(0, None, &raw).unwrap();
        let c = t.campaign.unwrap();
        assert_eq!(c.attacker, Faction::Terminids);
        assert_eq!(c.mode, CampaignMode::Defense);
        assert_eq!(c.start, Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_nested_event_overrides_health() {
        let raw = json!({
            "index": 2, "currentOwner": "Humans", "health": 1000000, "maxHealth": 1000000,
            "event": {"faction": "Automaton", "startTime": "2030-01-01T00:00:00Z",
                      "endTime": "2030-01-01T12:00:00Z", "health": 400, "maxHealth": 1000}
        });
        let t = normalize_territory(0, None, &raw).unwrap();
        assert_eq!((t.current_health, t.max_health), (400, 1000));
        assert_eq!(t.campaign.unwrap().attacker, Faction::Automatons);
    }

    #[test]
    fn test_liberation_mode() {
        let raw = json!({
            "index": 3, "isUnderAttack": true, "campaignType": "Liberation",
            "eventStartTime": 1893456000, "eventEndTime": 1893459600
        });
        let t = normalize_territory(0, None, &raw).unwrap();
        assert_eq!(t.campaign.unwrap().mode, CampaignMode::Liberation);
    }

    #[test]
    fn test_health_clamped_to_max() {
        let raw = json!({"index": 4, "currentHealth": 500, "maxHealth": 100});
        let t = normalize_territory(0, None, &raw).unwrap();
        assert_eq!(t.current_health, 100);
    }

    #[test]
    fn test_index_from_mapping_key() {
        let t = normalize_territory(0, Some("42"), &json!({"name": "Fori Prime"})).unwrap();
        assert_eq!(t.index, 42);

        let t = normalize_territory(9, None, &json!({"name": "No Index"})).unwrap();
        assert_eq!(t.index, 9);
    }

    #[test]
    fn test_malformed_records_rejected() {
        assert!(normalize_territory(0, None, &json!("nope")).is_err());

        let bad_time = json!({
            "index": 5, "isUnderAttack": true,
            "eventStartTime": "2030-01-01 00:00:00", "eventEndTime": "soon"
        });
        let err = normalize_territory(3, None, &bad_time).unwrap_err();
        assert_eq!(err.position, 3);
        assert!(err.reason.contains("end"));

        let inverted = json!({
            "index": 6, "isUnderAttack": true,
            "eventStartTime": "2030-01-02 00:00:00", "eventEndTime": "2030-01-01 00:00:00"
        });
        assert!(normalize_territory(0, None, &inverted).is_err());
    }
}
