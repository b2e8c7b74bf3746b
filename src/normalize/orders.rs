use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::{Map, Value};

use super::alias::{self, ORDER_FIELDS, TASK_FIELDS};
use crate::error::RecordError;
use crate::model::{Order, Task, Territory};
use crate::timestamp::{parse_instant, parse_instant_value};

const BATCH: &str = "order";

/// Value type tags used by raw assignment tasks.
const VALUE_TYPE_GOAL: i64 = 3;
const VALUE_TYPE_TARGET: i64 = 12;

/// Ten years; anything longer is treated as garbage.
const MAX_EXPIRES_IN_SECS: i64 = 315_360_000;

/// Reads one order. Raw assignments (with a `setting` block) reference
/// territories by index, resolved against `territories`.
pub fn normalize_order(
    position: usize,
    raw: &Value,
    territories: &[Territory],
    fetched_at: DateTime<Utc>,
) -> Result<Order, RecordError> {
    let record = raw
        .as_object()
        .ok_or_else(|| RecordError::new(BATCH, position, "not an object"))?;

    match record.get("setting").and_then(Value::as_object) {
        Some(setting) => read_assignment(position, record, setting, territories, fetched_at),
        None => read_parsed(position, record),
    }
}

fn read_parsed(position: usize, record: &Map<String, Value>) -> Result<Order, RecordError> {
    let (expires, expires_at) = match alias::lookup(record, ORDER_FIELDS, "expires") {
        Some(Value::String(s)) => (Some(s.clone()), parse_instant(s).ok()),
        Some(v @ Value::Number(_)) => {
            let at = parse_instant_value(v).ok();
            (at.map(rfc3339).or_else(|| Some(v.to_string())), at)
        }
        _ => (None, None),
    };

    let tasks = match alias::lookup(record, ORDER_FIELDS, "tasks") {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, t)| read_task(position, i, t))
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(RecordError::new(BATCH, position, "tasks is not a list")),
    };

    Ok(Order {
        id: alias::text(record, ORDER_FIELDS, "id").unwrap_or_else(|| format!("order-{}", position)),
        title: alias::text(record, ORDER_FIELDS, "title").unwrap_or_default(),
        briefing: alias::text(record, ORDER_FIELDS, "briefing").unwrap_or_default(),
        expires,
        expires_at,
        reward: alias::lookup(record, ORDER_FIELDS, "reward").and_then(alias::as_count),
        tasks,
    })
}

fn read_task(position: usize, i: usize, raw: &Value) -> Result<Task, RecordError> {
    let task = raw
        .as_object()
        .ok_or_else(|| RecordError::new(BATCH, position, format!("task {} is not an object", i)))?;
    let kind = alias::text(task, TASK_FIELDS, "kind").unwrap_or_else(|| "Unknown Type".to_string());
    Ok(Task {
        label: task_label(&kind),
        kind,
        target: alias::text(task, TASK_FIELDS, "target").unwrap_or_else(|| "N/A".to_string()),
        progress: alias::count(task, TASK_FIELDS, "progress"),
        goal: alias::count(task, TASK_FIELDS, "goal"),
    })
}

fn read_assignment(
    position: usize,
    record: &Map<String, Value>,
    setting: &Map<String, Value>,
    territories: &[Territory],
    fetched_at: DateTime<Utc>,
) -> Result<Order, RecordError> {
    let expires_at = record
        .get("expiresIn")
        .and_then(alias::as_count)
        .and_then(|secs| i64::try_from(secs).ok())
        .filter(|secs| *secs <= MAX_EXPIRES_IN_SECS)
        .and_then(|secs| fetched_at.checked_add_signed(Duration::seconds(secs)));

    let progress: Vec<u64> = record
        .get("progress")
        .and_then(Value::as_array)
        .map(|p| p.iter().map(|v| alias::as_count(v).unwrap_or(0)).collect())
        .unwrap_or_default();

    let raw_tasks = match setting.get("tasks") {
        None | Some(Value::Null) => &[][..],
        Some(Value::Array(items)) => items.as_slice(),
        Some(_) => return Err(RecordError::new(BATCH, position, "setting.tasks is not a list")),
    };

    let mut tasks = Vec::with_capacity(raw_tasks.len());
    for (i, raw) in raw_tasks.iter().enumerate() {
        let task = raw
            .as_object()
            .ok_or_else(|| RecordError::new(BATCH, position, format!("task {} is not an object", i)))?;
        let values = int_list(task.get("values"));
        let value_types = int_list(task.get("valueTypes"));
        let tagged = |tag: i64| {
            value_types
                .iter()
                .zip(values.iter())
                .find(|(t, _)| **t == tag)
                .map(|(_, v)| *v)
        };

        let target = match tagged(VALUE_TYPE_TARGET) {
            None => "N/A".to_string(),
            Some(id) => territories
                .iter()
                .find(|t| t.index as i64 == id)
                .map(|t| t.name.clone())
                .unwrap_or_else(|| format!("Territory {}", id)),
        };
        let kind = task.get("type").map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });

        let label = kind
            .as_deref()
            .map(task_label)
            .unwrap_or_else(|| "Unknown Task Type".to_string());

        tasks.push(Task {
            label,
            kind: kind.unwrap_or_else(|| "Unknown Type".to_string()),
            target,
            progress: progress.get(i).copied().unwrap_or(0),
            goal: tagged(VALUE_TYPE_GOAL).map(|g| g.max(0) as u64).unwrap_or(0),
        });
    }

    let text = |key: &str| setting.get(key).and_then(Value::as_str).map(str::to_string);

    Ok(Order {
        id: alias::text(record, ORDER_FIELDS, "id").unwrap_or_else(|| format!("order-{}", position)),
        title: text("overrideTitle").unwrap_or_default(),
        briefing: text("overrideBrief").unwrap_or_default(),
        expires: expires_at.map(rfc3339),
        expires_at,
        reward: setting
            .get("reward")
            .and_then(Value::as_object)
            .and_then(|r| r.get("amount"))
            .and_then(alias::as_count),
        tasks,
    })
}

fn int_list(value: Option<&Value>) -> Vec<i64> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().map(|v| v.as_i64().unwrap_or(0)).collect())
        .unwrap_or_default()
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// `LiberatePlanet` -> `Liberate Planet`
pub fn task_label(kind: &str) -> String {
    let mut out = String::with_capacity(kind.len() + 4);
    let mut prev_lower = false;
    for c in kind.chars() {
        if prev_lower && c.is_ascii_uppercase() {
            out.push(' ');
        }
        prev_lower = c.is_ascii_lowercase();
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Faction;
    use chrono::TimeZone;
    use serde_json::json;

    fn fetched() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
    }

    fn territory(index: u64, name: &str) -> Territory {
        Territory {
            index,
            name: name.to_string(),
            owner: Faction::Humans,
            current_health: 0,
            max_health: 0,
            players: 0,
            sector: String::new(),
            biome: String::new(),
            position: None,
            campaign: None,
        }
    }

    #[test]
    fn test_camel_and_snake_schemas_agree() {
        let camel = json!({
            "id": "mo-1", "orderTitle": "Hold the line", "orderBriefing": "Defend.",
            "orderExpires": "2030-01-05 00:00:00", "rewardsAmount": 45,
            "tasks": [{"typeName": "LiberatePlanet", "targetName": "Vernen Wells", "progress": 1, "goal": 2}]
        });
        let snake = json!({
            "id": "mo-1", "order_title": "Hold the line", "order_briefing": "Defend.",
            "order_expires": "2030-01-05 00:00:00", "rewards_amount": 45,
            "tasks": [{"type_name": "LiberatePlanet", "target_name": "Vernen Wells", "progress": 1, "goal": 2}]
        });
        let a = normalize_order(0, &camel, &[], fetched()).unwrap();
        let b = normalize_order(0, &snake, &[], fetched()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.tasks[0].label, "Liberate Planet");
        assert_eq!(a.reward, Some(45));
        assert_eq!(a.expires_at, Some(Utc.with_ymd_and_hms(2030, 1, 5, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_unparsable_expiry_is_kept_for_the_countdown() {
        let raw = json!({"orderTitle": "x", "orderExpires": "whenever"});
        let o = normalize_order(2, &raw, &[], fetched()).unwrap();
        assert_eq!(o.expires.as_deref(), Some("whenever"));
        assert!(o.expires_at.is_none());
        assert_eq!(o.id, "order-2");
    }

    #[test]
    fn test_raw_assignment_schema() {
        let raw = json!({
            "id32": 1234, "expiresIn": 3600, "progress": [5, 0],
            "setting": {
                "overrideTitle": "MAJOR ORDER", "overrideBrief": "Liberate.",
                "tasks": [
                    {"type": 11, "values": [1, 10, 7], "valueTypes": [3, 11, 12]},
                    {"type": 3, "values": [500], "valueTypes": [3]},
                    {"type": "DefendPlanet", "values": [], "valueTypes": []},
                    {"values": [2], "valueTypes": [3]}
                ],
                "reward": {"type": 1, "amount": 50}
            }
        });
        let terr = [territory(7, "Malevelon Creek")];
        let o = normalize_order(0, &raw, &terr, fetched()).unwrap();
        assert_eq!(o.id, "1234");
        assert_eq!(o.title, "MAJOR ORDER");
        assert_eq!(o.reward, Some(50));
        assert_eq!(o.expires_at, Some(Utc.with_ymd_and_hms(2030, 1, 1, 1, 0, 0).unwrap()));
        assert_eq!(o.tasks.len(), 4);
        assert_eq!(o.tasks[0].label, "11");
        assert_eq!(o.tasks[2].label, "Defend Planet");
        assert_eq!(o.tasks[3].label, "Unknown Task Type");
        assert_eq!(o.tasks[0].target, "Malevelon Creek");
        assert_eq!((o.tasks[0].progress, o.tasks[0].goal), (5, 1));
        assert_eq!(o.tasks[1].target, "N/A");
        assert_eq!(o.tasks[1].goal, 500);
    }

    #[test]
    fn test_malformed_orders_rejected() {
        assert!(normalize_order(0, &json!(5), &[], fetched()).is_err());
        assert!(normalize_order(0, &json!({"tasks": "many"}), &[], fetched()).is_err());
        assert!(normalize_order(0, &json!({"tasks": [1]}), &[], fetched()).is_err());
    }

    #[test]
    fn test_task_label() {
        assert_eq!(task_label("LiberatePlanet"), "Liberate Planet");
        assert_eq!(task_label("KillEnemiesOfType"), "Kill Enemies Of Type");
        assert_eq!(task_label("Unknown Type"), "Unknown Type");
    }
}
