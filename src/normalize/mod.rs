//! Raw documents to canonical snapshot.
//!
//! Each batch tolerates bad records: they are dropped, logged, and reported
//! in `rejected`. Only a document whose top level is not a list or mapping
//! fails the whole batch.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{DashboardError, RecordError};
use crate::logging::log_record_rejected;
use crate::model::{GalaxyStats, Order, Territory};

pub mod alias;
pub mod faction;
mod orders;
mod stats;
mod territory;

pub use faction::resolve_faction;
pub use orders::{normalize_order, task_label};
pub use stats::normalize_stats;
pub use territory::normalize_territory;

#[derive(Debug, Clone, PartialEq)]
pub struct Batch<T> {
    pub items: Vec<T>,
    pub rejected: Vec<RecordError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub territories: Vec<Territory>,
    pub orders: Vec<Order>,
    pub stats: GalaxyStats,
    pub rejected: Vec<RecordError>,
}

pub fn normalize(
    raw_territories: &Value,
    raw_orders: &Value,
    raw_stats: &Value,
    fetched_at: DateTime<Utc>,
) -> Result<Normalized, DashboardError> {
    let territories = normalize_territories(raw_territories)?;
    let orders = normalize_orders(raw_orders, &territories.items, fetched_at)?;
    let stats = normalize_stats(raw_stats)?;

    let mut rejected = territories.rejected;
    rejected.extend(orders.rejected);
    Ok(Normalized {
        territories: territories.items,
        orders: orders.items,
        stats,
        rejected,
    })
}

pub fn normalize_territories(doc: &Value) -> Result<Batch<Territory>, DashboardError> {
    let records = records_of(doc, "territories")?;
    Ok(collect(records, |pos, key, raw| normalize_territory(pos, key, raw)))
}

pub fn normalize_orders(
    doc: &Value,
    territories: &[Territory],
    fetched_at: DateTime<Utc>,
) -> Result<Batch<Order>, DashboardError> {
    let records = records_of(doc, "orders")?;
    Ok(collect(records, |pos, _, raw| normalize_order(pos, raw, territories, fetched_at)))
}

fn collect<'a, T, F>(records: Vec<(Option<&'a str>, &'a Value)>, mut read: F) -> Batch<T>
where
    F: FnMut(usize, Option<&'a str>, &'a Value) -> Result<T, RecordError>,
{
    let mut items = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();
    for (pos, (key, raw)) in records.into_iter().enumerate() {
        match read(pos, key, raw) {
            Ok(item) => items.push(item),
            Err(e) => {
                log_record_rejected(e.batch, e.position, &e.reason);
                rejected.push(e);
            }
        }
    }
    Batch { items, rejected }
}

/// A list is taken in order. A mapping keyed by id yields its values ordered
/// by numeric key, with non-numeric keys after in lexical order.
fn records_of<'a>(doc: &'a Value, document: &str) -> Result<Vec<(Option<&'a str>, &'a Value)>, DashboardError> {
    match doc {
        Value::Array(items) => Ok(items.iter().map(|v| (None, v)).collect()),
        Value::Object(map) => {
            let mut entries: Vec<(Option<&'a str>, &'a Value)> =
                map.iter().map(|(k, v)| (Some(k.as_str()), v)).collect();
            entries.sort_by(|(a, _), (b, _)| {
                let a = a.unwrap_or_default();
                let b = b.unwrap_or_default();
                match (a.parse::<u64>(), b.parse::<u64>()) {
                    (Ok(x), Ok(y)) => x.cmp(&y),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => a.cmp(b),
                }
            });
            Ok(entries)
        }
        other => Err(DashboardError::schema(
            document,
            format!("expected a list or mapping, got {}", stats::kind_of(other)),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Faction;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_mapping_ordered_by_numeric_key() {
        let doc = json!({
            "10": {"index": 10, "name": "Ten"},
            "2": {"index": 2, "name": "Two"},
            "1": {"index": 1, "name": "One"}
        });
        let batch = normalize_territories(&doc).unwrap();
        let names: Vec<_> = batch.items.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["One", "Two", "Ten"]);
    }

    #[test]
    fn test_both_faction_encodings_normalize_identically() {
        let a = normalize_territories(&json!([{"index": 1, "name": "A", "owner": 2, "players": 5}])).unwrap();
        let b = normalize_territories(&json!([{"index": 1, "name": "A", "owner": "Terminids", "players": 5}])).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.items[0].owner, Faction::Terminids);
    }

    #[test]
    fn test_bad_record_does_not_sink_the_batch() {
        let doc = json!([
            {"index": 1, "name": "Good"},
            "garbage",
            {"index": 3, "isUnderAttack": true, "eventStartTime": "soon", "eventEndTime": "later"},
            {"index": 4, "name": "Also good"}
        ]);
        let batch = normalize_territories(&doc).unwrap();
        assert_eq!(batch.items.len(), 2);
        assert_eq!(batch.rejected.len(), 2);
        assert_eq!(batch.rejected[0].position, 1);
        assert_eq!(batch.rejected[1].position, 2);
    }

    #[test]
    fn test_unrecognizable_top_level() {
        assert!(matches!(
            normalize_territories(&json!(42)),
            Err(DashboardError::Schema { .. })
        ));
        assert!(normalize_orders(&json!("none"), &[], now()).is_err());
    }

    #[test]
    fn test_full_normalize() {
        let out = normalize(
            &json!([{"index": 7, "name": "Creek", "owner": 3}]),
            &json!([]),
            &json!({"totalPlayers": 10}),
            now(),
        )
        .unwrap();
        assert_eq!(out.territories.len(), 1);
        assert!(out.orders.is_empty());
        assert_eq!(out.stats.total_players, 10);
        assert!(out.rejected.is_empty());
    }
}
