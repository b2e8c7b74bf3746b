use serde_json::Value;

use crate::model::Faction;

/// Resolves either encoding upstream has used: integer codes or names.
/// Anything unmapped belongs to the default holder.
pub fn resolve_faction(value: Option<&Value>) -> Faction {
    match value {
        Some(Value::Number(n)) => n.as_i64().map(from_code).unwrap_or(Faction::Humans),
        Some(Value::String(s)) => from_name(s),
        _ => Faction::Humans,
    }
}

fn from_code(code: i64) -> Faction {
    match code {
        2 => Faction::Terminids,
        3 => Faction::Automatons,
        4 => Faction::Illuminate,
        _ => Faction::Humans,
    }
}

fn from_name(name: &str) -> Faction {
    let name = name.trim();
    if let Ok(code) = name.parse::<i64>() {
        return from_code(code);
    }
    match name.to_ascii_lowercase().as_str() {
        "terminids" | "terminid" => Faction::Terminids,
        "automaton" | "automatons" => Faction::Automatons,
        "illuminate" => Faction::Illuminate,
        _ => Faction::Humans,
    }
}
