//! Instant parsing and duration formatting.
//!
//! Upstream timestamps arrive in several dialects: RFC3339, bare
//! `YYYY-MM-DD HH:MM:SS` with no zone, `... UTC+0000`, strings with a trailing
//! `(Time Remaining: ...)` note, and epoch numbers. Bare forms are UTC.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::error::TimestampError;

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Epoch numbers above this are taken to be milliseconds.
const EPOCH_MILLIS_THRESHOLD: f64 = 1e11;

pub fn parse_instant(input: &str) -> Result<DateTime<Utc>, TimestampError> {
    let err = || TimestampError {
        input: input.to_string(),
    };

    let mut s = input.trim();
    if let Some(idx) = s.find(" (") {
        s = s[..idx].trim_end();
    }
    if s.is_empty() {
        return Err(err());
    }

    if s.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return s
            .parse::<f64>()
            .ok()
            .and_then(from_epoch)
            .ok_or_else(err);
    }

    let mut s = s.replacen(' ', "T", 1);
    if let Some(idx) = s.find(" UTC") {
        let zone = s[idx + 4..].trim().to_string();
        s.truncate(idx);
        s.push_str(if zone.is_empty() { "Z" } else { &zone });
    } else if s.ends_with("UTC") {
        s.truncate(s.len() - 3);
        s.push('Z');
    }

    if has_zone(&s) {
        DateTime::parse_from_rfc3339(&s)
            .or_else(|_| DateTime::<FixedOffset>::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f%z"))
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| err())
    } else {
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(&s, fmt).ok())
            .map(|naive| Utc.from_utc_datetime(&naive))
            .ok_or_else(err)
    }
}

/// Accepts a JSON string or an epoch number.
pub fn parse_instant_value(value: &Value) -> Result<DateTime<Utc>, TimestampError> {
    match value {
        Value::String(s) => parse_instant(s),
        Value::Number(n) => n.as_f64().and_then(from_epoch).ok_or_else(|| TimestampError {
            input: n.to_string(),
        }),
        other => Err(TimestampError {
            input: other.to_string(),
        }),
    }
}

/// True when the time portion carries `Z` or an explicit numeric offset.
fn has_zone(s: &str) -> bool {
    if s.ends_with('Z') || s.ends_with('z') {
        return true;
    }
    match s.find('T') {
        Some(t) => s[t..].contains('+') || s[t..].contains('-'),
        None => false,
    }
}

fn from_epoch(raw: f64) -> Option<DateTime<Utc>> {
    if !raw.is_finite() || raw < 0.0 {
        return None;
    }
    let millis = if raw > EPOCH_MILLIS_THRESHOLD { raw } else { raw * 1000.0 };
    Utc.timestamp_millis_opt(millis as i64).single()
}

/// `3d 04h 05m 06s`
pub fn format_remaining(total_secs: i64) -> String {
    let total = total_secs.max(0);
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    format!("{}d {:02}h {:02}m {:02}s", days, hours, minutes, seconds)
}

/// Long-form duration for accumulated play time, e.g. `2 years, 1 month, 3 hours`.
pub fn humanize_duration(total_secs: u64) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 3_600;
    const DAY: u64 = 86_400;
    const WEEK: u64 = 604_800;
    // 30.44 and 365.25 days
    const MONTH: u64 = 2_630_016;
    const YEAR: u64 = 31_557_600;

    if total_secs == 0 {
        return "0 seconds".to_string();
    }

    let units = [
        ("year", YEAR),
        ("month", MONTH),
        ("week", WEEK),
        ("day", DAY),
        ("hour", HOUR),
        ("minute", MINUTE),
        ("second", 1),
    ];
    let mut rest = total_secs;
    let mut parts = Vec::new();
    for (name, size) in units {
        let count = rest / size;
        rest %= size;
        if count > 0 {
            parts.push(format!("{} {}{}", count, name, if count == 1 { "" } else { "s" }));
        }
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_bare_timestamp_is_utc() {
        assert_eq!(parse_instant("2030-01-01 00:00:00").unwrap(), utc(2030, 1, 1, 0, 0, 0));
        assert_eq!(parse_instant("2030-01-01T00:00:00").unwrap(), utc(2030, 1, 1, 0, 0, 0));
        assert_eq!(parse_instant("2030-01-01T00:00").unwrap(), utc(2030, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_explicit_zones_are_respected() {
        assert_eq!(parse_instant("2030-01-01T00:00:00Z").unwrap(), utc(2030, 1, 1, 0, 0, 0));
        assert_eq!(parse_instant("2030-01-01T02:00:00+02:00").unwrap(), utc(2030, 1, 1, 0, 0, 0));
        assert_eq!(parse_instant("2029-12-31T19:00:00-05:00").unwrap(), utc(2030, 1, 1, 0, 0, 0));
        assert_eq!(parse_instant("2030-01-01T00:00:00.250Z").unwrap().timestamp_millis() % 1000, 250);
    }

    #[test]
    fn test_backend_display_forms() {
        let want = utc(2025, 8, 19, 12, 0, 0);
        assert_eq!(parse_instant("2025-08-19 12:00:00 UTC+0000").unwrap(), want);
        assert_eq!(parse_instant("2025-08-19 12:00:00 UTC").unwrap(), want);
        assert_eq!(
            parse_instant("2025-08-19 12:00:00 UTC (Time Remaining: 2 days, 3 hours)").unwrap(),
            want
        );
    }

    #[test]
    fn test_unparsable_inputs() {
        assert!(parse_instant("not-a-date").is_err());
        assert!(parse_instant("").is_err());
        assert!(parse_instant("2030-13-45 99:00:00").is_err());
        assert!(parse_instant_value(&json!(null)).is_err());
        assert!(parse_instant_value(&json!(-5)).is_err());
    }

    #[test]
    fn test_epoch_values() {
        assert_eq!(parse_instant_value(&json!(1893456000)).unwrap(), utc(2030, 1, 1, 0, 0, 0));
        assert_eq!(parse_instant_value(&json!(1893456000000u64)).unwrap(), utc(2030, 1, 1, 0, 0, 0));
        assert_eq!(parse_instant("1893456000").unwrap(), utc(2030, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(0), "0d 00h 00m 00s");
        assert_eq!(format_remaining(93_784), "1d 02h 03m 04s");
        assert_eq!(format_remaining(-10), "0d 00h 00m 00s");
    }

    #[test]
    fn test_humanize_duration() {
        assert_eq!(humanize_duration(0), "0 seconds");
        assert_eq!(humanize_duration(61), "1 minute, 1 second");
        assert_eq!(humanize_duration(2 * 86_400 + 3_600), "2 days, 1 hour");
    }
}
