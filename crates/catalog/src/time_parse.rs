// ABOUTME: Flexible timestamp parsing for upstream airtime and availability dates.
// ABOUTME: Tries RFC3339, RFC2822 and common variants, returning UTC or epoch seconds.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Parses a datetime string using the formats the broadcaster APIs and RSS feeds emit.
/// Returns UTC datetime if successful, None if no format matches.
pub fn parse_flexible_time(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    // API timestamps, with or without fractional seconds
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // RSS pubDate
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let formats_with_tz = [
        "%Y-%m-%dT%H:%M:%S%.f%z",
        "%Y-%m-%dT%H:%M:%S%z",
        "%a, %e %b %Y %H:%M:%S %z",
    ];
    for fmt in &formats_with_tz {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    // No zone given: assume UTC
    let formats_naive = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
    for fmt in &formats_naive {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }

    None
}

/// Parses a datetime string into epoch seconds.
pub fn parse_epoch_seconds(s: &str) -> Option<i64> {
    parse_flexible_time(s).map(|dt| dt.timestamp())
}
