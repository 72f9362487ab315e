// ABOUTME: Duration parsing for upstream media lengths.
// ABOUTME: Supports integer seconds, HH:MM:SS, MM:SS, Go-style strings, and numeric-or-text JSON fields.

use serde::Deserialize;

/// Parses a duration string into seconds.
/// Supports:
/// - Plain integers (seconds)
/// - HH:MM:SS format
/// - MM:SS format
/// - Go-style durations like "1h30m", "45m", "2h"
/// Returns None if parsing fails or value doesn't fit in u32.
pub fn parse_duration_seconds(s: &str) -> Option<u32> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(secs) = s.parse::<u64>() {
        return u32::try_from(secs).ok();
    }

    if s.contains(':') {
        return parse_colon_format(s);
    }

    if let Ok(duration) = parse_duration::parse(s) {
        return u32::try_from(duration.as_secs()).ok();
    }

    None
}

fn parse_colon_format(s: &str) -> Option<u32> {
    let parts = s
        .split(':')
        .map(|p| p.parse::<u64>().ok())
        .collect::<Option<Vec<u64>>>()?;

    let (hours, mins, secs) = match parts.as_slice() {
        [mins, secs] => (0, *mins, *secs),
        [hours, mins, secs] => (*hours, *mins, *secs),
        _ => return None,
    };
    let total = hours
        .checked_mul(3600)?
        .checked_add(mins.checked_mul(60)?)?
        .checked_add(secs)?;
    u32::try_from(total).ok()
}

/// A duration field that upstream sends either as a number or as a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(f64),
    Text(String),
}

impl DurationValue {
    /// Whole seconds, or None for negative or unparseable values.
    pub fn seconds(&self) -> Option<u32> {
        match self {
            DurationValue::Seconds(n) if *n >= 0.0 && *n <= u32::MAX as f64 => Some(n.round() as u32),
            DurationValue::Seconds(_) => None,
            DurationValue::Text(s) => parse_duration_seconds(s),
        }
    }
}
