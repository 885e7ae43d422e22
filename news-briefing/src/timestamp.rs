//! Normalization of feed timestamps into UTC instants.
//!
//! Feeds in the wild write dates as RFC 822 with numeric offsets, RFC 822 with zone
//! abbreviations, RFC 822 with no zone at all, or ISO 8601. Some libraries hand over the
//! calendar fields already split. [`normalize_published`] accepts either and never fails:
//! anything unreadable is treated as published at `now`.

use crate::types::CalendarTime;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimestampError {
    #[error("empty timestamp")]
    Empty,

    #[error("unrecognized timestamp: {0:?}")]
    Unrecognized(String),
}

const RFC822_WITH_OFFSET: [&str; 2] = ["%d %b %Y %H:%M:%S %z", "%d %b %Y %H:%M %z"];
const RFC822_NAIVE: [&str; 2] = ["%d %b %Y %H:%M:%S", "%d %b %Y %H:%M"];
const ISO8601_NAIVE: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Offsets for the zone abbreviations RFC 822 allows plus the ones Korean feeds emit.
fn zone_offset(abbreviation: &str) -> Option<FixedOffset> {
    let hours = match abbreviation.to_ascii_uppercase().as_str() {
        "UT" | "UTC" | "GMT" | "Z" => 0,
        "KST" | "JST" => 9,
        "EST" => -5,
        "EDT" => -4,
        "CST" => -6,
        "CDT" => -5,
        "MST" => -7,
        "MDT" => -6,
        "PST" => -8,
        "PDT" => -7,
        "CET" | "BST" => 1,
        "CEST" => 2,
        _ => return None,
    };
    FixedOffset::east_opt(hours * 3600)
}

/// Drops a leading "Mon," so a wrong weekday in the feed cannot fail an otherwise valid date.
fn strip_weekday(raw: &str) -> &str {
    match raw.split_once(',') {
        Some((day, rest)) if !day.is_empty() && day.trim().chars().all(|c| c.is_ascii_alphabetic()) => {
            rest.trim_start()
        }
        _ => raw,
    }
}

fn parse_rfc822_with_offset(body: &str) -> Option<DateTime<Utc>> {
    RFC822_WITH_OFFSET
        .iter()
        .find_map(|format| DateTime::parse_from_str(body, format).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_rfc822_with_abbreviation(body: &str) -> Option<DateTime<Utc>> {
    let (rest, zone) = body.rsplit_once(' ')?;
    let offset = zone_offset(zone)?;
    let naive = RFC822_NAIVE
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(rest.trim_end(), format).ok())?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_rfc822_naive(body: &str) -> Option<DateTime<Utc>> {
    RFC822_NAIVE
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(body, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn parse_iso8601(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    let without_z = raw.strip_suffix('Z').unwrap_or(raw);
    if let Some(naive) = ISO8601_NAIVE
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(without_z, format).ok())
    {
        return Some(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Parses one timestamp string, trying each known format in turn.
///
/// Values without zone information are read as UTC; values with a zone are converted.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, TimestampError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(TimestampError::Empty);
    }

    let body = strip_weekday(raw);
    parse_rfc822_with_offset(body)
        .or_else(|| parse_rfc822_with_abbreviation(body))
        .or_else(|| parse_rfc822_naive(body))
        .or_else(|| parse_iso8601(raw))
        .ok_or_else(|| TimestampError::Unrecognized(raw.to_string()))
}

/// Resolves an entry's publication instant.
///
/// Structured calendar fields win when they form a real date. Otherwise the string is
/// parsed. When neither yields an instant the entry is dated `now`.
pub fn normalize_published(
    parsed: Option<&CalendarTime>,
    raw: Option<&str>,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    if let Some(instant) = parsed.and_then(CalendarTime::to_utc) {
        return instant;
    }

    match raw.map(parse_timestamp) {
        Some(Ok(instant)) => instant,
        Some(Err(e)) => {
            debug!(error = %e, "Falling back to current time for unparseable date");
            now
        }
        None => {
            debug!("Entry has no publication date, using current time");
            now
        }
    }
}
