//! Timestamp encoding for TEXT columns.
//!
//! Timestamps are written as fixed-width RFC 3339 UTC strings with
//! microsecond precision, so string comparison in SQL matches chronological
//! order.

use chrono::{DateTime, NaiveDate, NaiveTime, SubsecRound, Utc};

/// Current time, truncated to the precision that is stored.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Encode a timestamp for storage or comparison.
pub fn encode(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Midnight UTC at the start of a calendar date.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Parse an ISO 8601 date (`2025-07-01`) or RFC 3339 timestamp.
///
/// A bare date is interpreted as midnight UTC.
pub fn parse(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(start_of_day)
}
