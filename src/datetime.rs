//! Timestamp helpers.
//!
//! All timestamps are stored as UTC text in `YYYY-MM-DD HH:MM:SS` form, which
//! sorts and compares correctly as plain text in SQL.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

/// Storage format for timestamps.
pub const DB_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a UTC datetime for storage.
pub fn to_db(dt: &DateTime<Utc>) -> String {
    dt.format(DB_FORMAT).to_string()
}

/// Current time in storage format.
pub fn now_db() -> String {
    to_db(&Utc::now())
}

/// Longest age accepted by [`age_from_secs`] (about 100 years).
const MAX_AGE_SECS: u64 = 100 * 365 * 24 * 60 * 60;

/// Convert a configured number of seconds into a duration, clamped so that
/// subtracting it from the current time cannot overflow.
pub fn age_from_secs(secs: u64) -> Duration {
    Duration::seconds(secs.min(MAX_AGE_SECS) as i64)
}

/// Storage-format timestamp for `now - age`.
pub fn cutoff_db(now: &DateTime<Utc>, age: Duration) -> String {
    to_db(&(*now - age))
}

/// Parse a stored timestamp back into a UTC datetime.
pub fn parse_db(datetime_str: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(datetime_str, DB_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Convert a stored timestamp to RFC3339 for API responses.
///
/// The database stores times in UTC, so this appends 'Z'.
pub fn to_rfc3339(datetime_str: &str) -> String {
    format!("{}Z", datetime_str.replace(' ', "T"))
}
