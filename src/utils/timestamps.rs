use chrono::{DateTime, Timelike, Utc};
use serde::Serializer;

/// Formats a UTC timestamp the way the public API has always exposed them:
/// ISO-8601 with a `Z` suffix and microseconds only when they are non-zero.
pub fn format_api_datetime(value: &DateTime<Utc>) -> String {
    if value.nanosecond() / 1_000 == 0 {
        value.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    } else {
        value.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
    }
}

pub fn serialize_api_datetime<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_api_datetime(value))
}
