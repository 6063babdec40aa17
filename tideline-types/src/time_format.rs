//! RFC 3339 UTC timestamps with millisecond precision.
//!
//! Use with `#[serde(with = "tideline_types::time_format")]`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Format an instant the way every output record carries it,
/// e.g. `2021-01-12T00:05:00.000Z`.
#[must_use]
pub fn format(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serialize a UTC instant as an RFC 3339 string.
///
/// # Errors
/// Propagates serializer errors.
pub fn serialize<S>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&format(ts))
}

/// Parse any RFC 3339 timestamp and normalize it to UTC.
///
/// # Errors
/// Returns a deserializer error if the string is not RFC 3339.
pub fn deserialize<'de, D>(d: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(d)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(serde::de::Error::custom)
}
