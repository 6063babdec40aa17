//! Timezone offset resolution for device-declared IANA zone names.

use chrono::{DateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

/// Zone name written when a declared zone cannot be resolved.
pub const UTC_NAME: &str = "UTC";

/// UTC offset of `zone` at `at`, in minutes, or `None` when `zone` is not a
/// known IANA name.
#[must_use]
pub fn offset_minutes(zone: &str, at: DateTime<Utc>) -> Option<i32> {
    let tz: Tz = zone.parse().ok()?;
    let local = tz.from_utc_datetime(&at.naive_utc());
    Some(local.offset().fix().local_minus_utc() / 60)
}

/// Resolve `zone` at `at` to a `(zone, offset_minutes)` pair.
///
/// Unknown or empty zone names fall back to `("UTC", 0)`.
#[must_use]
pub fn resolve(zone: &str, at: DateTime<Utc>) -> (String, i32) {
    if let Some(offset) = offset_minutes(zone, at) {
        return (zone.to_string(), offset);
    }
    #[cfg(feature = "tracing")]
    tracing::debug!(zone = %zone, "unknown timezone, falling back to UTC");
    (UTC_NAME.to_string(), 0)
}
