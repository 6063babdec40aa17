//! Bucketed samples served by the time-series service.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// How insulin was being delivered over a period.
///
/// Loop-mode timelines only ever carry `Automated` or `Scheduled`; raw basal
/// samples may also report `Temp` or `Suspend` before reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
    /// Closed-loop delivery driven by the device algorithm.
    Automated,
    /// Manual / open-loop delivery following the programmed schedule.
    Scheduled,
    /// Temporary basal rate.
    Temp,
    /// Delivery suspended.
    Suspend,
}

impl DeliveryType {
    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Automated => "automated",
            Self::Scheduled => "scheduled",
            Self::Temp => "temp",
            Self::Suspend => "suspend",
        }
    }
}

/// One basal delivery segment.
///
/// Serializes to the output record shape
/// `{id, time, timezone, timezoneOffset, deliveryType, duration, rate}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasalSample {
    /// Source identifier; suffixed with `-<n>` during reconciliation.
    #[serde(rename = "id")]
    pub guid: String,
    /// Segment start.
    #[serde(rename = "time", with = "crate::time_format")]
    pub timestamp: DateTime<Utc>,
    /// IANA timezone name declared by the device.
    pub timezone: String,
    /// Offset of `timezone` at `timestamp`, in minutes. Derived, not authoritative.
    #[serde(rename = "timezoneOffset")]
    pub timezone_offset_minutes: i32,
    /// Delivery mode.
    pub delivery_type: DeliveryType,
    /// Segment length in milliseconds (>= 0).
    #[serde(rename = "duration")]
    pub duration_millis: i64,
    /// Units per hour.
    pub rate: f64,
}

impl BasalSample {
    /// Exclusive end of the segment, or `None` when it is not representable.
    ///
    /// Negative durations count as zero.
    #[must_use]
    pub fn checked_end(&self) -> Option<DateTime<Utc>> {
        TimeDelta::try_milliseconds(self.duration_millis.max(0))
            .and_then(|d| self.timestamp.checked_add_signed(d))
    }

    /// Exclusive end of the segment, saturating at the latest instant.
    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        self.checked_end().unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// One continuous glucose reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CbgSample {
    /// Source identifier.
    #[serde(rename = "id")]
    pub guid: String,
    /// Reading instant.
    #[serde(rename = "time", with = "crate::time_format")]
    pub timestamp: DateTime<Utc>,
    /// IANA timezone name declared by the device.
    pub timezone: String,
    /// Offset of `timezone` at `timestamp`, in minutes.
    #[serde(rename = "timezoneOffset")]
    pub timezone_offset_minutes: i32,
    /// Measurement units, e.g. `mmol/L`.
    pub units: String,
    /// Glucose value in `units`.
    pub value: f64,
}

/// One calendar day of basal samples for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasalBucket {
    /// Bucket identifier.
    pub id: String,
    /// Calendar day covered by the bucket.
    pub day: NaiveDate,
    /// Owner of the samples.
    pub user_id: String,
    /// When the bucket was first written.
    #[serde(with = "crate::time_format")]
    pub creation_timestamp: DateTime<Utc>,
    /// Samples ordered by timestamp.
    pub samples: Vec<BasalSample>,
}

/// One calendar day of CBG samples for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CbgBucket {
    /// Bucket identifier.
    pub id: String,
    /// Calendar day covered by the bucket.
    pub day: NaiveDate,
    /// Owner of the samples.
    pub user_id: String,
    /// When the bucket was first written.
    #[serde(with = "crate::time_format")]
    pub creation_timestamp: DateTime<Utc>,
    /// Samples ordered by timestamp.
    pub samples: Vec<CbgSample>,
}
