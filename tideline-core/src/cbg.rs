//! Flattening of bucketed CBG readings.

use crate::timezone;
use tideline_types::{CbgBucket, CbgSample};

/// Flatten buckets into one timestamp-ordered list of readings.
///
/// Offsets are recomputed from each reading's zone name at its own instant;
/// unknown zones fall back to UTC.
#[must_use]
pub fn flatten(mut buckets: Vec<CbgBucket>) -> Vec<CbgSample> {
    buckets.sort_by_key(|b| b.day);
    let mut out: Vec<CbgSample> = buckets.into_iter().flat_map(|b| b.samples).collect();
    out.sort_by_key(|s| s.timestamp);
    for s in &mut out {
        let (zone, offset) = timezone::resolve(&s.timezone, s.timestamp);
        s.timezone = zone;
        s.timezone_offset_minutes = offset;
    }
    out
}
