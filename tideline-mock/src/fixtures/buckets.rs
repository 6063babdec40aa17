use chrono::{NaiveDate, TimeDelta};
use tideline_core::{BasalBucket, BasalSample, CbgBucket, CbgSample, DeliveryType};

use super::{ZONE, at};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 1, d).unwrap_or_default()
}

fn basal(guid: &str, h: u32, m: u32, minutes: i64, rate: f64) -> BasalSample {
    BasalSample {
        guid: guid.to_string(),
        timestamp: at(12, h, m),
        timezone: ZONE.to_string(),
        timezone_offset_minutes: 0,
        delivery_type: DeliveryType::Temp,
        duration_millis: minutes * 60_000,
        rate,
    }
}

/// Three ten-minute basal samples on the 12th: 00:00, 00:10 and 00:30.
#[must_use]
pub fn basal_buckets() -> Vec<BasalBucket> {
    vec![BasalBucket {
        id: "basal-2021-01-12".to_string(),
        day: day(12),
        user_id: "user-1".to_string(),
        creation_timestamp: at(12, 0, 0),
        samples: vec![
            basal("basal-a", 0, 0, 10, 1.0),
            basal("basal-b", 0, 10, 10, 0.5),
            basal("basal-c", 0, 30, 10, 0.1),
        ],
    }]
}

/// Six CBG readings every five minutes from 06:00 on the 12th.
#[must_use]
pub fn cbg_buckets() -> Vec<CbgBucket> {
    let samples = (0..6)
        .map(|i| CbgSample {
            guid: format!("cbg-{i}"),
            timestamp: at(12, 6, 0) + TimeDelta::minutes(5 * i),
            timezone: ZONE.to_string(),
            timezone_offset_minutes: 0,
            units: "mmol/L".to_string(),
            value: 5.0 + 0.2 * f64::from(u8::try_from(i).unwrap_or(0)),
        })
        .collect();
    vec![CbgBucket {
        id: "cbg-2021-01-12".to_string(),
        day: day(12),
        user_id: "user-1".to_string(),
        creation_timestamp: at(12, 0, 0),
        samples,
    }]
}
