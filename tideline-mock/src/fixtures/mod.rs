//! Deterministic fixture data shared by tests and demos.
//!
//! Everything is anchored on 2021-01-12 for a device declared in
//! `Europe/Paris` (UTC+1 in January).

use chrono::{DateTime, TimeZone, Utc};
use tideline_core::Window;

pub mod buckets;
pub mod device_data;
pub mod loop_mode;
pub mod settings;

/// Zone every fixture device declares.
pub const ZONE: &str = "Europe/Paris";

/// `2021-01-<day>T<h>:<m>:00Z`.
///
/// # Panics
/// Panics on an invalid day, hour or minute.
#[must_use]
pub fn at(day: u32, h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 1, day, h, m, 0)
        .single()
        .expect("valid fixture instant")
}

/// The fixture day, `[2021-01-12, 2021-01-13)`.
#[must_use]
pub fn day_window() -> Window {
    Window {
        start: at(12, 0, 0),
        end: at(13, 0, 0),
    }
}
