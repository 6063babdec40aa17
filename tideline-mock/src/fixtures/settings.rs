use serde_json::json;
use tideline_core::{BasalSecurityProfile, ParameterChange, ParameterHistory, PumpSettings};

use super::at;

/// Latest pump settings document.
#[must_use]
pub fn pump_settings() -> PumpSettings {
    PumpSettings(json!({
        "id": "ps-1",
        "type": "pumpSettings",
        "time": "2021-01-12T06:00:00.000Z",
        "timezone": super::ZONE,
        "payload": {
            "device": {"manufacturer": "Diabeloop", "name": "DBLG1"},
            "parameters": [{"name": "WEIGHT", "value": "72.0", "unit": "kg", "level": 1}]
        }
    }))
}

fn change(name: &str, value: &str, unit: Option<&str>, level: u8, day: u32) -> ParameterChange {
    ParameterChange {
        level,
        name: name.to_string(),
        value: value.to_string(),
        unit: unit.map(str::to_string),
        effective_date: at(day, 8, 0),
    }
}

/// Three changes over two effective dates.
#[must_use]
pub fn parameter_history() -> ParameterHistory {
    ParameterHistory {
        parameters: vec![
            change("WEIGHT", "72.0", Some("kg"), 1, 11),
            change("PATIENT_GLY_HYPO_LIMIT", "3.9", Some("mmol/L"), 1, 10),
            change("MEAL_RATIO_LUNCH_FACTOR", "100", Some("%"), 2, 11),
        ],
    }
}

/// Latest basal security profile.
#[must_use]
pub fn security_profile() -> BasalSecurityProfile {
    BasalSecurityProfile(json!({
        "type": "basalSecurity",
        "time": "2021-01-10T08:00:00.000Z",
        "basalSchedule": [{"start": 0, "rate": 0.8}, {"start": 480, "rate": 1.0}]
    }))
}
