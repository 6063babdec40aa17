use serde_json::{Value, json};
use tideline_core::{RawRecord, Window};

use super::at;

fn documents() -> Vec<Value> {
    vec![
        json!({"id": "smbg-1", "type": "smbg", "time": "2021-01-12T07:30:00.000Z",
               "units": "mmol/L", "value": 6.2, "uploadId": "upload-1"}),
        json!({"id": "bolus-1", "type": "bolus", "time": "2021-01-12T07:31:00.000Z",
               "normal": 3.5, "uploadId": "upload-1"}),
        json!({"id": "food-1", "type": "food", "time": "2021-01-12T07:35:00.000Z",
               "nutrition": {"carbohydrate": {"net": 45, "units": "grams"}}}),
        json!({"id": "cbg-legacy-1", "type": "cbg", "time": "2021-01-12T08:00:00.000Z",
               "units": "mmol/L", "value": 7.1, "uploadId": "upload-2"}),
        json!({"id": "basal-legacy-1", "type": "basal", "time": "2021-01-12T08:00:00.000Z",
               "deliveryType": "scheduled", "duration": 3_600_000, "rate": 0.8,
               "uploadId": "upload-2"}),
        json!({"id": "ps-legacy-1", "type": "pumpSettings", "time": "2021-01-12T06:00:00.000Z",
               "uploadId": "upload-2"}),
    ]
}

/// A truncated document, as a corrupted store row would come back.
pub const MALFORMED: &[u8] = br#"{"id":"broken-1","type":"smbg","#;

/// Legacy-store rows inside `window` whose type is not excluded, followed by
/// one malformed row when the fixture day is requested.
#[must_use]
pub fn for_window(window: Window, excluded: &[String]) -> Vec<RawRecord> {
    if window.end <= at(12, 0, 0) || window.start >= at(13, 0, 0) {
        return Vec::new();
    }
    let mut out: Vec<RawRecord> = documents()
        .into_iter()
        .filter(|d| {
            d.get("type")
                .and_then(Value::as_str)
                .is_none_or(|t| !excluded.iter().any(|x| x == t))
        })
        .map(|d| RawRecord::from_value(&d))
        .collect();
    out.push(RawRecord::new(MALFORMED.to_vec()));
    out
}

/// Upload documents for the given ids; unknown ids are skipped.
#[must_use]
pub fn uploads(ids: &[String]) -> Vec<RawRecord> {
    ids.iter()
        .filter(|id| matches!(id.as_str(), "upload-1" | "upload-2"))
        .map(|id| {
            RawRecord::from_value(&json!({
                "id": id,
                "type": "upload",
                "uploadId": id,
                "deviceManufacturers": ["Diabeloop"],
                "timezone": super::ZONE,
            }))
        })
        .collect()
}
