use serde_json::json;
use tideline::{CancelToken, DataRequest, Include, PumpSettings, Tideline};

use crate::helpers::{
    MockBackend, automated, basal_bucket, cbg_bucket, day, doc, dt, kinds_and_ids, ms,
};

#[tokio::test]
async fn records_follow_the_fixed_source_order() {
    // every source answers at a different speed; output order must not care
    let store = MockBackend::builder()
        .name("store")
        .delay(tideline::Role::DeviceData, ms(60))
        .returns_device_data(vec![
            doc("smbg-1", "smbg", Some("up-1")),
            doc("bolus-1", "bolus", None),
        ])
        .pump_settings(|| Ok(Some(PumpSettings(json!({"id": "ps-1", "type": "pumpSettings"})))))
        .uploads(|ids| {
            Ok(ids
                .iter()
                .map(|id| tideline::RawRecord::from_value(&json!({"id": id, "type": "upload"})))
                .collect())
        })
        .build();
    let buckets = MockBackend::builder()
        .name("buckets")
        .cbg(|| {
            Ok(vec![cbg_bucket(&[
                ("cbg-2", dt(2021, 1, 12, 6, 5, 0), 5.5),
                ("cbg-1", dt(2021, 1, 12, 6, 0, 0), 5.0),
            ])])
        })
        .delay(tideline::Role::BasalBuckets, ms(20))
        .basal(|| Ok(vec![basal_bucket(&[("b", dt(2021, 1, 12, 1, 0, 0), 30, 0.7)])]))
        .loop_mode(|| Ok(vec![automated(dt(2021, 1, 12, 0, 0, 0), dt(2021, 1, 12, 2, 0, 0))]))
        .build();

    let t = Tideline::builder()
        .with_backend(store)
        .with_backend(buckets)
        .build()
        .unwrap();
    let req = DataRequest::new("user-1", "trace-1", day()).include(Include::all());
    let report = t.aggregate(&req, &CancelToken::never()).await.unwrap();

    let got = kinds_and_ids(&report);
    let expected: Vec<(String, String)> = [
        ("pumpSettings", "ps-1"),
        ("smbg", "smbg-1"),
        ("bolus", "bolus-1"),
        ("cbg", "cbg-1"),
        ("cbg", "cbg-2"),
        ("basal", "b-0"),
        ("upload", "up-1"),
    ]
    .iter()
    .map(|(k, i)| ((*k).to_string(), (*i).to_string()))
    .collect();
    assert_eq!(got, expected);
    assert_eq!(report.written, expected.len());
    assert_eq!(report.skipped, 0);
}

#[tokio::test]
async fn empty_sources_produce_an_empty_array() {
    let store = MockBackend::builder().returns_device_data(vec![]).build();
    let t = Tideline::builder().with_backend(store).build().unwrap();
    let req = DataRequest::new("user-1", "trace-1", day());
    let report = t.aggregate(&req, &CancelToken::never()).await.unwrap();
    assert_eq!(report.body, b"[]");
    assert_eq!(report.written, 0);
}

#[tokio::test]
async fn records_are_separated_by_comma_newline() {
    let store = MockBackend::builder()
        .returns_device_data(vec![doc("a", "smbg", None), doc("b", "smbg", None)])
        .build();
    let t = Tideline::builder().with_backend(store).build().unwrap();
    let req = DataRequest::new("user-1", "trace-1", day());
    let report = t.aggregate(&req, &CancelToken::never()).await.unwrap();
    let text = String::from_utf8(report.body).unwrap();
    assert!(text.starts_with("[{"));
    assert!(text.ends_with("}]"));
    assert_eq!(text.matches("},\n{").count(), 1);
}
