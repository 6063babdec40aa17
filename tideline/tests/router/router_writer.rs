use tideline::{CancelToken, DataRequest, RawRecord, Tideline};

use crate::helpers::{MockBackend, body, day, doc};

#[tokio::test]
async fn malformed_records_are_skipped_and_counted() {
    let store = MockBackend::builder()
        .returns_device_data(vec![
            doc("a", "smbg", None),
            RawRecord::new(b"{\"id\":\"broken\",".to_vec()),
            doc("b", "smbg", None),
            RawRecord::new(b"not json".to_vec()),
        ])
        .build();
    let t = Tideline::builder().with_backend(store).build().unwrap();
    let req = DataRequest::new("user-1", "trace-1", day());
    let report = t.aggregate(&req, &CancelToken::never()).await.unwrap();

    assert_eq!(report.written, 2);
    assert_eq!(report.skipped, 2);
    assert!(report.first_error.as_deref().unwrap().contains("decode"));
    let out = body(&report);
    assert_eq!(out.len(), 2);
    assert_eq!(out[1]["id"], "b");
}

#[tokio::test]
async fn small_prealloc_cap_still_produces_the_full_body() {
    let docs: Vec<RawRecord> = (0..50)
        .map(|i| doc(&format!("d{i}"), "smbg", None))
        .collect();
    let store = MockBackend::builder().returns_device_data(docs).build();
    let t = Tideline::builder()
        .with_backend(store)
        .bytes_per_second(1000.0)
        .max_prealloc_bytes(16)
        .build()
        .unwrap();
    let req = DataRequest::new("user-1", "trace-1", day());
    let report = t.aggregate(&req, &CancelToken::never()).await.unwrap();
    assert_eq!(body(&report).len(), 50);
}
