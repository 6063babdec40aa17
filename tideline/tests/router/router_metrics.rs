use std::sync::Arc;

use tideline::{CancelToken, DataRequest, Include, Outcome, Role, Tideline, TidelineError};
use tideline_mock::RecordingMetrics;

use crate::helpers::{MockBackend, day, doc, ms};

#[tokio::test]
async fn source_outcomes_and_response_size_are_recorded() {
    let metrics = Arc::new(RecordingMetrics::new());
    let store = MockBackend::builder()
        .returns_device_data(vec![doc("a", "smbg", None)])
        .cbg(|| Ok(vec![]))
        .build();
    let t = Tideline::builder()
        .with_backend(store)
        .metrics(metrics.clone())
        .build()
        .unwrap();
    let req = DataRequest::new("user-1", "trace-1", day()).include(Include::CBG_BUCKETS);
    let report = t.aggregate(&req, &CancelToken::never()).await.unwrap();

    assert_eq!(metrics.outcome_of(Role::DeviceData), Some(Outcome::Ok));
    assert_eq!(metrics.outcome_of(Role::CbgBuckets), Some(Outcome::Ok));
    let responses = metrics.responses();
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].bytes, report.body.len());
    assert_eq!(responses[0].records, 1);
}

#[tokio::test]
async fn failures_and_timeouts_are_classified() {
    let metrics = Arc::new(RecordingMetrics::new());
    let store = MockBackend::builder()
        .device_data(|_| Err(TidelineError::source("store", "down")))
        .hang(Role::CbgBuckets)
        .cbg(|| Ok(vec![]))
        .build();
    let t = Tideline::builder()
        .with_backend(store)
        .source_timeout(ms(30))
        .metrics(metrics.clone())
        .build()
        .unwrap();
    let req = DataRequest::new("user-1", "trace-1", day()).include(Include::CBG_BUCKETS);
    t.aggregate(&req, &CancelToken::never()).await.unwrap_err();

    assert_eq!(metrics.outcome_of(Role::DeviceData), Some(Outcome::Error));
    assert_eq!(metrics.outcome_of(Role::CbgBuckets), Some(Outcome::Timeout));
    assert!(metrics.responses().is_empty());
}
