use tideline::{CancelSource, CancelToken, DataRequest, Include, Role, Tideline, TidelineError};

use crate::helpers::{MockBackend, day, ms};

#[tokio::test]
async fn caller_cancellation_stops_in_flight_sources() {
    let store = MockBackend::builder()
        .name("store")
        .hang(Role::DeviceData)
        .returns_device_data(vec![])
        .build();
    let t = Tideline::builder().with_backend(store).build().unwrap();

    let source = CancelSource::new();
    let token = source.token();
    let canceller = tokio::spawn(async move {
        tokio::time::sleep(ms(30)).await;
        source.cancel();
    });

    let req = DataRequest::new("user-1", "trace-1", day());
    let err = tokio::time::timeout(ms(2_000), t.aggregate(&req, &token))
        .await
        .expect("aggregate returns once cancelled")
        .unwrap_err();
    canceller.await.unwrap();
    assert!(err.is_cancellation(), "unexpected: {err:?}");
    assert_eq!(err, TidelineError::cancelled("store"));
}

#[tokio::test]
async fn already_cancelled_token_fails_fast() {
    let store = MockBackend::builder()
        .hang(Role::DeviceData)
        .returns_device_data(vec![])
        .build();
    let t = Tideline::builder().with_backend(store).build().unwrap();

    let source = CancelSource::new();
    source.cancel();
    let req = DataRequest::new("user-1", "trace-1", day());
    let err = t.aggregate(&req, &source.token()).await.unwrap_err();
    assert!(err.is_cancellation());
}

#[tokio::test]
async fn per_source_timeout_is_reported_with_role() {
    let store = MockBackend::builder().returns_device_data(vec![]).build();
    let buckets = MockBackend::builder()
        .name("buckets")
        .hang(Role::CbgBuckets)
        .cbg(|| Ok(vec![]))
        .build();
    let t = Tideline::builder()
        .with_backend(store)
        .with_backend(buckets)
        .source_timeout(ms(40))
        .build()
        .unwrap();

    let req = DataRequest::new("user-1", "trace-1", day()).include(Include::CBG_BUCKETS);
    let err = t.aggregate(&req, &CancelToken::never()).await.unwrap_err();
    assert_eq!(err, TidelineError::source_timeout("buckets", "cbg-buckets"));
}

#[tokio::test]
async fn request_deadline_covers_the_whole_aggregation() {
    let store = MockBackend::builder()
        .hang(Role::DeviceData)
        .returns_device_data(vec![])
        .build();
    let t = Tideline::builder()
        .with_backend(store)
        .request_timeout(ms(50))
        .build()
        .unwrap();

    let req = DataRequest::new("user-1", "trace-1", day());
    let err = t.aggregate(&req, &CancelToken::never()).await.unwrap_err();
    assert!(matches!(err, TidelineError::RequestTimeout { .. }));
}

#[tokio::test]
async fn request_deadline_covers_the_settings_phase() {
    let store = MockBackend::builder()
        .returns_device_data(vec![])
        .hang(Role::PumpSettings)
        .pump_settings(|| Ok(None))
        .build();
    let t = Tideline::builder()
        .with_backend(store.clone())
        .request_timeout(ms(50))
        .build()
        .unwrap();

    let req = DataRequest::new("user-1", "trace-1", day()).include(Include::PUMP_SETTINGS);
    let err = t.aggregate(&req, &CancelToken::never()).await.unwrap_err();
    assert!(matches!(err, TidelineError::RequestTimeout { .. }));
    // the concurrent phase never started
    assert!(store.calls_for(Role::DeviceData).is_empty());
}
