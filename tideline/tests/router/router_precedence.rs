use tideline::{CancelToken, DataRequest, Include, Role, Tideline, TidelineError};

use crate::helpers::{MockBackend, day, ms};

fn origin_of(e: &TidelineError) -> &str {
    match e {
        TidelineError::Source { origin, .. } => origin,
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn slow_store_failure_beats_fast_cbg_failure() {
    let store = MockBackend::builder()
        .name("store")
        .delay(Role::DeviceData, ms(80))
        .device_data(|_| Err(TidelineError::source("store", "down")))
        .build();
    let buckets = MockBackend::builder()
        .name("buckets")
        .cbg(|| Err(TidelineError::source("cbg", "down")))
        .build();

    let t = Tideline::builder()
        .with_backend(store)
        .with_backend(buckets)
        .build()
        .unwrap();
    let req = DataRequest::new("user-1", "trace-1", day()).include(Include::CBG_BUCKETS);
    let err = t.aggregate(&req, &CancelToken::never()).await.unwrap_err();
    assert_eq!(origin_of(&err), "store");
}

#[tokio::test]
async fn cbg_failure_beats_slow_basal_failure() {
    let store = MockBackend::builder()
        .name("store")
        .returns_device_data(vec![])
        .build();
    let buckets = MockBackend::builder()
        .name("buckets")
        .delay(Role::CbgBuckets, ms(40))
        .cbg(|| Err(TidelineError::source("cbg", "down")))
        .basal(|| Err(TidelineError::source("basal", "down")))
        .loop_mode(|| Ok(vec![]))
        .build();

    let t = Tideline::builder()
        .with_backend(store)
        .with_backend(buckets)
        .build()
        .unwrap();
    let req = DataRequest::new("user-1", "trace-1", day())
        .include(Include::CBG_BUCKETS | Include::BASAL_BUCKETS);
    let err = t.aggregate(&req, &CancelToken::never()).await.unwrap_err();
    assert_eq!(origin_of(&err), "cbg");
}

#[tokio::test]
async fn basal_failure_beats_loop_mode_failure() {
    let store = MockBackend::builder().returns_device_data(vec![]).build();
    let buckets = MockBackend::builder()
        .name("buckets")
        .delay(Role::BasalBuckets, ms(30))
        .basal(|| Err(TidelineError::source("basal", "down")))
        .loop_mode(|| Err(TidelineError::source("loop-mode", "down")))
        .build();

    let t = Tideline::builder()
        .with_backend(store)
        .with_backend(buckets)
        .build()
        .unwrap();
    let req = DataRequest::new("user-1", "trace-1", day()).include(Include::BASAL_BUCKETS);
    let err = t.aggregate(&req, &CancelToken::never()).await.unwrap_err();
    assert_eq!(origin_of(&err), "basal");
}

#[tokio::test]
async fn loop_mode_failure_fails_the_basal_source() {
    let store = MockBackend::builder().returns_device_data(vec![]).build();
    let buckets = MockBackend::builder()
        .basal(|| Ok(vec![]))
        .loop_mode(|| Err(TidelineError::source("loop-mode", "down")))
        .build();

    let t = Tideline::builder()
        .with_backend(store)
        .with_backend(buckets)
        .build()
        .unwrap();
    let req = DataRequest::new("user-1", "trace-1", day()).include(Include::BASAL_BUCKETS);
    let err = t.aggregate(&req, &CancelToken::never()).await.unwrap_err();
    assert_eq!(origin_of(&err), "loop-mode");
}

#[tokio::test]
async fn every_task_is_awaited_before_reporting() {
    let store = MockBackend::builder()
        .name("store")
        .device_data(|_| Err(TidelineError::source("store", "down")))
        .build();
    let buckets = MockBackend::builder()
        .delay(Role::CbgBuckets, ms(120))
        .cbg(|| Ok(vec![]))
        .build();

    let t = Tideline::builder()
        .with_backend(store)
        .with_backend(buckets)
        .build()
        .unwrap();
    let req = DataRequest::new("user-1", "trace-1", day()).include(Include::CBG_BUCKETS);
    let started = std::time::Instant::now();
    let err = t.aggregate(&req, &CancelToken::never()).await.unwrap_err();
    assert_eq!(origin_of(&err), "store");
    assert!(started.elapsed() >= ms(120));
}

#[tokio::test]
async fn untagged_errors_carry_the_backend_name() {
    let store = MockBackend::builder()
        .name("legacy-store")
        .device_data(|_| Err(TidelineError::Data("corrupt cursor".into())))
        .build();
    let t = Tideline::builder().with_backend(store).build().unwrap();
    let req = DataRequest::new("user-1", "trace-1", day());
    let err = t.aggregate(&req, &CancelToken::never()).await.unwrap_err();
    assert_eq!(origin_of(&err), "legacy-store");
}
