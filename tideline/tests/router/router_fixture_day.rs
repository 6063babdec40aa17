use std::sync::Arc;

use tideline::{Backend, CancelToken, DataRequest, Include, Tideline, TidelineError};
use tideline_mock::{MockBackend, fixtures};

fn tideline() -> Tideline {
    Tideline::builder()
        .with_backend(Arc::new(MockBackend::new()) as Arc<dyn Backend>)
        .source_timeout(std::time::Duration::from_millis(100))
        .build()
        .unwrap()
}

#[tokio::test]
async fn full_fixture_day_aggregates_every_source() {
    let req = DataRequest::new("user-1", "trace-1", fixtures::day_window())
        .include(Include::all())
        .session_token("token");
    let report = tideline()
        .aggregate(&req, &CancelToken::never())
        .await
        .unwrap();

    // one malformed legacy row is skipped
    assert_eq!(report.skipped, 1);
    let kinds: Vec<String> = crate::helpers::kinds_and_ids(&report)
        .into_iter()
        .map(|(k, _)| k)
        .collect();
    assert_eq!(kinds.first().map(String::as_str), Some("pumpSettings"));
    assert_eq!(kinds.last().map(String::as_str), Some("upload"));
    // bucketed types never come from the store
    let out = crate::helpers::body(&report);
    assert!(
        out.iter()
            .filter(|v| v["type"] == "cbg" || v["type"] == "basal")
            .all(|v| !v["id"].as_str().unwrap().contains("legacy"))
    );
    assert_eq!(out.iter().filter(|v| v["type"] == "cbg").count(), 6);
    assert_eq!(out.iter().filter(|v| v["type"] == "basal").count(), 6);
    assert_eq!(out.iter().filter(|v| v["type"] == "upload").count(), 1);
}

#[tokio::test]
async fn failing_user_surfaces_the_store_error() {
    let req = DataRequest::new("FAIL", "trace-1", fixtures::day_window());
    let err = tideline()
        .aggregate(&req, &CancelToken::never())
        .await
        .unwrap_err();
    assert!(matches!(err, TidelineError::Source { .. }));
}

#[tokio::test]
async fn slow_user_hits_the_source_timeout() {
    let req = DataRequest::new("TIMEOUT", "trace-1", fixtures::day_window());
    let err = tideline()
        .aggregate(&req, &CancelToken::never())
        .await
        .unwrap_err();
    assert!(matches!(err, TidelineError::SourceTimeout { .. }));
}
