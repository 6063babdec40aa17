use serde_json::json;
use tideline::{
    BasalSecurityProfile, CancelToken, DataRequest, Include, ParameterChange, ParameterHistory,
    PumpSettings, Role, Tideline, TidelineError,
};

use crate::helpers::{MockBackend, body, day, dt};

fn settings() -> PumpSettings {
    PumpSettings(json!({"id": "ps-1", "type": "pumpSettings", "payload": {"device": "DBLG1"}}))
}

fn change(name: &str, level: u8, day: u32) -> ParameterChange {
    ParameterChange {
        level,
        name: name.to_string(),
        value: "1".to_string(),
        unit: None,
        effective_date: dt(2021, 1, day, 8, 0, 0),
    }
}

#[tokio::test]
async fn settings_are_augmented_and_emitted_first() {
    let store = MockBackend::builder()
        .returns_device_data(vec![crate::helpers::doc("a", "smbg", None)])
        .pump_settings(|| Ok(Some(settings())))
        .parameter_history(|_| {
            Ok(Some(ParameterHistory {
                parameters: vec![change("B", 1, 11), change("A", 2, 10), change("C", 1, 11)],
            }))
        })
        .security_profile(|| Ok(Some(BasalSecurityProfile(json!({"rates": [0.8]})))))
        .build();
    let t = Tideline::builder()
        .with_backend(store.clone())
        .parameter_history_levels(&[1, 2])
        .build()
        .unwrap();
    let req = DataRequest::new("user-1", "trace-1", day()).include(Include::PUMP_SETTINGS);
    let report = t.aggregate(&req, &CancelToken::never()).await.unwrap();

    let out = body(&report);
    assert_eq!(out[0]["id"], "ps-1");
    let payload = &out[0]["payload"];
    assert_eq!(payload["device"], "DBLG1");
    assert_eq!(payload["basalsecurityprofile"], json!({"rates": [0.8]}));
    let history = payload["history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["parameters"].as_array().unwrap().len(), 1);
    assert_eq!(history[1]["parameters"].as_array().unwrap().len(), 2);
    assert_eq!(
        store.calls_for(Role::ParameterHistory),
        vec![vec!["1".to_string(), "2".to_string()]]
    );
}

#[tokio::test]
async fn absent_settings_skip_the_augmenting_fetches() {
    let store = MockBackend::builder()
        .returns_device_data(vec![])
        .pump_settings(|| Ok(None))
        .parameter_history(|_| Ok(None))
        .security_profile(|| Ok(None))
        .build();
    let t = Tideline::builder().with_backend(store.clone()).build().unwrap();
    let req = DataRequest::new("user-1", "trace-1", day()).include(Include::PUMP_SETTINGS);
    let report = t.aggregate(&req, &CancelToken::never()).await.unwrap();
    assert_eq!(report.body, b"[]");
    assert!(store.calls_for(Role::ParameterHistory).is_empty());
    assert!(store.calls_for(Role::BasalSecurityProfile).is_empty());
}

#[tokio::test]
async fn not_found_documents_are_benign() {
    let store = MockBackend::builder()
        .returns_device_data(vec![])
        .pump_settings(|| Ok(Some(settings())))
        .parameter_history(|_| Err(TidelineError::not_found("parameter history")))
        .security_profile(|| Err(TidelineError::not_found("security profile")))
        .build();
    let t = Tideline::builder().with_backend(store).build().unwrap();
    let req = DataRequest::new("user-1", "trace-1", day()).include(Include::PUMP_SETTINGS);
    let report = t.aggregate(&req, &CancelToken::never()).await.unwrap();
    let out = body(&report);
    assert_eq!(out.len(), 1);
    assert!(out[0]["payload"].get("history").is_none());
    assert!(out[0]["payload"].get("basalsecurityprofile").is_none());
}

#[tokio::test]
async fn settings_without_augmenting_backends_are_emitted_as_is() {
    let store = MockBackend::builder()
        .returns_device_data(vec![])
        .pump_settings(|| Ok(Some(settings())))
        .build();
    let t = Tideline::builder().with_backend(store).build().unwrap();
    let req = DataRequest::new("user-1", "trace-1", day()).include(Include::PUMP_SETTINGS);
    let report = t.aggregate(&req, &CancelToken::never()).await.unwrap();
    assert_eq!(body(&report)[0], settings().0);
}

#[tokio::test]
async fn settings_failure_aborts_before_the_concurrent_phase() {
    let store = MockBackend::builder()
        .returns_device_data(vec![])
        .pump_settings(|| Err(TidelineError::source("settings", "down")))
        .build();
    let t = Tideline::builder().with_backend(store.clone()).build().unwrap();
    let req = DataRequest::new("user-1", "trace-1", day()).include(Include::PUMP_SETTINGS);
    let err = t.aggregate(&req, &CancelToken::never()).await.unwrap_err();
    assert_eq!(err, TidelineError::source("settings", "down"));
    assert!(store.calls_for(Role::DeviceData).is_empty());
}

#[tokio::test]
async fn history_failure_is_fatal() {
    let store = MockBackend::builder()
        .returns_device_data(vec![])
        .pump_settings(|| Ok(Some(settings())))
        .parameter_history(|_| Err(TidelineError::source("history", "down")))
        .build();
    let t = Tideline::builder().with_backend(store).build().unwrap();
    let req = DataRequest::new("user-1", "trace-1", day()).include(Include::PUMP_SETTINGS);
    let err = t.aggregate(&req, &CancelToken::never()).await.unwrap_err();
    assert_eq!(err, TidelineError::source("history", "down"));
}
