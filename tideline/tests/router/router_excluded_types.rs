use tideline::{CancelToken, DataRequest, Include, Role, Tideline};

use crate::helpers::MockBackend;

async fn excluded_for(include: Include, always: &[&str]) -> Vec<String> {
    let store = MockBackend::builder()
        .returns_device_data(vec![])
        .pump_settings(|| Ok(None))
        .cbg(|| Ok(vec![]))
        .basal(|| Ok(vec![]))
        .loop_mode(|| Ok(vec![]))
        .build();
    let mut b = Tideline::builder().with_backend(store.clone());
    for t in always {
        b = b.exclude_type(*t);
    }
    let t = b.build().unwrap();
    let req = DataRequest::new("user-1", "trace-1", crate::helpers::day()).include(include);
    t.aggregate(&req, &CancelToken::never()).await.unwrap();
    store
        .calls_for(Role::DeviceData)
        .into_iter()
        .next()
        .unwrap()
}

#[tokio::test]
async fn store_only_excludes_configured_types() {
    assert!(excluded_for(Include::empty(), &[]).await.is_empty());
    assert_eq!(excluded_for(Include::empty(), &["food"]).await, vec!["food"]);
}

#[tokio::test]
async fn bucketed_sources_are_excluded_from_the_store() {
    assert_eq!(
        excluded_for(Include::CBG_BUCKETS, &[]).await,
        vec!["cbg"]
    );
    assert_eq!(
        excluded_for(Include::BASAL_BUCKETS | Include::PUMP_SETTINGS, &["basal"]).await,
        vec!["basal", "pumpSettings"]
    );
    assert_eq!(
        excluded_for(Include::all(), &["food"]).await,
        vec!["cbg", "basal", "pumpSettings", "food"]
    );
}
