use std::collections::HashSet;

use tideline_core::{Include, RawRecord, Role, TidelineError};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Completion slot of one spawned source task.
pub type Slot<T> = oneshot::Receiver<Result<T, TidelineError>>;

/// Spawn `fut` and return its join handle with the slot it reports into.
///
/// The task always reports, whatever the outcome of `fut`.
pub fn spawn_slot<T, F>(fut: F) -> (JoinHandle<()>, Slot<T>)
where
    T: Send + 'static,
    F: core::future::Future<Output = Result<T, TidelineError>> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
        // receiver is gone once the request was abandoned
        let _ = tx.send(fut.await);
    });
    (handle, rx)
}

/// Receive the outcome reported into `slot`.
///
/// # Errors
/// Returns the task's own error, or `Other` if the task ended without
/// reporting (it panicked or was aborted).
pub async fn drain<T>(slot: Slot<T>, role: Role) -> Result<T, TidelineError> {
    slot.await.unwrap_or_else(|_| {
        Err(TidelineError::Other(format!(
            "{role} task ended without reporting"
        )))
    })
}

/// Wait for every dispatched task to finish.
pub async fn join_barrier(handles: Vec<JoinHandle<()>>) {
    futures::future::join_all(handles).await;
}

/// Document types the legacy store must not return for this request.
///
/// Types served from the bucketed service or prepended separately are
/// excluded so they are not emitted twice.
#[must_use]
pub fn excluded_types(include: Include, always: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    if include.contains(Include::CBG_BUCKETS) {
        out.push("cbg".to_string());
    }
    if include.contains(Include::BASAL_BUCKETS) {
        out.push("basal".to_string());
    }
    if include.contains(Include::PUMP_SETTINGS) {
        out.push("pumpSettings".to_string());
    }
    for t in always {
        if !out.contains(t) {
            out.push(t.clone());
        }
    }
    out
}

/// Distinct upload ids referenced by `records`, in first-seen order.
#[must_use]
pub fn collect_upload_ids(records: &[RawRecord]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    records
        .iter()
        .filter_map(RawRecord::upload_id)
        .filter(|id| seen.insert(id.clone()))
        .collect()
}
