use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::util::{Slot, drain, join_barrier, spawn_slot};
use crate::Tideline;
use tideline_core::{
    Backend, BasalSample, CbgSample, DataRequest, Include, LoopModeEvent, LoopModeTimeline,
    MetricsSink, RawRecord, RequestContext, Role, TidelineError, Window, cbg, reconcile,
};

/// Everything a spawned source task needs, owned.
#[derive(Clone)]
struct TaskEnv {
    ctx: RequestContext,
    user_id: String,
    session_token: String,
    window: Window,
    timeout: Duration,
    metrics: Arc<dyn MetricsSink>,
}

/// Source tasks in flight for one request.
pub(crate) struct Dispatched {
    store: Slot<Vec<RawRecord>>,
    cbg: Option<Slot<Vec<CbgSample>>>,
    basal: Option<Slot<Vec<BasalSample>>>,
    handles: Vec<JoinHandle<()>>,
}

/// Results of the concurrent phase.
pub(crate) struct Fetched {
    pub(crate) store: Vec<RawRecord>,
    pub(crate) cbg: Vec<CbgSample>,
    pub(crate) basal: Vec<BasalSample>,
}

fn unsupported(role: Role) -> TidelineError {
    TidelineError::unsupported(role.as_str())
}

async fn device_data(
    env: TaskEnv,
    backend: Arc<dyn Backend>,
    excluded: Vec<String>,
) -> Result<Vec<RawRecord>, TidelineError> {
    let provider = backend
        .as_device_data_provider()
        .ok_or_else(|| unsupported(Role::DeviceData))?;
    Tideline::source_call_with_timeout(
        backend.name(),
        Role::DeviceData,
        env.timeout,
        &env.ctx,
        env.metrics.as_ref(),
        provider.device_data(&env.ctx, &env.user_id, env.window, &excluded),
    )
    .await
}

async fn cbg_samples(
    env: TaskEnv,
    backend: Arc<dyn Backend>,
) -> Result<Vec<CbgSample>, TidelineError> {
    let provider = backend
        .as_cbg_bucket_provider()
        .ok_or_else(|| unsupported(Role::CbgBuckets))?;
    let buckets = Tideline::source_call_with_timeout(
        backend.name(),
        Role::CbgBuckets,
        env.timeout,
        &env.ctx,
        env.metrics.as_ref(),
        provider.cbg_buckets(&env.ctx, &env.user_id, &env.session_token, env.window),
    )
    .await?;
    Ok(cbg::flatten(buckets))
}

async fn loop_mode_events(
    env: TaskEnv,
    backend: Arc<dyn Backend>,
) -> Result<Vec<LoopModeEvent>, TidelineError> {
    let provider = backend
        .as_loop_mode_provider()
        .ok_or_else(|| unsupported(Role::LoopModeEvents))?;
    Tideline::source_call_with_timeout(
        backend.name(),
        Role::LoopModeEvents,
        env.timeout,
        &env.ctx,
        env.metrics.as_ref(),
        provider.loop_mode_events(&env.ctx, &env.user_id, env.window),
    )
    .await
}

/// Fetch basal buckets and the loop-mode events they depend on, then
/// reconcile.
///
/// The loop-mode fetch runs as its own task and is always awaited, so it
/// never outlives this one. A basal-bucket failure takes precedence over a
/// loop-mode failure.
async fn basal_samples(
    env: TaskEnv,
    basal_backend: Arc<dyn Backend>,
    loop_backend: Arc<dyn Backend>,
) -> Result<Vec<BasalSample>, TidelineError> {
    let (_loop_task, loop_slot) = spawn_slot(loop_mode_events(env.clone(), loop_backend));

    let buckets = match basal_backend.as_basal_bucket_provider() {
        Some(provider) => {
            Tideline::source_call_with_timeout(
                basal_backend.name(),
                Role::BasalBuckets,
                env.timeout,
                &env.ctx,
                env.metrics.as_ref(),
                provider.basal_buckets(&env.ctx, &env.user_id, &env.session_token, env.window),
            )
            .await
        }
        None => Err(unsupported(Role::BasalBuckets)),
    };
    let events = drain(loop_slot, Role::LoopModeEvents).await;

    let buckets = buckets?;
    let timeline = LoopModeTimeline::fill(events?);
    Ok(reconcile(buckets, &timeline)
        .into_iter()
        .flat_map(|b| b.samples)
        .collect())
}

impl Tideline {
    /// Spawn one task per source enabled by the request.
    pub(crate) fn dispatch(
        &self,
        req: &DataRequest,
        ctx: &RequestContext,
        excluded: Vec<String>,
    ) -> Result<Dispatched, TidelineError> {
        let env = TaskEnv {
            ctx: ctx.clone(),
            user_id: req.user_id.clone(),
            session_token: req.session_token.clone(),
            window: req.window,
            timeout: self.cfg.source_timeout,
            metrics: Arc::clone(&self.metrics),
        };
        // resolve every route before spawning anything
        let store_backend = self.route(Role::DeviceData)?;
        let cbg_backend = if req.include.contains(Include::CBG_BUCKETS) {
            Some(self.route(Role::CbgBuckets)?)
        } else {
            None
        };
        let basal_backends = if req.include.contains(Include::BASAL_BUCKETS) {
            Some((
                self.route(Role::BasalBuckets)?,
                self.route(Role::LoopModeEvents)?,
            ))
        } else {
            None
        };

        let mut handles = Vec::with_capacity(3);
        let (h, store) = spawn_slot(device_data(env.clone(), store_backend, excluded));
        handles.push(h);
        let cbg = cbg_backend.map(|b| {
            let (h, slot) = spawn_slot(cbg_samples(env.clone(), b));
            handles.push(h);
            slot
        });
        let basal = basal_backends.map(|(b, l)| {
            let (h, slot) = spawn_slot(basal_samples(env.clone(), b, l));
            handles.push(h);
            slot
        });

        #[cfg(feature = "tracing")]
        tracing::debug!(
            trace_id = %ctx.trace_id,
            tasks = handles.len(),
            "dispatched source tasks"
        );

        Ok(Dispatched {
            store,
            cbg,
            basal,
            handles,
        })
    }
}

impl Dispatched {
    /// Wait for every task, then read the outcomes in the fixed order
    /// store, cbg, basal. The first error wins.
    pub(crate) async fn settle(self) -> Result<Fetched, TidelineError> {
        join_barrier(self.handles).await;

        let store = drain(self.store, Role::DeviceData).await?;
        let cbg = match self.cbg {
            Some(slot) => drain(slot, Role::CbgBuckets).await?,
            None => Vec::new(),
        };
        let basal = match self.basal {
            Some(slot) => drain(slot, Role::BasalBuckets).await?,
            None => Vec::new(),
        };
        Ok(Fetched { store, cbg, basal })
    }
}
