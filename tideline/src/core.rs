use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tideline_core::{Backend, MetricsSink, NoopMetrics, Outcome, RequestContext};
use tideline_types::{Include, Role, TidelineConfig, TidelineError};

const ROLES: [Role; 8] = [
    Role::DeviceData,
    Role::PumpSettings,
    Role::ParameterHistory,
    Role::BasalSecurityProfile,
    Role::CbgBuckets,
    Role::BasalBuckets,
    Role::LoopModeEvents,
    Role::UploadRecords,
];

fn advertises(backend: &dyn Backend, role: Role) -> bool {
    match role {
        Role::DeviceData => backend.as_device_data_provider().is_some(),
        Role::PumpSettings => backend.as_pump_settings_provider().is_some(),
        Role::ParameterHistory => backend.as_parameter_history_provider().is_some(),
        Role::BasalSecurityProfile => backend.as_security_profile_provider().is_some(),
        Role::CbgBuckets => backend.as_cbg_bucket_provider().is_some(),
        Role::BasalBuckets => backend.as_basal_bucket_provider().is_some(),
        Role::LoopModeEvents => backend.as_loop_mode_provider().is_some(),
        Role::UploadRecords => backend.as_upload_records_provider().is_some(),
        _ => false,
    }
}

/// Orchestrator that aggregates device data across registered backends.
pub struct Tideline {
    pub(crate) routes: HashMap<Role, Arc<dyn Backend>>,
    pub(crate) cfg: TidelineConfig,
    pub(crate) metrics: Arc<dyn MetricsSink>,
}

/// Builder for constructing a `Tideline` orchestrator with custom configuration.
pub struct TidelineBuilder {
    backends: Vec<Arc<dyn Backend>>,
    cfg: TidelineConfig,
    metrics: Arc<dyn MetricsSink>,
}

impl Default for TidelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TidelineBuilder {
    /// Create a new builder with default configuration and a no-op metrics sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            backends: vec![],
            cfg: TidelineConfig::default(),
            metrics: Arc::new(NoopMetrics),
        }
    }

    /// Register a backend.
    ///
    /// Each role is served by the first registered backend that advertises
    /// it; later backends only fill roles the earlier ones lack.
    #[must_use]
    pub fn with_backend(mut self, b: Arc<dyn Backend>) -> Self {
        self.backends.push(b);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: TidelineConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Set the per-source call timeout.
    #[must_use]
    pub const fn source_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.source_timeout = timeout;
        self
    }

    /// Bound the whole aggregation.
    ///
    /// When exceeded, in-flight source calls are cancelled and the request
    /// fails with `RequestTimeout`.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.request_timeout = Some(timeout);
        self
    }

    /// Expected response bytes per second of window, used to pre-size the
    /// response buffer.
    #[must_use]
    pub const fn bytes_per_second(mut self, rate: f64) -> Self {
        self.cfg.bytes_per_second = rate;
        self
    }

    /// Upper bound for the response buffer pre-allocation.
    #[must_use]
    pub const fn max_prealloc_bytes(mut self, bytes: usize) -> Self {
        self.cfg.max_prealloc_bytes = bytes;
        self
    }

    /// Parameter levels requested from the parameter history.
    #[must_use]
    pub fn parameter_history_levels(mut self, levels: &[u8]) -> Self {
        self.cfg.parameter_history_levels = levels.to_vec();
        self
    }

    /// Always exclude this document type from the legacy-store fetch.
    #[must_use]
    pub fn exclude_type(mut self, kind: impl Into<String>) -> Self {
        self.cfg.excluded_types.push(kind.into());
        self
    }

    /// Inject a metrics sink.
    #[must_use]
    pub fn metrics(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.metrics = sink;
        self
    }

    /// Build the `Tideline` orchestrator.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no backends have been registered via
    /// [`with_backend`](Self::with_backend), and `Unsupported` if none of them
    /// serves legacy-store device data.
    pub fn build(self) -> Result<Tideline, TidelineError> {
        if self.backends.is_empty() {
            return Err(TidelineError::InvalidArg(
                "no backends registered; add at least one via with_backend(...)".to_string(),
            ));
        }

        let mut routes: HashMap<Role, Arc<dyn Backend>> = HashMap::new();
        for role in ROLES {
            if let Some(b) = self.backends.iter().find(|b| advertises(Arc::as_ref(b), role)) {
                routes.insert(role, Arc::clone(b));
            }
        }
        if !routes.contains_key(&Role::DeviceData) {
            return Err(TidelineError::unsupported(Role::DeviceData.as_str()));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            backends = self.backends.len(),
            roles = routes.len(),
            "tideline built"
        );

        Ok(Tideline {
            routes,
            cfg: self.cfg,
            metrics: self.metrics,
        })
    }
}

/// Attach the backend name to an untagged error.
pub fn tag_err(origin: &str, e: TidelineError) -> TidelineError {
    match e {
        e @ (TidelineError::NotFound { .. }
        | TidelineError::Source { .. }
        | TidelineError::SourceTimeout { .. }
        | TidelineError::RequestTimeout { .. }
        | TidelineError::Cancelled { .. }
        | TidelineError::Unsupported { .. }) => e,
        other => TidelineError::Source {
            origin: origin.to_string(),
            msg: other.to_string(),
        },
    }
}

/// Run `fut` under an optional overall deadline.
///
/// # Errors
/// Returns `RequestTimeout("aggregate")` when the deadline elapses first.
pub async fn with_request_deadline<T, Fut>(
    deadline: Option<Duration>,
    fut: Fut,
) -> Result<T, TidelineError>
where
    Fut: core::future::Future<Output = T>,
{
    match deadline {
        Some(d) => tokio::time::timeout(d, fut)
            .await
            .map_err(|_| TidelineError::request_timeout("aggregate")),
        None => Ok(fut.await),
    }
}

impl Tideline {
    /// Start building a new `Tideline` instance.
    #[must_use]
    pub fn builder() -> TidelineBuilder {
        TidelineBuilder::new()
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &TidelineConfig {
        &self.cfg
    }

    /// Backend serving `role`.
    pub(crate) fn route(&self, role: Role) -> Result<Arc<dyn Backend>, TidelineError> {
        self.routes
            .get(&role)
            .cloned()
            .ok_or_else(|| TidelineError::unsupported(role.as_str()))
    }

    /// Fail with `Unsupported` unless every role `include` needs is served.
    pub(crate) fn check_routes(&self, include: Include) -> Result<(), TidelineError> {
        let mut required = vec![Role::DeviceData];
        if include.contains(Include::PUMP_SETTINGS) {
            required.push(Role::PumpSettings);
        }
        if include.contains(Include::CBG_BUCKETS) {
            required.push(Role::CbgBuckets);
        }
        if include.contains(Include::BASAL_BUCKETS) {
            required.extend([Role::BasalBuckets, Role::LoopModeEvents]);
        }
        for role in required {
            self.route(role)?;
        }
        Ok(())
    }

    /// Backend serving `role`, if any.
    pub(crate) fn optional_route(&self, role: Role) -> Option<Arc<dyn Backend>> {
        self.routes.get(&role).cloned()
    }

    /// Wrap a source future with the per-source timeout, the request's
    /// cancellation token and metrics recording.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "tideline::core::source_call_with_timeout",
            skip(ctx, metrics, fut),
            fields(
                origin = origin,
                role = %role,
                trace_id = %ctx.trace_id,
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            ),
        )
    )]
    pub(crate) async fn source_call_with_timeout<T, Fut>(
        origin: &'static str,
        role: Role,
        timeout: Duration,
        ctx: &RequestContext,
        metrics: &dyn MetricsSink,
        fut: Fut,
    ) -> Result<T, TidelineError>
    where
        Fut: core::future::Future<Output = Result<T, TidelineError>>,
    {
        let started = tokio::time::Instant::now();
        let res = tokio::select! {
            biased;
            () = ctx.cancel.cancelled() => Err(TidelineError::cancelled(origin)),
            r = tokio::time::timeout(timeout, fut) => r
                .unwrap_or_else(|_| Err(TidelineError::source_timeout(origin, role.as_str()))),
        };
        let res = res.map_err(|e| tag_err(origin, e));
        metrics.record_source(role, started.elapsed(), Outcome::of(&res));
        res
    }
}
