use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tideline_core::source::{
    Backend, BasalBucketProvider, CbgBucketProvider, DeviceDataProvider, LoopModeProvider,
    ParameterHistoryProvider, PumpSettingsProvider, RequestContext, SecurityProfileProvider,
    UploadRecordsProvider,
};
use tideline_core::{
    BasalBucket, BasalSecurityProfile, CbgBucket, LoopModeEvent, MetricsSink, Outcome,
    ParameterHistory, PumpSettings, RawRecord, Role, TidelineError, Window,
};

pub mod fixtures;

/// Mock backend for CI-safe tests and demos. Serves every role from static
/// fixtures.
///
/// A few user ids change the behavior of every call:
/// - `FAIL` returns a source error.
/// - `TIMEOUT` sleeps for 200ms before answering.
/// - `EMPTY` returns no data.
pub struct MockBackend;

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    async fn maybe_fail_or_timeout(user_id: &str, role: Role) -> Result<bool, TidelineError> {
        match user_id {
            "FAIL" => Err(TidelineError::source(
                "tideline-mock",
                format!("forced failure: {role}"),
            )),
            "TIMEOUT" => {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(true)
            }
            "EMPTY" => Ok(false),
            _ => Ok(true),
        }
    }
}

impl Backend for MockBackend {
    fn name(&self) -> &'static str {
        "tideline-mock"
    }

    fn as_device_data_provider(&self) -> Option<&dyn DeviceDataProvider> {
        Some(self as &dyn DeviceDataProvider)
    }
    fn as_pump_settings_provider(&self) -> Option<&dyn PumpSettingsProvider> {
        Some(self as &dyn PumpSettingsProvider)
    }
    fn as_parameter_history_provider(&self) -> Option<&dyn ParameterHistoryProvider> {
        Some(self as &dyn ParameterHistoryProvider)
    }
    fn as_security_profile_provider(&self) -> Option<&dyn SecurityProfileProvider> {
        Some(self as &dyn SecurityProfileProvider)
    }
    fn as_cbg_bucket_provider(&self) -> Option<&dyn CbgBucketProvider> {
        Some(self as &dyn CbgBucketProvider)
    }
    fn as_basal_bucket_provider(&self) -> Option<&dyn BasalBucketProvider> {
        Some(self as &dyn BasalBucketProvider)
    }
    fn as_loop_mode_provider(&self) -> Option<&dyn LoopModeProvider> {
        Some(self as &dyn LoopModeProvider)
    }
    fn as_upload_records_provider(&self) -> Option<&dyn UploadRecordsProvider> {
        Some(self as &dyn UploadRecordsProvider)
    }
}

#[async_trait]
impl DeviceDataProvider for MockBackend {
    async fn device_data(
        &self,
        _ctx: &RequestContext,
        user_id: &str,
        window: Window,
        excluded_types: &[String],
    ) -> Result<Vec<RawRecord>, TidelineError> {
        if !Self::maybe_fail_or_timeout(user_id, Role::DeviceData).await? {
            return Ok(Vec::new());
        }
        Ok(fixtures::device_data::for_window(window, excluded_types))
    }
}

#[async_trait]
impl PumpSettingsProvider for MockBackend {
    async fn latest_pump_settings(
        &self,
        _ctx: &RequestContext,
        user_id: &str,
        _session_token: &str,
    ) -> Result<Option<PumpSettings>, TidelineError> {
        let has_data = Self::maybe_fail_or_timeout(user_id, Role::PumpSettings).await?;
        Ok(has_data.then(fixtures::settings::pump_settings))
    }
}

#[async_trait]
impl ParameterHistoryProvider for MockBackend {
    async fn parameter_history(
        &self,
        _ctx: &RequestContext,
        user_id: &str,
        levels: &[u8],
    ) -> Result<Option<ParameterHistory>, TidelineError> {
        if !Self::maybe_fail_or_timeout(user_id, Role::ParameterHistory).await? {
            return Ok(None);
        }
        let mut history = fixtures::settings::parameter_history();
        history.parameters.retain(|p| levels.contains(&p.level));
        Ok(Some(history))
    }
}

#[async_trait]
impl SecurityProfileProvider for MockBackend {
    async fn latest_basal_security_profile(
        &self,
        _ctx: &RequestContext,
        user_id: &str,
    ) -> Result<Option<BasalSecurityProfile>, TidelineError> {
        let has_data = Self::maybe_fail_or_timeout(user_id, Role::BasalSecurityProfile).await?;
        Ok(has_data.then(fixtures::settings::security_profile))
    }
}

#[async_trait]
impl CbgBucketProvider for MockBackend {
    async fn cbg_buckets(
        &self,
        _ctx: &RequestContext,
        user_id: &str,
        _session_token: &str,
        _window: Window,
    ) -> Result<Vec<CbgBucket>, TidelineError> {
        let has_data = Self::maybe_fail_or_timeout(user_id, Role::CbgBuckets).await?;
        Ok(if has_data {
            fixtures::buckets::cbg_buckets()
        } else {
            Vec::new()
        })
    }
}

#[async_trait]
impl BasalBucketProvider for MockBackend {
    async fn basal_buckets(
        &self,
        _ctx: &RequestContext,
        user_id: &str,
        _session_token: &str,
        _window: Window,
    ) -> Result<Vec<BasalBucket>, TidelineError> {
        let has_data = Self::maybe_fail_or_timeout(user_id, Role::BasalBuckets).await?;
        Ok(if has_data {
            fixtures::buckets::basal_buckets()
        } else {
            Vec::new()
        })
    }
}

#[async_trait]
impl LoopModeProvider for MockBackend {
    async fn loop_mode_events(
        &self,
        _ctx: &RequestContext,
        user_id: &str,
        _window: Window,
    ) -> Result<Vec<LoopModeEvent>, TidelineError> {
        let has_data = Self::maybe_fail_or_timeout(user_id, Role::LoopModeEvents).await?;
        Ok(if has_data {
            fixtures::loop_mode::events()
        } else {
            Vec::new()
        })
    }
}

#[async_trait]
impl UploadRecordsProvider for MockBackend {
    async fn records_by_upload_ids(
        &self,
        _ctx: &RequestContext,
        upload_ids: &[String],
    ) -> Result<Vec<RawRecord>, TidelineError> {
        Ok(fixtures::device_data::uploads(upload_ids))
    }
}

/// One `record_source` call captured by [`RecordingMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSample {
    pub role: Role,
    pub elapsed: Duration,
    pub outcome: Outcome,
}

/// One `record_response` call captured by [`RecordingMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseSample {
    pub bytes: usize,
    pub records: usize,
    pub elapsed: Duration,
}

/// Metrics sink that keeps everything it is handed, for assertions.
#[derive(Debug, Default)]
pub struct RecordingMetrics {
    sources: Mutex<Vec<SourceSample>>,
    responses: Mutex<Vec<ResponseSample>>,
}

impl RecordingMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Source calls recorded so far, in completion order.
    pub fn sources(&self) -> Vec<SourceSample> {
        self.sources
            .lock()
            .map(|g| g.clone())
            .unwrap_or_default()
    }

    /// Responses recorded so far.
    pub fn responses(&self) -> Vec<ResponseSample> {
        self.responses
            .lock()
            .map(|g| g.clone())
            .unwrap_or_default()
    }

    /// Outcome of the first call recorded for `role`.
    pub fn outcome_of(&self, role: Role) -> Option<Outcome> {
        self.sources()
            .into_iter()
            .find(|s| s.role == role)
            .map(|s| s.outcome)
    }
}

impl MetricsSink for RecordingMetrics {
    fn record_source(&self, role: Role, elapsed: Duration, outcome: Outcome) {
        if let Ok(mut g) = self.sources.lock() {
            g.push(SourceSample {
                role,
                elapsed,
                outcome,
            });
        }
    }

    fn record_response(&self, bytes: usize, records: usize, elapsed: Duration) {
        if let Ok(mut g) = self.responses.lock() {
            g.push(ResponseSample {
                bytes,
                records,
                elapsed,
            });
        }
    }
}
