use async_trait::async_trait;

use crate::cancel::CancelToken;
use crate::loopmode::LoopModeEvent;
use tideline_types::{
    BasalBucket, BasalSecurityProfile, CbgBucket, ParameterHistory, PumpSettings, RawRecord,
    TidelineError, Window,
};

/// Per-request context handed to every collaborator call.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Correlation id for logs and upstream calls.
    pub trace_id: String,
    /// Fires when the request is cancelled or times out.
    pub cancel: CancelToken,
}

impl RequestContext {
    /// Build a context for one request.
    pub fn new(trace_id: impl Into<String>, cancel: CancelToken) -> Self {
        Self {
            trace_id: trace_id.into(),
            cancel,
        }
    }
}

/// Focused role trait for the legacy row-oriented device-data store.
#[async_trait]
pub trait DeviceDataProvider: Send + Sync {
    /// Fetch every document for `user_id` inside `window` whose `type` is not
    /// in `excluded_types`.
    async fn device_data(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        window: Window,
        excluded_types: &[String],
    ) -> Result<Vec<RawRecord>, TidelineError>;
}

/// Focused role trait for the latest pump settings.
#[async_trait]
pub trait PumpSettingsProvider: Send + Sync {
    /// Fetch the latest pump settings; `None` when the user has none.
    async fn latest_pump_settings(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        session_token: &str,
    ) -> Result<Option<PumpSettings>, TidelineError>;
}

/// Focused role trait for pump parameter history.
#[async_trait]
pub trait ParameterHistoryProvider: Send + Sync {
    /// Fetch parameter changes at the given levels.
    async fn parameter_history(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        levels: &[u8],
    ) -> Result<Option<ParameterHistory>, TidelineError>;
}

/// Focused role trait for the basal security profile.
#[async_trait]
pub trait SecurityProfileProvider: Send + Sync {
    /// Fetch the latest basal security profile.
    async fn latest_basal_security_profile(
        &self,
        ctx: &RequestContext,
        user_id: &str,
    ) -> Result<Option<BasalSecurityProfile>, TidelineError>;
}

/// Focused role trait for day-bucketed CBG readings.
#[async_trait]
pub trait CbgBucketProvider: Send + Sync {
    /// Fetch the CBG buckets overlapping `window`.
    async fn cbg_buckets(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        session_token: &str,
        window: Window,
    ) -> Result<Vec<CbgBucket>, TidelineError>;
}

/// Focused role trait for day-bucketed basal samples.
#[async_trait]
pub trait BasalBucketProvider: Send + Sync {
    /// Fetch the basal buckets overlapping `window`.
    async fn basal_buckets(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        session_token: &str,
        window: Window,
    ) -> Result<Vec<BasalBucket>, TidelineError>;
}

/// Focused role trait for loop-mode events.
#[async_trait]
pub trait LoopModeProvider: Send + Sync {
    /// Fetch the raw loop-mode events reported inside `window`.
    async fn loop_mode_events(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        window: Window,
    ) -> Result<Vec<LoopModeEvent>, TidelineError>;
}

/// Focused role trait for records looked up by upload id.
#[async_trait]
pub trait UploadRecordsProvider: Send + Sync {
    /// Fetch the records for the given upload ids.
    async fn records_by_upload_ids(
        &self,
        ctx: &RequestContext,
        upload_ids: &[String],
    ) -> Result<Vec<RawRecord>, TidelineError>;
}

/// A backend advertises the roles it serves by returning trait objects.
///
/// The orchestrator resolves each role to the first registered backend that
/// advertises it.
pub trait Backend: Send + Sync {
    /// Stable identifier used in logs and errors (e.g. "mongo-store").
    fn name(&self) -> &'static str;

    /// Advertise legacy-store device data.
    fn as_device_data_provider(&self) -> Option<&dyn DeviceDataProvider> {
        None
    }
    /// Advertise latest pump settings.
    fn as_pump_settings_provider(&self) -> Option<&dyn PumpSettingsProvider> {
        None
    }
    /// Advertise parameter history.
    fn as_parameter_history_provider(&self) -> Option<&dyn ParameterHistoryProvider> {
        None
    }
    /// Advertise the basal security profile.
    fn as_security_profile_provider(&self) -> Option<&dyn SecurityProfileProvider> {
        None
    }
    /// Advertise CBG buckets.
    fn as_cbg_bucket_provider(&self) -> Option<&dyn CbgBucketProvider> {
        None
    }
    /// Advertise basal buckets.
    fn as_basal_bucket_provider(&self) -> Option<&dyn BasalBucketProvider> {
        None
    }
    /// Advertise loop-mode events.
    fn as_loop_mode_provider(&self) -> Option<&dyn LoopModeProvider> {
        None
    }
    /// Advertise upload-id lookups.
    fn as_upload_records_provider(&self) -> Option<&dyn UploadRecordsProvider> {
        None
    }
}
