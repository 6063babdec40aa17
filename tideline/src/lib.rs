//! Tideline aggregates diabetes-device data from a legacy document store and a
//! day-bucketed time-series service into one ordered JSON stream.
//!
//! Overview
//! - Routes each source role to the first registered backend that serves it.
//! - Fetches the enabled sources concurrently, one task per source, and
//!   applies a fixed error precedence: store, then CBG, then basal.
//! - Reconciles basal samples against the loop-mode timeline so the emitted
//!   basal segments are gapless, non-overlapping, and tagged with the
//!   delivery mode in effect.
//! - Streams the merged records into one JSON array, skipping (and counting)
//!   records that fail to encode.
//!
//! Key behaviors and trade-offs
//! - Error precedence is deterministic: every task is awaited before any
//!   outcome is read, so a slow store failure still beats a fast CBG failure.
//!   The price is that a failing request always waits for its slowest source.
//! - Upstream calls are never retried; retry policy belongs to the caller.
//! - Timezone offsets are recomputed from the device's declared zone name;
//!   unknown zones are written as UTC with offset 0.
//!
//! Examples
//! ```rust,ignore
//! use std::sync::Arc;
//! use tideline::{CancelToken, DataRequest, Include, Tideline, Window};
//!
//! let tideline = Tideline::builder()
//!     .with_backend(Arc::new(StoreBackend::connect(...)))
//!     .with_backend(Arc::new(BucketBackend::connect(...)))
//!     .source_timeout(std::time::Duration::from_secs(10))
//!     .build()?;
//!
//! let req = DataRequest::new("user-1", "trace-1", Window::try_new(start, end)?)
//!     .include(Include::CBG_BUCKETS | Include::BASAL_BUCKETS)
//!     .session_token(token);
//! let report = tideline.aggregate(&req, &CancelToken::never()).await?;
//! // report.body holds the JSON array
//! ```
#![warn(missing_docs)]

pub(crate) mod core;
mod router;

pub use crate::core::{Tideline, TidelineBuilder, tag_err, with_request_deadline};
pub use router::settings::{augment, group_parameter_history};
pub use router::util::{collect_upload_ids, excluded_types};

// Re-export core types for convenience
pub use tideline_core::{
    AggregateReport, Backend, BasalBucket, BasalBucketProvider, BasalSample,
    BasalSecurityProfile, CancelSource, CancelToken, CbgBucket, CbgBucketProvider, CbgSample,
    DataRequest, DeliveryType, DeviceDataProvider, Include, LoopModeEvent, LoopModeProvider,
    LoopModeTimeline, MetricsSink, NoopMetrics, Outcome, ParameterChange, ParameterChangeGroup,
    ParameterHistory, ParameterHistoryProvider, PumpSettings, PumpSettingsProvider, RawRecord,
    Record, RequestContext, Role, SecurityProfileProvider, TidelineConfig, TidelineError,
    TimeRange, UploadRecordsProvider, Window,
};
