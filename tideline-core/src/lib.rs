//! tideline-core
//!
//! The reconciliation algorithms and collaborator contracts behind the
//! tideline orchestrator.
//!
//! - `timerange`: half-open time ranges with an optional end and their union.
//! - `loopmode`: the contiguous automated/scheduled timeline.
//! - `basal`: cutting basal samples on loop-mode boundaries.
//! - `source`: the `Backend` trait and its role traits.
//! - `writer`: the streaming JSON-array writer.
//!
//! Async runtime (Tokio)
//! ---------------------
//! `cancel::CancelToken` is built on `tokio::sync::watch` and
//! `CancelSource::child_of` spawns onto the current runtime, so code that
//! drives the source traits must run under a Tokio 1.x runtime.
//!
#![warn(missing_docs)]

/// Basal reconciliation against the loop-mode timeline.
pub mod basal;
/// Request cancellation signal.
pub mod cancel;
/// CBG bucket flattening.
pub mod cbg;
/// Loop-mode timeline reconstruction and queries.
pub mod loopmode;
/// Injected metrics sink.
pub mod metrics;
/// Collaborator traits implemented by backends.
pub mod source;
pub mod timerange;
/// Timezone offset resolution with UTC fallback.
pub mod timezone;
pub mod writer;

pub use basal::reconcile;
pub use cancel::{CancelSource, CancelToken};
pub use loopmode::{LoopModeEvent, LoopModeTimeline};
pub use metrics::{MetricsSink, NoopMetrics, Outcome};
pub use source::{
    Backend, BasalBucketProvider, CbgBucketProvider, DeviceDataProvider, LoopModeProvider,
    ParameterHistoryProvider, PumpSettingsProvider, RequestContext, SecurityProfileProvider,
    UploadRecordsProvider,
};
pub use timerange::TimeRange;
pub use writer::{RecordError, ResultWriter};

pub use tideline_types::*;
