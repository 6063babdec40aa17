//! Injected metrics sink.

use std::time::Duration;

use tideline_types::{Role, TidelineError};

/// How a source call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Returned a value.
    Ok,
    /// Returned an error.
    Error,
    /// Hit the per-source deadline.
    Timeout,
    /// Abandoned because the request was cancelled.
    Cancelled,
}

impl Outcome {
    /// Classify a call result.
    #[must_use]
    pub fn of<T>(res: &Result<T, TidelineError>) -> Self {
        match res {
            Ok(_) => Self::Ok,
            Err(TidelineError::SourceTimeout { .. }) => Self::Timeout,
            Err(e) if e.is_cancellation() => Self::Cancelled,
            Err(_) => Self::Error,
        }
    }

    /// Stable label for dashboards.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Receives per-source latencies and per-response sizes.
///
/// Implementations must be cheap; they are called inline on the request path.
pub trait MetricsSink: Send + Sync {
    /// One collaborator call finished.
    fn record_source(&self, role: Role, elapsed: Duration, outcome: Outcome);

    /// One response was written.
    fn record_response(&self, bytes: usize, records: usize, elapsed: Duration) {
        let _ = (bytes, records, elapsed);
    }
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn record_source(&self, _role: Role, _elapsed: Duration, _outcome: Outcome) {}
}
