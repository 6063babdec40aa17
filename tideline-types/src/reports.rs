//! Report envelopes produced by the orchestrator.

use serde::{Deserialize, Serialize};

/// Outcome of one aggregation.
///
/// Carries the serialized JSON array and what the writer had to skip.
/// Skipped records are non-fatal: the body is always a valid array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AggregateReport {
    /// Serialized response body (a JSON array).
    pub body: Vec<u8>,
    /// Records written to `body`.
    pub written: usize,
    /// Records skipped because they failed to decode or serialize.
    pub skipped: usize,
    /// Message of the first skipped record's failure.
    pub first_error: Option<String>,
}
