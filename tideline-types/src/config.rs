//! Configuration types shared across the orchestrator and the writer.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Global configuration for the `Tideline` orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TidelineConfig {
    /// Timeout for individual source calls.
    pub source_timeout: Duration,
    /// Optional overall deadline for one aggregation, covering the
    /// synchronous settings phase, the concurrent fan-out and the upload
    /// follow-up fetch.
    pub request_timeout: Option<Duration>,
    /// Measured average response size per second of requested window.
    /// Used to pre-size the output buffer.
    pub bytes_per_second: f64,
    /// Upper bound on the pre-sized output buffer.
    pub max_prealloc_bytes: usize,
    /// Parameter levels requested from the parameter-history source.
    pub parameter_history_levels: Vec<u8>,
    /// Record types always excluded from the legacy-store fetch.
    pub excluded_types: Vec<String>,
}

impl Default for TidelineConfig {
    fn default() -> Self {
        Self {
            source_timeout: Duration::from_secs(30),
            request_timeout: None,
            bytes_per_second: 2.0,
            max_prealloc_bytes: 32 * 1024 * 1024,
            parameter_history_levels: vec![1, 2],
            excluded_types: Vec::new(),
        }
    }
}
