//! Incremental JSON-array writer for aggregated records.
//!
//! Records are appended one at a time; a record that fails to decode or
//! serialize is skipped and counted, never aborting the response.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use tideline_types::{AggregateReport, Record};

const OPEN: &[u8] = b"[";
const SEPARATOR: &[u8] = b",\n";
const CLOSE: &[u8] = b"]";

/// Why a single record was skipped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// A raw document was not valid JSON.
    #[error("record decode failed: {0}")]
    Decode(String),
    /// A record could not be encoded.
    #[error("record serialize failed: {0}")]
    Serialize(String),
}

#[derive(Serialize)]
struct Tagged<'a, T: Serialize> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(flatten)]
    inner: &'a T,
}

/// Initial buffer size for a window of `window_seconds`, capped at `cap`.
#[must_use]
pub fn estimate_capacity(window_seconds: i64, bytes_per_second: f64, cap: usize) -> usize {
    let secs = u32::try_from(window_seconds.max(0)).unwrap_or(u32::MAX);
    let estimate = f64::from(secs) * bytes_per_second.max(0.0);
    if estimate >= cap as f64 {
        cap
    } else {
        // in range: non-negative and below `cap`
        estimate as usize
    }
}

/// Streaming writer producing one JSON array.
#[derive(Debug)]
pub struct ResultWriter {
    buf: Vec<u8>,
    scratch: Vec<u8>,
    written: usize,
    skipped: usize,
    first_error: Option<RecordError>,
}

impl Default for ResultWriter {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl ResultWriter {
    /// A writer whose buffer starts with `capacity` bytes reserved.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut buf = Vec::with_capacity(capacity.max(OPEN.len() + CLOSE.len()));
        buf.extend_from_slice(OPEN);
        Self {
            buf,
            scratch: Vec::new(),
            written: 0,
            skipped: 0,
            first_error: None,
        }
    }

    /// Number of records written so far.
    #[must_use]
    pub const fn written(&self) -> usize {
        self.written
    }

    /// Number of records skipped so far.
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    fn encode(&mut self, record: &Record) -> Result<(), RecordError> {
        self.scratch.clear();
        let res = match record {
            Record::Raw(raw) => {
                let value: Value = serde_json::from_slice(raw.as_bytes())
                    .map_err(|e| RecordError::Decode(e.to_string()))?;
                serde_json::to_writer(&mut self.scratch, &value)
            }
            Record::Document(value) => serde_json::to_writer(&mut self.scratch, value),
            Record::Cbg(s) => serde_json::to_writer(
                &mut self.scratch,
                &Tagged {
                    kind: "cbg",
                    inner: s,
                },
            ),
            Record::Basal(s) => serde_json::to_writer(
                &mut self.scratch,
                &Tagged {
                    kind: "basal",
                    inner: s,
                },
            ),
        };
        res.map_err(|e| RecordError::Serialize(e.to_string()))
    }

    /// Append one record.
    ///
    /// On failure nothing is written; the error is counted and returned for
    /// the caller's information only.
    pub fn write(&mut self, record: &Record) -> Result<(), RecordError> {
        if let Err(e) = self.encode(record) {
            self.skipped += 1;
            if self.first_error.is_none() {
                self.first_error = Some(e.clone());
            }
            return Err(e);
        }
        if self.written > 0 {
            self.buf.extend_from_slice(SEPARATOR);
        }
        self.buf.extend_from_slice(&self.scratch);
        self.written += 1;
        Ok(())
    }

    /// Append every record, skipping failures.
    pub fn write_all(&mut self, records: impl IntoIterator<Item = Record>) {
        for r in records {
            let _ = self.write(&r);
        }
    }

    /// Close the array and return the body with its counters.
    ///
    /// Skipped records are logged once here, with the first error and the
    /// total count.
    #[must_use]
    pub fn finish(mut self, trace_id: &str) -> AggregateReport {
        self.buf.extend_from_slice(CLOSE);
        #[cfg(feature = "tracing")]
        if let Some(first) = &self.first_error {
            tracing::warn!(
                trace_id = %trace_id,
                skipped = self.skipped,
                first_error = %first,
                "skipped records while writing response"
            );
        }
        #[cfg(not(feature = "tracing"))]
        let _ = trace_id;
        AggregateReport {
            body: self.buf,
            written: self.written,
            skipped: self.skipped,
            first_error: self.first_error.map(|e| e.to_string()),
        }
    }
}
