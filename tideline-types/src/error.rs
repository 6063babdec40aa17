use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the tideline workspace.
///
/// This wraps request validation errors, source-tagged fetch failures,
/// cancellation and deadline conditions, and missing-role configuration
/// problems.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TidelineError {
    /// No registered backend advertises the requested source role.
    #[error("unsupported source role: {role}")]
    Unsupported {
        /// A role label describing what was requested (e.g. "cbg-buckets").
        role: String,
    },

    /// Issues with the returned or expected data (missing fields, etc.).
    #[error("data issue: {0}")]
    Data(String),

    /// Invalid input argument (e.g. a request window whose start is after its end).
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// An upstream source returned an error.
    #[error("{origin} failed: {msg}")]
    Source {
        /// Source label that failed.
        origin: String,
        /// Human-readable error message.
        msg: String,
    },

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),

    /// A resource could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of missing resource, e.g. "pump settings for user 42".
        what: String,
    },

    /// An individual source call exceeded the configured timeout.
    #[error("source timed out: {role} via {origin}")]
    SourceTimeout {
        /// Backend name that timed out.
        origin: String,
        /// Role label (e.g. "device-data", "basal-buckets").
        role: String,
    },

    /// The overall request exceeded the configured deadline.
    #[error("request timed out: {role}")]
    RequestTimeout {
        /// Role or phase label for which the request timed out.
        role: String,
    },

    /// The caller cancelled the request while the source call was in flight.
    #[error("cancelled: {origin}")]
    Cancelled {
        /// Source label whose call was interrupted.
        origin: String,
    },
}

impl TidelineError {
    /// Helper: build an `Unsupported` error for a role string.
    #[must_use]
    pub fn unsupported(role: impl Into<String>) -> Self {
        Self::Unsupported { role: role.into() }
    }

    /// Helper: build a `Source` error with the source label and message.
    pub fn source(origin: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Source {
            origin: origin.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `SourceTimeout` error.
    pub fn source_timeout(origin: impl Into<String>, role: impl Into<String>) -> Self {
        Self::SourceTimeout {
            origin: origin.into(),
            role: role.into(),
        }
    }

    /// Helper: build a `RequestTimeout` error.
    #[must_use]
    pub fn request_timeout(role: impl Into<String>) -> Self {
        Self::RequestTimeout { role: role.into() }
    }

    /// Helper: build a `Cancelled` error.
    #[must_use]
    pub fn cancelled(origin: impl Into<String>) -> Self {
        Self::Cancelled {
            origin: origin.into(),
        }
    }

    /// Returns true for errors caused by the caller's cancellation or deadline
    /// rather than by an upstream failure.
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled { .. } | Self::RequestTimeout { .. })
    }

    /// Returns true if this error must abort the whole aggregation.
    ///
    /// `NotFound` is the only benign outcome: optional documents (pump
    /// settings, parameter history, security profile) may legitimately be
    /// absent.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::NotFound { .. })
    }
}

impl From<serde_json::Error> for TidelineError {
    fn from(e: serde_json::Error) -> Self {
        Self::Data(e.to_string())
    }
}
