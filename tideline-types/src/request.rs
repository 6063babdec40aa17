//! Request envelopes handed to the orchestrator.

use bitflags::bitflags;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TidelineError;

bitflags! {
    /// Optional sources to include in an aggregation.
    ///
    /// Legacy-store device data is always fetched.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Include: u8 {
        /// Read CBG from the bucketed time-series service.
        const CBG_BUCKETS = 1;
        /// Read basal from the bucketed time-series service and reconcile it.
        const BASAL_BUCKETS = 1 << 1;
        /// Prepend the latest pump settings with their history.
        const PUMP_SETTINGS = 1 << 2;
    }
}

/// Half-open request window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    /// Inclusive start.
    pub start: DateTime<Utc>,
    /// Exclusive end.
    pub end: DateTime<Utc>,
}

impl Window {
    /// Build a validated window.
    ///
    /// # Errors
    /// Returns `InvalidArg` if `start` is after `end`.
    pub fn try_new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, TidelineError> {
        let w = Self { start, end };
        w.validate()?;
        Ok(w)
    }

    /// Check the window ordering.
    ///
    /// # Errors
    /// Returns `InvalidArg` if `start` is after `end`.
    pub fn validate(&self) -> Result<(), TidelineError> {
        if self.start > self.end {
            return Err(TidelineError::InvalidArg(format!(
                "start date {} is after end date {}",
                self.start, self.end
            )));
        }
        Ok(())
    }

    /// Window length.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}

/// One aggregation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRequest {
    /// Subject user.
    pub user_id: String,
    /// Correlation identifier carried into every log line and source call.
    pub trace_id: String,
    /// Requested window.
    pub window: Window,
    /// Optional sources.
    pub include: Include,
    /// Caller's session token, forwarded to sources that need it.
    pub session_token: String,
}

impl DataRequest {
    /// New request with no optional sources and an empty session token.
    pub fn new(user_id: impl Into<String>, trace_id: impl Into<String>, window: Window) -> Self {
        Self {
            user_id: user_id.into(),
            trace_id: trace_id.into(),
            window,
            include: Include::empty(),
            session_token: String::new(),
        }
    }

    /// Replace the optional source flags.
    #[must_use]
    pub const fn include(mut self, include: Include) -> Self {
        self.include = include;
        self
    }

    /// Set the session token.
    #[must_use]
    pub fn session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = token.into();
        self
    }
}
