use core::fmt;
use serde::{Deserialize, Serialize};

/// Source roles the orchestrator fetches from.
///
/// These map one-to-one with collaborator traits and give errors, logs and
/// metrics a consistent label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Role {
    /// Legacy-store device data within the request window.
    DeviceData,
    /// Latest pump settings document.
    PumpSettings,
    /// Pump parameter change history.
    ParameterHistory,
    /// Latest basal security profile.
    BasalSecurityProfile,
    /// Day-bucketed CBG samples.
    CbgBuckets,
    /// Day-bucketed basal samples.
    BasalBuckets,
    /// Loop-mode (automated/scheduled) events.
    LoopModeEvents,
    /// Upload records referenced by device data.
    UploadRecords,
}

impl Role {
    /// Stable, kebab-case identifier for logs/errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DeviceData => "device-data",
            Self::PumpSettings => "pump-settings",
            Self::ParameterHistory => "parameter-history",
            Self::BasalSecurityProfile => "basal-security-profile",
            Self::CbgBuckets => "cbg-buckets",
            Self::BasalBuckets => "basal-buckets",
            Self::LoopModeEvents => "loop-mode-events",
            Self::UploadRecords => "upload-records",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
