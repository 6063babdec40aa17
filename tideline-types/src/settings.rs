//! Pump settings and the documents that augment them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Latest pump settings document, passed through largely as fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PumpSettings(pub Value);

/// Latest basal security profile document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BasalSecurityProfile(pub Value);

/// A single change of one pump parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterChange {
    /// Parameter level (1 = main, 2 = advanced, ...).
    pub level: u8,
    /// Parameter name.
    pub name: String,
    /// New value, as reported.
    pub value: String,
    /// Unit of `value`, when it has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// When the change took effect.
    #[serde(with = "crate::time_format")]
    pub effective_date: DateTime<Utc>,
}

/// Parameter changes for one user.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParameterHistory {
    /// Changes in any order.
    pub parameters: Vec<ParameterChange>,
}

/// Parameter changes sharing one effective date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterChangeGroup {
    /// Common effective date.
    #[serde(with = "crate::time_format")]
    pub change_date: DateTime<Utc>,
    /// Changes that took effect at `change_date`.
    pub parameters: Vec<ParameterChange>,
}
