use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::Tideline;
use tideline_core::{
    BasalSecurityProfile, DataRequest, ParameterChange, ParameterChangeGroup, ParameterHistory,
    RequestContext, Role, TidelineError,
};

/// Group parameter changes by effective date, oldest first.
#[must_use]
pub fn group_parameter_history(history: ParameterHistory) -> Vec<ParameterChangeGroup> {
    let mut by_date: BTreeMap<DateTime<Utc>, Vec<ParameterChange>> = BTreeMap::new();
    for change in history.parameters {
        by_date.entry(change.effective_date).or_default().push(change);
    }
    by_date
        .into_iter()
        .map(|(change_date, parameters)| ParameterChangeGroup {
            change_date,
            parameters,
        })
        .collect()
}

/// Insert `payload.history` and `payload.basalsecurityprofile` into a pump
/// settings document.
///
/// A missing `payload` object is created; a document that is not an object
/// (or whose payload is not) is returned unchanged.
pub fn augment(
    mut doc: Value,
    history: Option<Vec<ParameterChangeGroup>>,
    profile: Option<BasalSecurityProfile>,
) -> Result<Value, TidelineError> {
    if let Some(obj) = doc.as_object_mut()
        && let Some(payload) = obj
            .entry("payload")
            .or_insert_with(|| Value::Object(serde_json::Map::new()))
            .as_object_mut()
    {
        if let Some(groups) = history {
            payload.insert("history".to_string(), serde_json::to_value(groups)?);
        }
        if let Some(profile) = profile {
            payload.insert("basalsecurityprofile".to_string(), profile.0);
        }
    }
    Ok(doc)
}

/// `Ok(None)` for a benign not-found, otherwise the value or the error.
fn absent_ok<T>(res: Result<Option<T>, TidelineError>) -> Result<Option<T>, TidelineError> {
    match res {
        Err(TidelineError::NotFound { .. }) => Ok(None),
        other => other,
    }
}

impl Tideline {
    /// Fetch the latest pump settings and augment them with the grouped
    /// parameter history and the basal security profile.
    ///
    /// Absent documents are skipped; any other failure is fatal. Without pump
    /// settings the augmenting documents are not fetched.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "tideline::router::settings::pump_settings",
            skip(self, req, ctx),
            fields(trace_id = %ctx.trace_id),
        )
    )]
    pub(crate) async fn pump_settings(
        &self,
        req: &DataRequest,
        ctx: &RequestContext,
    ) -> Result<Option<Value>, TidelineError> {
        let timeout = self.cfg.source_timeout;
        let metrics = self.metrics.as_ref();

        let backend = self.route(Role::PumpSettings)?;
        let Some(provider) = backend.as_pump_settings_provider() else {
            return Err(TidelineError::unsupported(Role::PumpSettings.as_str()));
        };
        let settings = absent_ok(
            Self::source_call_with_timeout(
                backend.name(),
                Role::PumpSettings,
                timeout,
                ctx,
                metrics,
                provider.latest_pump_settings(ctx, &req.user_id, &req.session_token),
            )
            .await,
        )?;
        let Some(settings) = settings else {
            #[cfg(feature = "tracing")]
            tracing::debug!(user_id = %req.user_id, "no pump settings");
            return Ok(None);
        };

        let mut history = None;
        if let Some(backend) = self.optional_route(Role::ParameterHistory)
            && let Some(provider) = backend.as_parameter_history_provider()
        {
            history = absent_ok(
                Self::source_call_with_timeout(
                    backend.name(),
                    Role::ParameterHistory,
                    timeout,
                    ctx,
                    metrics,
                    provider.parameter_history(
                        ctx,
                        &req.user_id,
                        &self.cfg.parameter_history_levels,
                    ),
                )
                .await,
            )?
            .map(group_parameter_history);
        }

        let mut profile = None;
        if let Some(backend) = self.optional_route(Role::BasalSecurityProfile)
            && let Some(provider) = backend.as_security_profile_provider()
        {
            profile = absent_ok(
                Self::source_call_with_timeout(
                    backend.name(),
                    Role::BasalSecurityProfile,
                    timeout,
                    ctx,
                    metrics,
                    provider.latest_basal_security_profile(ctx, &req.user_id),
                )
                .await,
            )?;
        }

        augment(settings.0, history, profile).map(Some)
    }
}
