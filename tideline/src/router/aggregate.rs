use tideline_core::writer::estimate_capacity;
use tideline_core::{
    AggregateReport, CancelSource, CancelToken, DataRequest, Include, RawRecord, Record,
    RequestContext, ResultWriter, Role, TidelineError,
};

use super::util::{collect_upload_ids, excluded_types};
use crate::Tideline;
use crate::core::with_request_deadline;

impl Tideline {
    /// Aggregate every requested source for one user and window into a single
    /// JSON array.
    ///
    /// Behavior:
    /// - The window is validated before anything is fetched.
    /// - With `PUMP_SETTINGS`, the latest pump settings (augmented with the
    ///   grouped parameter history and the basal security profile) are
    ///   fetched first.
    /// - The legacy store, and the CBG and basal bucket services when
    ///   flagged, are then fetched concurrently. All of them are awaited
    ///   before any outcome is read; outcomes are read in the order store,
    ///   cbg, basal and the first error aborts the request.
    /// - Records are emitted as: pump settings, legacy-store records, CBG
    ///   readings, reconciled basal segments, then the records of every
    ///   upload referenced by the legacy-store records.
    /// - Records that fail to encode are skipped and counted in the report.
    ///
    /// `cancel` and the configured request timeout both cancel every
    /// in-flight source call.
    ///
    /// # Errors
    /// Returns `InvalidArg` for a window whose start is after its end,
    /// `Unsupported` when a flagged source has no backend, and the first
    /// source failure otherwise (including `Cancelled` and `RequestTimeout`).
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "tideline::router::aggregate",
            skip(self, req, cancel),
            fields(
                trace_id = %req.trace_id,
                user_id = %req.user_id,
                include = ?req.include,
            ),
        )
    )]
    pub async fn aggregate(
        &self,
        req: &DataRequest,
        cancel: &CancelToken,
    ) -> Result<AggregateReport, TidelineError> {
        req.window.validate()?;
        self.check_routes(req.include)?;
        let started = tokio::time::Instant::now();

        let source = CancelSource::child_of(cancel);
        let ctx = RequestContext::new(req.trace_id.clone(), source.token());
        let res = with_request_deadline(self.cfg.request_timeout, self.run(req, &ctx))
            .await
            .and_then(|r| r);

        match &res {
            Ok(report) => {
                self.metrics
                    .record_response(report.body.len(), report.written, started.elapsed());
            }
            Err(_e) => {
                // stop stragglers left behind by a deadline
                source.cancel();
                #[cfg(feature = "tracing")]
                tracing::warn!(trace_id = %req.trace_id, error = %_e, "aggregation failed");
            }
        }
        res
    }

    async fn run(
        &self,
        req: &DataRequest,
        ctx: &RequestContext,
    ) -> Result<AggregateReport, TidelineError> {
        let settings = if req.include.contains(Include::PUMP_SETTINGS) {
            self.pump_settings(req, ctx).await?
        } else {
            None
        };

        let excluded = excluded_types(req.include, &self.cfg.excluded_types);
        let fetched = self.dispatch(req, ctx, excluded)?.settle().await?;

        let upload_ids = collect_upload_ids(&fetched.store);
        let uploads = self.upload_records(ctx, &upload_ids).await?;

        let capacity = estimate_capacity(
            req.window.duration().num_seconds(),
            self.cfg.bytes_per_second,
            self.cfg.max_prealloc_bytes,
        );
        let mut writer = ResultWriter::with_capacity(capacity);
        writer.write_all(
            settings
                .map(Record::Document)
                .into_iter()
                .chain(fetched.store.into_iter().map(Record::Raw))
                .chain(fetched.cbg.into_iter().map(Record::Cbg))
                .chain(fetched.basal.into_iter().map(Record::Basal))
                .chain(uploads.into_iter().map(Record::Raw)),
        );
        Ok(writer.finish(&req.trace_id))
    }

    /// Fetch the records of the given uploads.
    ///
    /// Skipped when there are no ids or no backend serves the lookup.
    async fn upload_records(
        &self,
        ctx: &RequestContext,
        upload_ids: &[String],
    ) -> Result<Vec<RawRecord>, TidelineError> {
        if upload_ids.is_empty() {
            return Ok(Vec::new());
        }
        let Some(backend) = self.optional_route(Role::UploadRecords) else {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                trace_id = %ctx.trace_id,
                uploads = upload_ids.len(),
                "no upload-records backend; skipping upload lookup"
            );
            return Ok(Vec::new());
        };
        let Some(provider) = backend.as_upload_records_provider() else {
            return Ok(Vec::new());
        };
        Self::source_call_with_timeout(
            backend.name(),
            Role::UploadRecords,
            self.cfg.source_timeout,
            ctx,
            self.metrics.as_ref(),
            provider.records_by_upload_ids(ctx, upload_ids),
        )
        .await
    }
}
