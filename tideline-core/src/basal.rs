//! Reconciliation of raw basal samples against the loop-mode timeline.
//!
//! The output is a gapless, non-overlapping sequence of segments, each cut on
//! the timeline's mode boundaries and tagged with the mode in effect.

use chrono::{DateTime, TimeDelta, Utc};

use crate::loopmode::LoopModeTimeline;
use crate::timezone;
use tideline_types::{BasalBucket, BasalSample, DeliveryType};

/// Shortest gap between two samples that gets a zero-rate filler.
pub const MIN_GAP: TimeDelta = TimeDelta::seconds(1);

struct Segment {
    bucket: usize,
    sample: BasalSample,
}

struct Reconciler<'a> {
    timeline: &'a LoopModeTimeline,
    out: Vec<Segment>,
    previous_end: Option<DateTime<Utc>>,
    counter: u64,
}

impl<'a> Reconciler<'a> {
    const fn new(timeline: &'a LoopModeTimeline) -> Self {
        Self {
            timeline,
            out: Vec::new(),
            previous_end: None,
            counter: 0,
        }
    }

    fn push(
        &mut self,
        bucket: usize,
        template: &BasalSample,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        rate: f64,
    ) {
        let slices = self.timeline.query_between(start, end);
        if slices.is_empty() {
            // zero-length sample
            let delivery_type = self.timeline.delivery_type_at(start);
            self.emit(bucket, template, start, TimeDelta::zero(), delivery_type, rate);
            return;
        }
        for slice in slices {
            let duration = slice.range.duration().unwrap_or_default();
            self.emit(bucket, template, slice.range.start, duration, slice.delivery_type, rate);
        }
    }

    fn emit(
        &mut self,
        bucket: usize,
        template: &BasalSample,
        start: DateTime<Utc>,
        duration: TimeDelta,
        delivery_type: DeliveryType,
        rate: f64,
    ) {
        let (zone, offset) = timezone::resolve(&template.timezone, start);
        let sample = BasalSample {
            guid: format!("{}-{}", template.guid, self.counter),
            timestamp: start,
            timezone: zone,
            timezone_offset_minutes: offset,
            delivery_type,
            duration_millis: duration.num_milliseconds(),
            rate,
        };
        self.counter += 1;
        self.out.push(Segment { bucket, sample });
    }

    /// Shorten or drop emitted segments that extend past `start`.
    fn trim_overlap(&mut self, start: DateTime<Utc>) {
        while let Some(tail) = self.out.last_mut() {
            if tail.sample.end() <= start {
                break;
            }
            let kept = (start - tail.sample.timestamp).num_milliseconds();
            if kept > 0 {
                tail.sample.duration_millis = kept;
                break;
            }
            self.out.pop();
        }
    }

    fn add(&mut self, bucket: usize, sample: &BasalSample) {
        let start = sample.timestamp;
        let Some(end) = sample.checked_end() else {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                guid = %sample.guid,
                duration = sample.duration_millis,
                "basal sample end out of range, skipped"
            );
            return;
        };

        if let Some(prev) = self.previous_end
            && start - prev >= MIN_GAP
        {
            self.push(bucket, sample, prev, start, 0.0);
        }
        self.trim_overlap(start);
        self.push(bucket, sample, start, end, sample.rate);
        self.previous_end = Some(end);
    }
}

/// Reconcile basal buckets against `timeline`.
///
/// Buckets are processed in day order and their samples in timestamp order.
/// Each sample is cut at every mode boundary that falls inside it and each
/// piece takes the mode in effect. Gaps of at least [`MIN_GAP`] between
/// consecutive samples are covered with zero-rate segments; a sample that
/// starts before the previous output ends truncates (or drops) the
/// overlapping tail, which may belong to an earlier bucket. Output ids are
/// `<guid>-<n>` with `n` counting up from 0 across the whole run, and
/// timezone offsets are recomputed at each segment's own start.
///
/// Every returned bucket keeps its metadata; its `samples` are replaced by the
/// reconciled segments attributed to it.
#[must_use]
pub fn reconcile(mut buckets: Vec<BasalBucket>, timeline: &LoopModeTimeline) -> Vec<BasalBucket> {
    buckets.sort_by_key(|b| b.day);
    let mut reconciler = Reconciler::new(timeline);

    for (idx, bucket) in buckets.iter_mut().enumerate() {
        let mut samples = std::mem::take(&mut bucket.samples);
        samples.sort_by_key(|s| s.timestamp);
        for sample in &samples {
            reconciler.add(idx, sample);
        }
    }

    for seg in reconciler.out {
        if let Some(bucket) = buckets.get_mut(seg.bucket) {
            bucket.samples.push(seg.sample);
        }
    }
    buckets
}
