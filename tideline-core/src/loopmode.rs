//! Contiguous loop-mode timeline rebuilt from sparse device events.
//!
//! Devices report when automated delivery starts and stops. The timeline
//! covers everything from the first reported start to the last reported end:
//! time inside a reported event is `Automated`, the gaps between events are
//! `Scheduled`. Anything outside the timeline is also treated as
//! `Scheduled` when queried.

use chrono::{DateTime, Utc};

use crate::timerange::TimeRange;
use tideline_types::DeliveryType;

/// A span of time in one delivery mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopModeEvent {
    /// Covered span.
    pub range: TimeRange,
    /// Delivery mode over `range`.
    pub delivery_type: DeliveryType,
}

impl LoopModeEvent {
    /// An event in the given mode.
    #[must_use]
    pub const fn new(range: TimeRange, delivery_type: DeliveryType) -> Self {
        Self {
            range,
            delivery_type,
        }
    }

    /// An automated-delivery event.
    #[must_use]
    pub const fn automated(range: TimeRange) -> Self {
        Self::new(range, DeliveryType::Automated)
    }

    /// A synthetic scheduled-delivery segment covering `[start, end)`.
    #[must_use]
    pub const fn scheduled_gap(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::new(TimeRange::filler(start, end), DeliveryType::Scheduled)
    }
}

/// Sort events chronologically and drop every open-ended event except the
/// last one.
///
/// An open-ended event followed by later events is a stale "still active"
/// notification that a later report superseded.
#[must_use]
pub fn discard_stale(mut events: Vec<LoopModeEvent>) -> Vec<LoopModeEvent> {
    events.sort_by(|a, b| a.range.cmp(&b.range));
    let last = events.len().saturating_sub(1);
    events
        .into_iter()
        .enumerate()
        .filter(|(i, e)| e.range.end.is_some() || *i == last)
        .map(|(_, e)| e)
        .collect()
}

fn classify(range: TimeRange) -> LoopModeEvent {
    if range.fill {
        LoopModeEvent::new(range, DeliveryType::Scheduled)
    } else {
        LoopModeEvent::automated(range)
    }
}

/// Gapless, non-overlapping, ordered loop-mode segments.
///
/// Every segment's end equals the next segment's start; only the last
/// segment may be open-ended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopModeTimeline {
    segments: Vec<LoopModeEvent>,
}

impl LoopModeTimeline {
    /// Build the timeline from device events in any order.
    ///
    /// Events are folded pairwise through [`TimeRange::union`] with gap
    /// filling. Reported spans come out `Automated` whatever type the event
    /// carried; synthesized gaps come out `Scheduled`. Gap segments keep their
    /// synthetic marker, so filling an already filled timeline returns it
    /// unchanged.
    #[must_use]
    pub fn fill(events: Vec<LoopModeEvent>) -> Self {
        let events = discard_stale(events);
        let mut out: Vec<LoopModeEvent> = Vec::with_capacity(events.len() * 2);

        for ev in events {
            let Some(tail) = out.pop() else {
                out.push(classify(ev.range));
                continue;
            };
            let mut range = ev.range;
            // `out` already covers everything before the tail's start
            if range.start < tail.range.start {
                if range.end.is_some_and(|end| end <= tail.range.start) {
                    out.push(tail);
                    continue;
                }
                range.start = tail.range.start;
            }
            out.extend(tail.range.union(&range, true).into_iter().map(classify));
        }

        Self { segments: out }
    }

    /// The ordered segments.
    #[must_use]
    pub fn segments(&self) -> &[LoopModeEvent] {
        &self.segments
    }

    /// True when no device events were reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Slices of the timeline covering `[start, end)`, each clipped to the
    /// window.
    ///
    /// The slices always span the window exactly: any part the timeline does
    /// not cover (including the whole window when nothing overlaps) comes
    /// back as a synthetic `Scheduled` slice. An empty window yields no
    /// slices.
    #[must_use]
    pub fn query_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<LoopModeEvent> {
        if start >= end {
            return Vec::new();
        }
        let first = self
            .segments
            .partition_point(|s| s.range.end.is_some_and(|e| e <= start));

        let mut out = Vec::new();
        let mut cursor = start;
        for seg in self.segments[first..]
            .iter()
            .take_while(|s| s.range.start < end)
        {
            let Some(clipped) = seg.range.clip(start, end) else {
                continue;
            };
            if clipped.start > cursor {
                out.push(LoopModeEvent::scheduled_gap(cursor, clipped.start));
            }
            cursor = clipped.end.unwrap_or(end);
            out.push(LoopModeEvent::new(clipped, seg.delivery_type));
        }
        if cursor < end {
            out.push(LoopModeEvent::scheduled_gap(cursor, end));
        }
        out
    }

    /// Delivery mode at a single instant; `Scheduled` outside the timeline.
    #[must_use]
    pub fn delivery_type_at(&self, instant: DateTime<Utc>) -> DeliveryType {
        let idx = self
            .segments
            .partition_point(|s| s.range.end.is_some_and(|e| e <= instant));
        self.segments
            .get(idx)
            .filter(|s| s.range.contains(instant))
            .map_or(DeliveryType::Scheduled, |s| s.delivery_type)
    }
}
