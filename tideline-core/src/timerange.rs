//! Half-open time ranges with an optional ("ongoing") end.
//!
//! Absent ends compare as +infinity throughout: an ongoing range overlaps
//! everything that starts after it, and the union of an ongoing range with
//! anything is itself ongoing.

use core::cmp::Ordering;
use core::fmt;

use chrono::{DateTime, TimeDelta, Utc};

use crate::time_format;

/// A time window `[start, end)`; `end == None` means no known end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeRange {
    /// Inclusive start.
    pub start: DateTime<Utc>,
    /// Exclusive end, or `None` while ongoing.
    pub end: Option<DateTime<Utc>>,
    /// True only for ranges synthesized to cover a gap.
    pub fill: bool,
}

/// Order two optional ends with `None` as +infinity.
fn cmp_end(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => a.cmp(&b),
    }
}

fn min_end(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    if cmp_end(a, b) == Ordering::Greater { b } else { a }
}

fn max_end(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    if cmp_end(a, b) == Ordering::Less { b } else { a }
}

impl TimeRange {
    /// A closed range `[start, end)`.
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end: Some(end),
            fill: false,
        }
    }

    /// An ongoing range starting at `start`.
    #[must_use]
    pub const fn open(start: DateTime<Utc>) -> Self {
        Self {
            start,
            end: None,
            fill: false,
        }
    }

    /// A synthetic gap filler `[start, end)`.
    #[must_use]
    pub const fn filler(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end: Some(end),
            fill: true,
        }
    }

    /// Same start instant.
    #[must_use]
    pub fn start_equal(&self, other: &Self) -> bool {
        self.start == other.start
    }

    /// Same end; two ongoing ranges have equal ends, one ongoing and one
    /// closed do not.
    #[must_use]
    pub fn end_equal(&self, other: &Self) -> bool {
        self.end == other.end
    }

    /// Same start and same end. The `fill` marker is not compared.
    #[must_use]
    pub fn equal(&self, other: &Self) -> bool {
        self.start_equal(other) && self.end_equal(other)
    }

    /// Whether the two ranges share any instant.
    ///
    /// Ranges with an equal start or an equal end always overlap. Otherwise
    /// the later-starting range overlaps iff it starts strictly before the
    /// earlier one ends; adjacent ranges do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        if self.start_equal(other) || self.end_equal(other) {
            return true;
        }
        let (first, second) = if self.start <= other.start {
            (self, other)
        } else {
            (other, self)
        };
        first.end.is_none_or(|end| second.start < end)
    }

    /// Length of the range, `None` while ongoing.
    #[must_use]
    pub fn duration(&self) -> Option<TimeDelta> {
        self.end.map(|end| end - self.start)
    }

    /// Whether `instant` falls inside `[start, end)`.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && self.end.is_none_or(|end| instant < end)
    }

    /// Intersection with `[start, end)`, or `None` when it is empty.
    /// The `fill` marker is kept.
    #[must_use]
    pub fn clip(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        let s = self.start.max(start);
        let e = self.end.map_or(end, |own| own.min(end));
        (s < e).then_some(Self {
            start: s,
            end: Some(e),
            fill: self.fill,
        })
    }

    /// Split the combined extent of two ranges into 1 to 3 ordered,
    /// non-overlapping ranges.
    ///
    /// - Disjoint: both ranges in chronological order; with `fill`, a
    ///   synthetic range covers the gap between them when it has positive
    ///   length.
    /// - Identical: the single range.
    /// - Equal starts: split at the earlier end.
    /// - Equal ends: split at the later start.
    /// - Otherwise: three-way split at the inner boundaries.
    ///
    /// The result does not depend on argument order.
    #[must_use]
    pub fn union(&self, other: &Self, fill: bool) -> Vec<Self> {
        if !self.overlaps(other) {
            let (first, second) = if self.start <= other.start {
                (*self, *other)
            } else {
                (*other, *self)
            };
            // disjoint implies the earlier range is closed
            let gap_start = first.end.unwrap_or(second.start);
            if fill && gap_start < second.start {
                return vec![first, Self::filler(gap_start, second.start), second];
            }
            return vec![first, second];
        }

        if self.equal(other) {
            return vec![Self {
                fill: self.fill && other.fill,
                ..*self
            }];
        }

        let min_start = self.start.min(other.start);
        let max_start = self.start.max(other.start);
        let lo_end = min_end(self.end, other.end);
        let hi_end = max_end(self.end, other.end);

        if self.start_equal(other) {
            // ends differ, so the earlier one is closed
            let Some(split) = lo_end else {
                return vec![Self::open(min_start)];
            };
            return vec![
                Self::new(min_start, split),
                Self {
                    start: split,
                    end: hi_end,
                    fill: false,
                },
            ];
        }

        if self.end_equal(other) {
            return vec![
                Self::new(min_start, max_start),
                Self {
                    start: max_start,
                    end: hi_end,
                    fill: false,
                },
            ];
        }

        // general overlap: max_start < lo_end, and lo_end is closed
        let Some(lo_end) = lo_end else {
            return vec![Self::new(min_start, max_start), Self::open(max_start)];
        };
        let inner_lo = max_start.min(lo_end);
        let inner_hi = max_start.max(lo_end);
        vec![
            Self::new(min_start, inner_lo),
            Self::new(inner_lo, inner_hi),
            Self {
                start: inner_hi,
                end: hi_end,
                fill: false,
            },
        ]
    }
}

impl PartialOrd for TimeRange {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeRange {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| cmp_end(self.end, other.end))
            .then_with(|| self.fill.cmp(&other.fill))
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = self
            .end
            .map_or_else(|| "+inf".to_string(), |e| time_format::format(&e));
        write!(f, "[{}, {})", time_format::format(&self.start), end)?;
        if self.fill {
            f.write_str(" fill")?;
        }
        Ok(())
    }
}
