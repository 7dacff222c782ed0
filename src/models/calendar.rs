//! Time window model.
//!
//! Every stay and every cleaning occupies a half-open interval of
//! absolute UTC time. All overlap reasoning in the crate goes through
//! [`TimeWindow::overlaps`].
//!
//! # Time Model
//! Timestamps are `chrono::DateTime<Utc>`. Offsets present in the input
//! are normalized to UTC at the ingest boundary; property time zones are
//! display metadata only.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A time interval [start, end).
///
/// Half-open interval: includes start, excludes end. Two windows that
/// merely touch (`a.end == b.start`) do not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Interval start (inclusive).
    pub start: DateTime<Utc>,
    /// Interval end (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Creates a window of `duration` starting at `start`.
    pub fn starting_at(start: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            start,
            end: start + duration,
        }
    }

    /// Duration of this window. Negative for inverted windows.
    #[inline]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether a timestamp falls within this window.
    #[inline]
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        time >= self.start && time < self.end
    }

    /// Whether two windows overlap.
    ///
    /// Strict half-open semantics; symmetric in its arguments.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether the window has zero or negative length.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.end <= self.start
    }

    /// Whether the window ends before it starts.
    #[inline]
    pub fn is_inverted(&self) -> bool {
        self.end < self.start
    }

    /// Length of the intersection of two windows, if they overlap.
    pub fn overlap_duration(&self, other: &Self) -> Option<Duration> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if end > start {
            Some(end - start)
        } else {
            None
        }
    }
}
