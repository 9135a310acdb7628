//! window/mod.rs
//!
//! Time-window selection over the published timeline.
//!
//! A window is either unbounded, a trailing duration ("last N hours from
//! now"), or an explicit local calendar-date range with inclusive
//! 00:00:00.000 / 23:59:59.999 boundaries. Filtering never reorders; the
//! subset keeps the timeline's newest-first order.

use chrono::{Duration as ChronoDuration, Local, NaiveDate, NaiveDateTime, TimeZone};

use crate::normalize::epoch_ms;
use crate::types::VitalRecord;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Which slice of the timeline a consumer wants to see.
#[derive(Clone, Debug, PartialEq)]
pub enum WindowSpec {
    /// All records pass.
    Unbounded,
    /// Records newer than `now - hours`.
    Trailing { hours: f64 },
    /// Records within the local calendar days `start..=end`.
    Range { start: NaiveDate, end: NaiveDate },
}

impl WindowSpec {
    /// Build a window from caller parameters. An explicit date range takes
    /// precedence over a trailing duration; neither means unbounded.
    pub fn from_params(
        trailing_hours: Option<f64>,
        date_range: Option<(NaiveDate, NaiveDate)>,
    ) -> Self {
        match (date_range, trailing_hours) {
            (Some((start, end)), _) => WindowSpec::Range { start, end },
            (None, Some(hours)) => WindowSpec::Trailing { hours },
            (None, None) => WindowSpec::Unbounded,
        }
    }

    /// Inclusive `[start_ms, end_ms]` bounds; `None` leaves that side open.
    /// `now_ms` anchors trailing windows and is passed explicitly so
    /// filtering is deterministic under test.
    pub fn bounds(&self, now_ms: i64) -> (Option<i64>, Option<i64>) {
        match self {
            WindowSpec::Unbounded => (None, None),
            WindowSpec::Trailing { hours } => {
                let cutoff = now_ms - (hours * MS_PER_HOUR) as i64;
                (Some(cutoff), None)
            }
            WindowSpec::Range { start, end } => (
                Some(local_day_start_ms(*start)),
                Some(local_day_end_ms(*end)),
            ),
        }
    }

    /// Keep the records inside the window, preserving order.
    pub fn filter(&self, records: &[VitalRecord], now_ms: i64) -> Vec<VitalRecord> {
        let (start, end) = self.bounds(now_ms);
        records
            .iter()
            .filter(|r| {
                let t = epoch_ms(r.ts);
                start.map_or(true, |s| t >= s) && end.map_or(true, |e| t <= e)
            })
            .cloned()
            .collect()
    }

    /// Hours spanned by the window; `None` when unbounded.
    pub fn span_hours(&self, now_ms: i64) -> Option<f64> {
        match self {
            WindowSpec::Unbounded => None,
            WindowSpec::Trailing { hours } => Some(*hours),
            WindowSpec::Range { .. } => match self.bounds(now_ms) {
                (Some(start), Some(end)) => Some((end - start) as f64 / MS_PER_HOUR),
                _ => None,
            },
        }
    }

    /// Chart bucket granularity for this window's span.
    pub fn bucket_unit(&self, now_ms: i64) -> BucketUnit {
        match self.span_hours(now_ms) {
            Some(hours) => BucketUnit::for_span_hours(hours),
            None => BucketUnit::Week,
        }
    }
}

/// Display time-bucket granularity for charting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BucketUnit {
    Minute,
    Hour,
    Day,
    Week,
}

impl BucketUnit {
    /// Span of at most 1h buckets by minute, 24h by hour, a week (168h) by
    /// day, anything longer by week.
    pub fn for_span_hours(hours: f64) -> Self {
        if hours <= 1.0 {
            BucketUnit::Minute
        } else if hours <= 24.0 {
            BucketUnit::Hour
        } else if hours <= 168.0 {
            BucketUnit::Day
        } else {
            BucketUnit::Week
        }
    }
}

fn local_day_start_ms(day: NaiveDate) -> i64 {
    match day.and_hms_opt(0, 0, 0) {
        Some(dt) => resolve_local_ms(dt),
        None => 0,
    }
}

fn local_day_end_ms(day: NaiveDate) -> i64 {
    match day.and_hms_milli_opt(23, 59, 59, 999) {
        Some(dt) => resolve_local_ms(dt),
        None => 0,
    }
}

/// Resolve a local wall-clock instant to epoch milliseconds. DST folds take
/// the earlier instant; a DST gap (midnight skipped by spring-forward) rolls
/// forward an hour.
fn resolve_local_ms(dt: NaiveDateTime) -> i64 {
    match Local.from_local_datetime(&dt) {
        chrono::LocalResult::Single(t) => t.timestamp_millis(),
        chrono::LocalResult::Ambiguous(earliest, _) => earliest.timestamp_millis(),
        chrono::LocalResult::None => Local
            .from_local_datetime(&(dt + ChronoDuration::hours(1)))
            .earliest()
            .map(|t| t.timestamp_millis())
            .unwrap_or(0),
    }
}
