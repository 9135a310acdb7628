//! stats.rs
//!
//! Summary statistics over a windowed subset of the timeline.

use crate::types::VitalRecord;

/// Aggregates for one window of records.
///
/// Empty windows report `None` aggregates rather than zero so callers can
/// render an explicit "no data" indicator instead of a misleading 0.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowSummary {
    pub count: usize,
    /// Mean heart rate, rounded to the nearest BPM.
    pub avg_heart_rate: Option<i64>,
    /// Mean SpO2, rounded to one decimal place.
    pub avg_spo2: Option<f64>,
    /// Most recent sample in the window (input is newest-first).
    pub newest: Option<VitalRecord>,
}

/// Summarize a subset that is already in timeline order (newest first).
/// Records missing a value contribute 0 to that mean.
pub fn summarize(subset: &[VitalRecord]) -> WindowSummary {
    if subset.is_empty() {
        return WindowSummary {
            count: 0,
            avg_heart_rate: None,
            avg_spo2: None,
            newest: None,
        };
    }

    let n = subset.len() as f64;
    let hr_sum: f64 = subset.iter().map(|r| r.heart_rate.unwrap_or(0.0)).sum();
    let spo2_sum: f64 = subset.iter().map(|r| r.spo2.unwrap_or(0.0)).sum();

    WindowSummary {
        count: subset.len(),
        avg_heart_rate: Some((hr_sum / n).round() as i64),
        avg_spo2: Some(((spo2_sum / n) * 10.0).round() / 10.0),
        newest: subset.first().cloned(),
    }
}
