//! Temporal pattern analysis: how events distribute across the shift
//! timeline, classified from the variance of a fixed-width histogram.

use crate::detect::stats::Series;
use crate::event::{Event, ShiftWindow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The shift is always sliced into this many equal-width buckets.
pub const BUCKET_COUNT: usize = 8;

/// Qualitative spread of events across the shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DensityPattern {
    Uniform,
    Moderate,
    Clustered,
    NoEvents,
}

/// A bucket holding the maximum observed event count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakPeriod {
    pub bucket: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalPattern {
    pub bucket_counts: [u32; BUCKET_COUNT],
    pub peak_periods: Vec<PeakPeriod>,
    pub density_pattern: DensityPattern,
}

impl Default for TemporalPattern {
    fn default() -> Self {
        Self {
            bucket_counts: [0; BUCKET_COUNT],
            peak_periods: Vec::new(),
            density_pattern: DensityPattern::NoEvents,
        }
    }
}

/// Bucket the events across the shift and classify the distribution.
/// Events outside `[start, end]` (clock skew) are dropped, not errors.
pub fn analyze(events: &[Event], window: &ShiftWindow) -> TemporalPattern {
    let mut counts = [0u32; BUCKET_COUNT];
    let width_ms = window.duration_ms() / BUCKET_COUNT as i64;

    for event in events {
        if !window.contains(event.timestamp) {
            continue;
        }
        let bucket = if width_ms <= 0 {
            0
        } else {
            let offset = (event.timestamp - window.start).num_milliseconds();
            // An event exactly at shift end lands on index BUCKET_COUNT;
            // it belongs to the last bucket.
            ((offset / width_ms) as usize).min(BUCKET_COUNT - 1)
        };
        counts[bucket] += 1;
    }

    let total: u32 = counts.iter().sum();
    if total == 0 {
        return TemporalPattern::default();
    }

    let series = Series::new(counts.iter().map(|&c| c as f64).collect());
    let mean = series.mean();
    let variance = series.variance();

    let density_pattern = if variance < mean * 0.5 {
        DensityPattern::Uniform
    } else if variance > mean * 2.0 {
        DensityPattern::Clustered
    } else {
        DensityPattern::Moderate
    };

    let max = *counts.iter().max().unwrap_or(&0);
    let peak_periods = counts
        .iter()
        .enumerate()
        .filter(|&(_, &c)| c == max && c > 0)
        .map(|(bucket, &count)| PeakPeriod {
            bucket,
            start: window.start + chrono::Duration::milliseconds(bucket as i64 * width_ms),
            end: if bucket == BUCKET_COUNT - 1 {
                window.end
            } else {
                window.start + chrono::Duration::milliseconds((bucket as i64 + 1) * width_ms)
            },
            count,
        })
        .collect();

    TemporalPattern {
        bucket_counts: counts,
        peak_periods,
        density_pattern,
    }
}
