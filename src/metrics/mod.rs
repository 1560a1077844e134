//! Performance metrics derived from normalized events: per-asset reduction
//! and shift-level aggregation.

pub mod aggregate;
pub mod reducer;

use serde::{Deserialize, Serialize};

/// Stops shorter than this are "short" stops.
pub const SHORT_STOP_THRESHOLD_MS: i64 = 300_000;

/// OEE performance component assumed when the caller supplies no measurement.
pub const DEFAULT_PERFORMANCE_PCT: f64 = 85.0;
/// OEE quality component assumed when the caller supplies no measurement.
pub const DEFAULT_QUALITY_PCT: f64 = 95.0;

/// Availability as a percentage, clamped to `[0, 100]` and never NaN.
/// Zero observed time yields 0, not a division error.
pub fn availability_pct(runtime_ms: i64, downtime_ms: i64) -> f64 {
    let total = runtime_ms + downtime_ms;
    if total <= 0 {
        return 0.0;
    }
    (runtime_ms as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

/// Derived performance metrics for a single asset over one shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetMetrics {
    pub asset_id: String,
    pub asset_name: Option<String>,
    pub runtime_ms: i64,
    pub downtime_ms: i64,
    pub stop_count: u32,
    pub short_stop_count: u32,
    pub long_stop_count: u32,
    /// Explicit micro-stops, reported separately on top of the short split.
    pub micro_stop_count: u32,
    pub longest_stop_ms: i64,
    pub average_stop_ms: f64,
    pub availability_pct: f64,
}

impl AssetMetrics {
    pub fn empty(asset_id: &str, asset_name: Option<String>) -> Self {
        Self {
            asset_id: asset_id.to_string(),
            asset_name,
            runtime_ms: 0,
            downtime_ms: 0,
            stop_count: 0,
            short_stop_count: 0,
            long_stop_count: 0,
            micro_stop_count: 0,
            longest_stop_ms: 0,
            average_stop_ms: 0.0,
            availability_pct: 0.0,
        }
    }
}

/// Caller-supplied OEE components. Defaults are fixed baseline assumptions
/// used when performance and quality are not measured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OeeInputs {
    pub performance_pct: f64,
    pub quality_pct: f64,
}

impl Default for OeeInputs {
    fn default() -> Self {
        Self {
            performance_pct: DEFAULT_PERFORMANCE_PCT,
            quality_pct: DEFAULT_QUALITY_PCT,
        }
    }
}

/// Shift-level aggregate across all assets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShiftMetrics {
    pub total_runtime_ms: i64,
    pub total_downtime_ms: i64,
    pub total_stops: u32,
    /// Unweighted arithmetic mean of per-asset availability.
    pub average_availability_pct: f64,
    /// Time-based availability over the summed runtime and downtime.
    pub availability_pct: f64,
    pub performance_pct: f64,
    pub quality_pct: f64,
    pub oee_pct: f64,
    /// Mean time between failures; absent when no stops occurred.
    pub mtbf_ms: Option<i64>,
    /// Mean time to repair; absent when no stops occurred.
    pub mttr_ms: Option<i64>,
}

/// Direction of shift performance relative to the historical baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTrend {
    Improving,
    Stable,
    Declining,
    /// No historical baseline to compare against.
    Unknown,
}
