//! Shift-level aggregation: totals across assets, OEE composition, and the
//! extended MTBF/MTTR figures.

use crate::history::HistoricalBaseline;
use crate::metrics::{availability_pct, AssetMetrics, OeeInputs, PerformanceTrend, ShiftMetrics};

/// Combine per-asset metrics into the shift aggregate.
///
/// `average_availability_pct` is the unweighted mean of per-asset
/// percentages; `availability_pct` is time-based over the summed intervals.
pub fn aggregate_shift(per_asset: &[AssetMetrics], oee: &OeeInputs) -> ShiftMetrics {
    let total_runtime_ms: i64 = per_asset.iter().map(|m| m.runtime_ms).sum();
    let total_downtime_ms: i64 = per_asset.iter().map(|m| m.downtime_ms).sum();
    let total_stops: u32 = per_asset.iter().map(|m| m.stop_count).sum();

    let average_availability_pct = if per_asset.is_empty() {
        0.0
    } else {
        per_asset.iter().map(|m| m.availability_pct).sum::<f64>() / per_asset.len() as f64
    };

    let shift_availability = availability_pct(total_runtime_ms, total_downtime_ms);
    let oee_pct =
        (shift_availability * oee.performance_pct * oee.quality_pct / 10_000.0).clamp(0.0, 100.0);

    let (mtbf_ms, mttr_ms) = if total_stops > 0 {
        (
            Some(total_runtime_ms / total_stops as i64),
            Some(total_downtime_ms / total_stops as i64),
        )
    } else {
        (None, None)
    };

    ShiftMetrics {
        total_runtime_ms,
        total_downtime_ms,
        total_stops,
        average_availability_pct,
        availability_pct: shift_availability,
        performance_pct: oee.performance_pct,
        quality_pct: oee.quality_pct,
        oee_pct,
        mtbf_ms,
        mttr_ms,
    }
}

/// Classify the shift's availability against the historical baseline.
/// Half a standard deviation (at least one point) of slack keeps ordinary
/// run-to-run noise classified as stable.
pub fn classify_trend(
    current_availability_pct: f64,
    baseline: Option<&HistoricalBaseline>,
) -> PerformanceTrend {
    let Some(baseline) = baseline else {
        return PerformanceTrend::Unknown;
    };
    let slack = (baseline.availability_std_dev * 0.5).max(1.0);
    if current_availability_pct < baseline.avg_availability - slack {
        PerformanceTrend::Declining
    } else if current_availability_pct > baseline.avg_availability + slack {
        PerformanceTrend::Improving
    } else {
        PerformanceTrend::Stable
    }
}
