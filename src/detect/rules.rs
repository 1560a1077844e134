//! The anomaly rule set. Rules are evaluated independently; a shift may
//! trigger none, one, or several, and overlapping findings are not deduped.

use crate::detect::{Anomaly, AnomalyKind, Severity};
use crate::event::{Event, ShiftWindow};
use crate::history::HistoricalBaseline;
use crate::metrics::{AssetMetrics, ShiftMetrics};
use tracing::warn;

/// An asset below this availability is considered critically degraded.
pub const CRITICAL_AVAILABILITY_PCT: f64 = 50.0;
/// Events per shift-hour above this rate count as abnormal churn.
pub const HIGH_FREQUENCY_PER_HOUR: f64 = 5.0;
/// Single events running longer than this (30 min) are flagged.
pub const EXTENDED_EVENT_MS: i64 = 1_800_000;

/// Everything the rule set reads; all borrowed, nothing mutated.
pub struct DetectionInput<'a> {
    pub shift: &'a ShiftMetrics,
    pub per_asset: &'a [AssetMetrics],
    pub events: &'a [Event],
    pub window: &'a ShiftWindow,
    pub baseline: Option<&'a HistoricalBaseline>,
}

/// Run all rules over the shift. Without a historical baseline the
/// statistical deviation rule is skipped entirely.
pub fn run(input: &DetectionInput) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();

    if let Some(baseline) = input.baseline {
        if let Some(anomaly) = availability_deviation(input.shift.availability_pct, baseline) {
            anomalies.push(anomaly);
        }
    }
    anomalies.extend(critical_assets(input.per_asset));
    if let Some(anomaly) = event_frequency(input.events.len(), input.window) {
        anomalies.push(anomaly);
    }
    if let Some(anomaly) = extended_durations(input.events) {
        anomalies.push(anomaly);
    }

    for anomaly in &anomalies {
        warn!(
            kind = ?anomaly.kind,
            severity = ?anomaly.severity,
            confidence = anomaly.confidence,
            "Anomaly flagged: {}",
            anomaly.description
        );
    }

    anomalies
}

/// Flag when shift availability deviates more than two standard deviations
/// from the historical average.
fn availability_deviation(
    current_availability_pct: f64,
    baseline: &HistoricalBaseline,
) -> Option<Anomaly> {
    let deviation = (current_availability_pct - baseline.avg_availability).abs();
    let threshold = 2.0 * baseline.availability_std_dev;
    if deviation <= threshold {
        return None;
    }

    let severity = if deviation > 3.0 * baseline.availability_std_dev {
        Severity::High
    } else {
        Severity::Medium
    };
    let direction = if current_availability_pct < baseline.avg_availability {
        "below"
    } else {
        "above"
    };

    Some(Anomaly {
        kind: AnomalyKind::AvailabilityDeviation,
        severity,
        description: format!(
            "Shift availability {:.1}% is {:.1} points {} the historical average of {:.1}%",
            current_availability_pct, deviation, direction, baseline.avg_availability
        ),
        confidence: (deviation / threshold).min(1.0),
        recommendation: "Compare this shift's stop log against recent shifts to isolate what changed"
            .to_string(),
    })
}

/// One anomaly per asset whose observed availability collapsed below the
/// critical threshold. Assets with no observed time are skipped: an idle
/// asset is not a failed one.
fn critical_assets(per_asset: &[AssetMetrics]) -> Vec<Anomaly> {
    per_asset
        .iter()
        .filter(|m| m.runtime_ms + m.downtime_ms > 0)
        .filter(|m| m.availability_pct < CRITICAL_AVAILABILITY_PCT)
        .map(|m| Anomaly {
            kind: AnomalyKind::CriticalAssetFailure,
            severity: Severity::High,
            description: format!(
                "Asset {} ran at {:.1}% availability with {} stops",
                m.asset_id, m.availability_pct, m.stop_count
            ),
            confidence: 0.9,
            recommendation: format!(
                "Inspect asset {} before the next shift; downtime dominated its schedule",
                m.asset_id
            ),
        })
        .collect()
}

fn event_frequency(event_count: usize, window: &ShiftWindow) -> Option<Anomaly> {
    let hours = window.duration_hours();
    if hours <= 0.0 {
        return None;
    }
    let rate = event_count as f64 / hours;
    if rate <= HIGH_FREQUENCY_PER_HOUR {
        return None;
    }
    Some(Anomaly {
        kind: AnomalyKind::HighEventFrequency,
        severity: Severity::Medium,
        description: format!(
            "{} events over {:.1}h ({:.1}/h) exceeds the expected rate of {:.0}/h",
            event_count, hours, rate, HIGH_FREQUENCY_PER_HOUR
        ),
        confidence: 0.7,
        recommendation: "High event churn often precedes a fault; review the most frequent event sources"
            .to_string(),
    })
}

/// A single aggregate entry counting every event that reported a duration
/// beyond the extended threshold.
fn extended_durations(events: &[Event]) -> Option<Anomaly> {
    let extended = events
        .iter()
        .filter(|e| e.duration_ms.is_some_and(|d| d > EXTENDED_EVENT_MS))
        .count();
    if extended == 0 {
        return None;
    }
    Some(Anomaly {
        kind: AnomalyKind::ExtendedDuration,
        severity: Severity::High,
        description: format!(
            "{} event(s) exceeded {} minutes in duration",
            extended,
            EXTENDED_EVENT_MS / 60_000
        ),
        confidence: 0.8,
        recommendation: "Long-running events usually indicate unresolved stoppages; verify each was closed out"
            .to_string(),
    })
}
