//! Forward-looking insights. A deterministic rule table over the upstream
//! analyses, not a learned model; multiple predictions may co-occur and
//! none suppress others.

use crate::event::{Event, EventType};
use crate::metrics::{AssetMetrics, PerformanceTrend};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Assets below this availability are listed as failure risks.
pub const FAILURE_RISK_AVAILABILITY_PCT: f64 = 70.0;
/// An event pattern repeating more than this often is expected to recur.
pub const RECURRING_FREQUENCY_THRESHOLD: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionKind {
    PerformanceForecast,
    AssetFailureRisk,
    RecurringEvent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub kind: PredictionKind,
    pub timeframe: String,
    pub statement: String,
    pub confidence: f64,
    /// What the statement is grounded on: asset ids, pattern keys, trend.
    pub supporting_refs: Vec<String>,
}

/// A repeated (event type, label) pairing observed within the shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringPattern {
    pub event_type: EventType,
    pub label: String,
    pub occurrences: u32,
}

/// Group events by type and stop reason (falling back to asset id) and keep
/// the pairings that repeat. BTreeMap keeps the output order stable across
/// runs with identical input.
pub fn recurring_patterns(events: &[Event]) -> Vec<RecurringPattern> {
    let mut groups: BTreeMap<(String, String), (EventType, u32)> = BTreeMap::new();
    for event in events {
        let label = event
            .stop_reason
            .clone()
            .unwrap_or_else(|| event.asset_id.clone());
        let entry = groups
            .entry((event.event_type.to_string(), label))
            .or_insert((event.event_type, 0));
        entry.1 += 1;
    }

    groups
        .into_iter()
        .filter(|(_, (_, count))| *count > RECURRING_FREQUENCY_THRESHOLD)
        .map(|((_, label), (event_type, occurrences))| RecurringPattern {
            event_type,
            label,
            occurrences,
        })
        .collect()
}

/// Evaluate the prediction rule table.
pub fn predict(
    trend: PerformanceTrend,
    per_asset: &[AssetMetrics],
    recurring: &[RecurringPattern],
) -> Vec<Prediction> {
    let mut predictions = Vec::new();

    if trend == PerformanceTrend::Declining {
        predictions.push(Prediction {
            kind: PredictionKind::PerformanceForecast,
            timeframe: "next_shift".to_string(),
            statement: "Availability is trending below the historical baseline; expect continued degradation next shift unless the underlying stoppages are addressed"
                .to_string(),
            confidence: 0.7,
            supporting_refs: vec!["trend:declining".to_string()],
        });
    }

    // Rank the weakest assets first so the statement leads with the most
    // urgent one.
    let mut at_risk: Vec<&AssetMetrics> = per_asset
        .iter()
        .filter(|m| m.runtime_ms + m.downtime_ms > 0)
        .filter(|m| m.availability_pct < FAILURE_RISK_AVAILABILITY_PCT)
        .collect();
    at_risk.sort_by(|a, b| {
        a.availability_pct
            .partial_cmp(&b.availability_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    if !at_risk.is_empty() {
        let names: Vec<String> = at_risk.iter().map(|m| m.asset_id.clone()).collect();
        predictions.push(Prediction {
            kind: PredictionKind::AssetFailureRisk,
            timeframe: "next_shift".to_string(),
            statement: format!(
                "{} asset(s) ran below {:.0}% availability and are at elevated failure risk: {}",
                names.len(),
                FAILURE_RISK_AVAILABILITY_PCT,
                names.join(", ")
            ),
            confidence: 0.6,
            supporting_refs: names.iter().map(|n| format!("asset:{n}")).collect(),
        });
    }

    for pattern in recurring {
        predictions.push(Prediction {
            kind: PredictionKind::RecurringEvent,
            timeframe: "next_shift".to_string(),
            statement: format!(
                "'{}' ({}) occurred {} times this shift and is likely to recur",
                pattern.label, pattern.event_type, pattern.occurrences
            ),
            confidence: 0.8,
            supporting_refs: vec![format!("pattern:{}:{}", pattern.event_type, pattern.label)],
        });
    }

    predictions
}
