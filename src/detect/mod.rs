//! Anomaly detection: statistical deviation against a historical baseline
//! plus fixed rule-based thresholds.

pub mod rules;
pub mod stats;

use serde::{Deserialize, Serialize};

/// Severity levels for detected anomalies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    AvailabilityDeviation,
    CriticalAssetFailure,
    HighEventFrequency,
    ExtendedDuration,
}

/// A flagged deviation with a recommendation for the operator. Produced,
/// never mutated; duplicates across rules are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub severity: Severity,
    pub description: String,
    pub confidence: f64,
    pub recommendation: String,
}
