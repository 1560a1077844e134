//! Higher-level analytics over the reduced metrics: correlations,
//! predictions, confidence scoring, and the orchestrator that assembles a
//! single [`AnalysisResult`].

pub mod confidence;
pub mod correlation;
pub mod prediction;
pub mod runner;

use crate::detect::Anomaly;
use crate::event::ShiftWindow;
use crate::metrics::{AssetMetrics, PerformanceTrend, ShiftMetrics};
use crate::temporal::TemporalPattern;
use self::correlation::Correlation;
use self::prediction::Prediction;
use serde::{Deserialize, Serialize};

/// A section of the result that may have been produced by a fallback path.
/// Callers can tell a fully computed section from a degraded placeholder
/// without digging through logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Sectioned<T> {
    Full { value: T },
    Degraded { value: T, reason: String },
}

impl<T> Sectioned<T> {
    pub fn value(&self) -> &T {
        match self {
            Sectioned::Full { value } => value,
            Sectioned::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Sectioned::Degraded { .. })
    }
}

/// A sub-analysis that fell back to its placeholder, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionWarning {
    pub section: String,
    pub reason: String,
}

/// The complete, immutable output of one `analyze` call. Plain data with no
/// behavior, ready for serialization into a report or store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub window: ShiftWindow,
    pub asset_metrics: Vec<AssetMetrics>,
    pub shift_metrics: ShiftMetrics,
    pub trend: PerformanceTrend,
    pub temporal: Sectioned<TemporalPattern>,
    pub anomalies: Sectioned<Vec<Anomaly>>,
    pub correlations: Sectioned<Vec<Correlation>>,
    pub predictions: Sectioned<Vec<Prediction>>,
    /// Overall trust in this result, in `[0, 1]`.
    pub confidence_score: f64,
    /// Raw records dropped by the normalizer for missing required fields.
    pub dropped_events: usize,
    pub warnings: Vec<SectionWarning>,
}
