//! Cross-signal correlation. Per-shift sample sizes are far too small for
//! regression, so this is a deliberate heuristic rule table producing
//! qualitative strength and direction labels.

use crate::detect::stats::Series;
use crate::metrics::{AssetMetrics, ShiftMetrics};
use crate::temporal::{DensityPattern, TemporalPattern};
use serde::{Deserialize, Serialize};

/// Per-asset availability variance below this reads as a uniform fleet.
pub const UNIFORM_DISPERSION_VARIANCE: f64 = 100.0;
/// Variance above this reads as scattered performance across assets.
pub const SCATTERED_DISPERSION_VARIANCE: f64 = 400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    Weak,
    Moderate,
    Strong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationDirection {
    Positive,
    Negative,
    Neutral,
}

/// A qualitative relationship between two observed signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub subject_pair: (String, String),
    pub strength: CorrelationStrength,
    pub direction: Option<CorrelationDirection>,
    pub insight: String,
}

/// Evaluate the correlation rule table for one shift.
pub fn correlate(
    shift: &ShiftMetrics,
    per_asset: &[AssetMetrics],
    temporal: &TemporalPattern,
    event_count: usize,
) -> Vec<Correlation> {
    let mut correlations = vec![volume_vs_availability(event_count, shift.availability_pct)];

    if !per_asset.is_empty() {
        correlations.push(asset_dispersion(per_asset));
    }
    if let Some(c) = clustering_vs_availability(temporal, shift.availability_pct) {
        correlations.push(c);
    }

    correlations
}

fn volume_vs_availability(event_count: usize, availability_pct: f64) -> Correlation {
    let (strength, direction, insight) = if event_count > 10 && availability_pct < 80.0 {
        (
            CorrelationStrength::Strong,
            CorrelationDirection::Negative,
            format!(
                "Heavy event volume ({event_count}) coincided with degraded availability ({availability_pct:.1}%)"
            ),
        )
    } else if event_count < 3 && availability_pct > 90.0 {
        (
            CorrelationStrength::Strong,
            CorrelationDirection::Positive,
            format!(
                "A quiet shift ({event_count} events) held availability at {availability_pct:.1}%"
            ),
        )
    } else {
        (
            CorrelationStrength::Moderate,
            CorrelationDirection::Neutral,
            format!(
                "Event volume ({event_count}) and availability ({availability_pct:.1}%) show no pronounced relationship"
            ),
        )
    };

    Correlation {
        subject_pair: ("event_volume".to_string(), "availability".to_string()),
        strength,
        direction: Some(direction),
        insight,
    }
}

/// Dispersion of per-asset availability: a tight fleet behaves as one
/// machine, a scattered one hides asset-specific problems.
fn asset_dispersion(per_asset: &[AssetMetrics]) -> Correlation {
    let series = Series::new(per_asset.iter().map(|m| m.availability_pct).collect());
    let variance = series.variance();

    let (strength, insight) = if variance < UNIFORM_DISPERSION_VARIANCE {
        (
            CorrelationStrength::Strong,
            format!("Assets performed uniformly (availability variance {variance:.0})"),
        )
    } else if variance > SCATTERED_DISPERSION_VARIANCE {
        (
            CorrelationStrength::Weak,
            format!("Asset performance was scattered (availability variance {variance:.0}); shift totals mask outliers"),
        )
    } else {
        (
            CorrelationStrength::Moderate,
            format!("Asset performance was mixed (availability variance {variance:.0})"),
        )
    };

    Correlation {
        subject_pair: (
            "asset_availability".to_string(),
            "asset_availability".to_string(),
        ),
        strength,
        direction: None,
        insight,
    }
}

fn clustering_vs_availability(
    temporal: &TemporalPattern,
    availability_pct: f64,
) -> Option<Correlation> {
    if temporal.density_pattern != DensityPattern::Clustered || availability_pct >= 80.0 {
        return None;
    }
    let peaks: Vec<String> = temporal
        .peak_periods
        .iter()
        .map(|p| format!("bucket {}", p.bucket))
        .collect();
    Some(Correlation {
        subject_pair: ("event_clustering".to_string(), "availability".to_string()),
        strength: CorrelationStrength::Strong,
        direction: Some(CorrelationDirection::Negative),
        insight: format!(
            "Events clustered in {} while availability fell to {:.1}%; the burst likely drove the loss",
            peaks.join(", "),
            availability_pct
        ),
    })
}
