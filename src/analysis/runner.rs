//! The analytics orchestrator: runs the independent analyses concurrently,
//! joins them, feeds the dependent stages, and assembles one immutable
//! [`AnalysisResult`].

use crate::analysis::{
    confidence, correlation, prediction, AnalysisResult, SectionWarning, Sectioned,
};
use crate::detect::rules::{self, DetectionInput};
use crate::event::normalize;
use crate::event::{Asset, Event, InputError, ShiftWindow};
use crate::history::HistoricalBaselineProvider;
use crate::metrics::aggregate::{aggregate_shift, classify_trend};
use crate::metrics::reducer::reduce_asset;
use crate::metrics::{AssetMetrics, OeeInputs};
use crate::temporal;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// The engine's sole entry point. Holds only the injected baseline
/// provider; every `analyze` call is a pure function of its inputs.
#[derive(Default)]
pub struct AnalyticsEngine {
    baseline_provider: Option<Arc<dyn HistoricalBaselineProvider>>,
}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_baseline_provider(provider: Arc<dyn HistoricalBaselineProvider>) -> Self {
        Self {
            baseline_provider: Some(provider),
        }
    }

    /// Run the full analysis for one shift.
    ///
    /// Fails only on a structurally invalid window. Malformed individual
    /// events are dropped and counted; a failed sub-analysis degrades to its
    /// placeholder with a warning instead of failing the call. An empty
    /// event list is a valid input, not an error.
    pub async fn analyze(
        &self,
        window: ShiftWindow,
        assets: &[Asset],
        raw_events: &[Value],
        oee: Option<OeeInputs>,
    ) -> Result<AnalysisResult, InputError> {
        window.validate()?;
        let oee = oee.unwrap_or_default();

        let batch = normalize::normalize(raw_events);
        let events = batch.events;

        info!(
            events = events.len(),
            dropped = batch.dropped.len(),
            assets = assets.len(),
            shift_hours = window.duration_hours(),
            "Starting shift analysis"
        );

        // Fan out the four independent analyses; none reads another's output.
        let metrics_task = async {
            let per_asset = reduce_all_assets(&events, assets, &window);
            let shift = aggregate_shift(&per_asset, &oee);
            (per_asset, shift)
        };
        let temporal_task = async { temporal::analyze(&events, &window) };
        let profile_task = async { prediction::recurring_patterns(&events) };
        let baseline_task = async {
            match &self.baseline_provider {
                Some(provider) => provider.shift_baseline(&window).await,
                None => Ok(None),
            }
        };

        let ((per_asset, shift), temporal_pattern, recurring, baseline_outcome) =
            tokio::join!(metrics_task, temporal_task, profile_task, baseline_task);

        let mut warnings = Vec::new();

        let baseline = match baseline_outcome {
            Ok(baseline) => baseline,
            Err(e) => {
                let reason = e.to_string();
                warn!(%reason, "Historical baseline lookup failed; continuing without it");
                warnings.push(SectionWarning {
                    section: "historical_context".to_string(),
                    reason,
                });
                None
            }
        };

        let trend = classify_trend(shift.availability_pct, baseline.as_ref());

        // Dependent stages. Each one degrades to its placeholder on failure
        // rather than failing the whole call.
        let anomalies = run_section("anomaly_detection", &mut warnings, || {
            Ok(rules::run(&DetectionInput {
                shift: &shift,
                per_asset: &per_asset,
                events: &events,
                window: &window,
                baseline: baseline.as_ref(),
            }))
        });
        let correlations = run_section("correlation", &mut warnings, || {
            Ok(correlation::correlate(
                &shift,
                &per_asset,
                &temporal_pattern,
                events.len(),
            ))
        });
        let predictions = run_section("prediction", &mut warnings, || {
            Ok(prediction::predict(trend, &per_asset, &recurring))
        });

        let confidence_score = confidence::score(&confidence::ConfidenceInputs {
            shift_present: window.duration_ms() > 0,
            metrics_present: true,
            assets_present: !assets.is_empty(),
            events_present: !events.is_empty(),
            event_count: events.len(),
            shift_duration_hours: window.duration_hours(),
        });

        Ok(AnalysisResult {
            window,
            asset_metrics: per_asset,
            shift_metrics: shift,
            trend,
            temporal: Sectioned::Full {
                value: temporal_pattern,
            },
            anomalies,
            correlations,
            predictions,
            confidence_score,
            dropped_events: batch.dropped.len(),
            warnings,
        })
    }
}

/// Group normalized events per asset (roster assets with no events
/// included) and reduce each group. BTreeMap fixes the output order.
fn reduce_all_assets(
    events: &[Event],
    assets: &[Asset],
    window: &ShiftWindow,
) -> Vec<AssetMetrics> {
    let roster: BTreeMap<&str, Option<String>> = assets
        .iter()
        .map(|a| (a.id.as_str(), a.name.clone()))
        .collect();

    let mut by_asset: BTreeMap<String, Vec<Event>> = BTreeMap::new();
    for asset in assets {
        by_asset.entry(asset.id.clone()).or_default();
    }
    for event in events {
        by_asset
            .entry(event.asset_id.clone())
            .or_default()
            .push(event.clone());
    }

    by_asset
        .into_iter()
        .map(|(asset_id, asset_events)| {
            let name = roster.get(asset_id.as_str()).cloned().flatten();
            reduce_asset(&asset_id, name, &asset_events, window)
        })
        .collect()
}

fn run_section<T: Default>(
    section: &str,
    warnings: &mut Vec<SectionWarning>,
    f: impl FnOnce() -> anyhow::Result<T>,
) -> Sectioned<T> {
    match f() {
        Ok(value) => Sectioned::Full { value },
        Err(e) => {
            warn!(section, error = %e, "Sub-analysis failed; substituting placeholder");
            warnings.push(SectionWarning {
                section: section.to_string(),
                reason: format!("{e:#}"),
            });
            Sectioned::Degraded {
                value: T::default(),
                reason: format!("{e:#}"),
            }
        }
    }
}
