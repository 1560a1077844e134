//! End-to-end tests over the public `analyze` entry point.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use shiftpulse::analysis::correlation::CorrelationStrength;
use shiftpulse::analysis::prediction::PredictionKind;
use shiftpulse::detect::{AnomalyKind, Severity};
use shiftpulse::history::{BaselineError, FixedBaseline, HistoricalBaselineProvider};
use shiftpulse::temporal::DensityPattern;
use shiftpulse::{
    AnalyticsEngine, Asset, HistoricalBaseline, PerformanceTrend, ShiftWindow,
};
use std::sync::Arc;

fn shift_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 6, 0, 0).unwrap()
}

fn window_8h() -> ShiftWindow {
    ShiftWindow::new(shift_start(), shift_start() + Duration::hours(8)).unwrap()
}

fn roster() -> Vec<Asset> {
    vec![
        Asset {
            id: "press-1".into(),
            name: Some("Hydraulic Press 1".into()),
        },
        Asset {
            id: "mill-2".into(),
            name: Some("CNC Mill 2".into()),
        },
    ]
}

fn raw_event(asset: &str, offset_min: i64, kind: &str, state: Option<&str>) -> Value {
    let mut ev = json!({
        "asset_id": asset,
        "timestamp": (shift_start() + Duration::minutes(offset_min)).to_rfc3339(),
        "event_type": kind,
    });
    if let Some(s) = state {
        ev["new_state"] = json!(s);
    }
    ev
}

/// Provider whose lookups always fail, for the degraded-context path.
struct BrokenProvider;

#[async_trait::async_trait]
impl HistoricalBaselineProvider for BrokenProvider {
    async fn shift_baseline(
        &self,
        _window: &ShiftWindow,
    ) -> Result<Option<HistoricalBaseline>, BaselineError> {
        Err(BaselineError::Lookup("history store unreachable".into()))
    }
}

#[tokio::test]
async fn run_stop_run_shift() {
    // One asset: running from 06:00, a one-hour stop at 11:00, running again
    // from 12:00 until shift end at 14:00.
    let events = vec![
        raw_event("press-1", 0, "STATE_CHANGE", Some("RUNNING")),
        {
            let mut ev = raw_event("press-1", 300, "STATE_CHANGE", Some("STOPPED"));
            ev["duration_ms"] = json!(3_600_000);
            ev
        },
        raw_event("press-1", 360, "STATE_CHANGE", Some("RUNNING")),
    ];

    let result = AnalyticsEngine::new()
        .analyze(window_8h(), &roster(), &events, None)
        .await
        .unwrap();

    let press = result
        .asset_metrics
        .iter()
        .find(|m| m.asset_id == "press-1")
        .unwrap();
    assert_eq!(press.runtime_ms, 7 * 3_600_000);
    assert_eq!(press.downtime_ms, 3_600_000);
    assert_eq!(press.stop_count, 1);
    assert_eq!(press.long_stop_count, 1);
    assert!((press.availability_pct - 87.5).abs() < 1e-9);
    assert_eq!(press.asset_name.as_deref(), Some("Hydraulic Press 1"));

    assert_eq!(result.shift_metrics.total_stops, 1);
    assert_eq!(result.dropped_events, 0);
}

#[tokio::test]
async fn no_baseline_means_no_statistical_anomalies() {
    // An entirely stopped shift is as extreme as availability gets.
    let events = vec![
        raw_event("press-1", 0, "STATE_CHANGE", Some("STOPPED")),
        raw_event("mill-2", 0, "STATE_CHANGE", Some("STOPPED")),
    ];
    let result = AnalyticsEngine::new()
        .analyze(window_8h(), &roster(), &events, None)
        .await
        .unwrap();

    assert!(result
        .anomalies
        .value()
        .iter()
        .all(|a| a.kind != AnomalyKind::AvailabilityDeviation));
    assert_eq!(result.trend, PerformanceTrend::Unknown);
}

#[tokio::test]
async fn density_classification_through_the_pipeline() {
    // 12 events spread evenly over the shift: uniform.
    let spread: Vec<Value> = (0..12)
        .map(|i| raw_event("press-1", i * 40, "ALARM", None))
        .collect();
    let engine = AnalyticsEngine::new();
    let result = engine
        .analyze(window_8h(), &roster(), &spread, None)
        .await
        .unwrap();
    assert_eq!(
        result.temporal.value().density_pattern,
        DensityPattern::Uniform
    );

    // The same 12 events packed into one bucket: clustered.
    let burst: Vec<Value> = (0..12)
        .map(|i| raw_event("press-1", 10 + i, "ALARM", None))
        .collect();
    let result = engine
        .analyze(window_8h(), &roster(), &burst, None)
        .await
        .unwrap();
    assert_eq!(
        result.temporal.value().density_pattern,
        DensityPattern::Clustered
    );
    assert_eq!(result.temporal.value().bucket_counts.iter().sum::<u32>(), 12);
}

#[tokio::test]
async fn critical_asset_flags_one_high_anomaly() {
    // mill-2 runs at 42%: 4.2h runtime, 5.8h downtime by explicit durations.
    let events = vec![
        {
            let mut ev = raw_event("mill-2", 0, "STATE_CHANGE", Some("RUNNING"));
            ev["duration_ms"] = json!(15_120_000);
            ev
        },
        {
            let mut ev = raw_event("mill-2", 252, "STATE_CHANGE", Some("STOPPED"));
            ev["duration_ms"] = json!(20_880_000);
            ev
        },
    ];
    let result = AnalyticsEngine::new()
        .analyze(window_8h(), &roster(), &events, None)
        .await
        .unwrap();

    let critical: Vec<_> = result
        .anomalies
        .value()
        .iter()
        .filter(|a| a.kind == AnomalyKind::CriticalAssetFailure)
        .collect();
    assert_eq!(critical.len(), 1);
    assert_eq!(critical[0].severity, Severity::High);
    assert_eq!(critical[0].confidence, 0.9);
    assert!(critical[0].description.contains("mill-2"));

    // 42% availability also puts mill-2 on the failure-risk list.
    assert!(result
        .predictions
        .value()
        .iter()
        .any(|p| p.kind == PredictionKind::AssetFailureRisk
            && p.supporting_refs.contains(&"asset:mill-2".to_string())));
}

#[tokio::test]
async fn empty_events_is_valid_not_an_error() {
    let engine = AnalyticsEngine::new();
    let empty = engine
        .analyze(window_8h(), &roster(), &[], None)
        .await
        .unwrap();

    for m in &empty.asset_metrics {
        assert_eq!(m.runtime_ms, 0);
        assert_eq!(m.stop_count, 0);
        assert_eq!(m.availability_pct, 0.0);
    }
    assert_eq!(empty.shift_metrics.total_stops, 0);
    assert_eq!(empty.temporal.value().density_pattern, DensityPattern::NoEvents);

    // Fewer completeness credits than the same shift with events.
    let with_events = engine
        .analyze(
            window_8h(),
            &roster(),
            &[raw_event("press-1", 10, "ALARM", None)],
            None,
        )
        .await
        .unwrap();
    assert!(empty.confidence_score < with_events.confidence_score);
    assert!(empty.confidence_score > 0.0);
}

#[tokio::test]
async fn reversed_window_is_a_fatal_input_error() {
    let window = ShiftWindow {
        start: shift_start(),
        end: shift_start() - Duration::hours(1),
    };
    let result = AnalyticsEngine::new()
        .analyze(window, &roster(), &[], None)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn analyze_is_idempotent() {
    let events = vec![
        raw_event("press-1", 0, "STATE_CHANGE", Some("RUNNING")),
        raw_event("press-1", 120, "STOP", None),
        raw_event("press-1", 130, "STATE_CHANGE", Some("RUNNING")),
        raw_event("mill-2", 0, "STATE_CHANGE", Some("RUNNING")),
        raw_event("mill-2", 240, "MICRO_STOP", None),
    ];
    let provider = Arc::new(FixedBaseline(HistoricalBaseline {
        avg_availability: 90.0,
        availability_std_dev: 2.0,
    }));
    let engine = AnalyticsEngine::with_baseline_provider(provider);

    let first = engine
        .analyze(window_8h(), &roster(), &events, None)
        .await
        .unwrap();
    let second = engine
        .analyze(window_8h(), &roster(), &events, None)
        .await
        .unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn stop_split_and_totals_hold_for_mixed_traffic() {
    let mut events = vec![
        raw_event("press-1", 0, "STATE_CHANGE", Some("RUNNING")),
        raw_event("mill-2", 0, "STATE_CHANGE", Some("RUNNING")),
    ];
    // Short stops on press-1, a long one on mill-2, micro-stops on both.
    for i in 0..3 {
        let mut ev = raw_event("press-1", 60 + i * 30, "STOP", None);
        ev["duration_ms"] = json!(120_000);
        events.push(ev);
    }
    let mut long_stop = raw_event("mill-2", 180, "STOP", None);
    long_stop["duration_ms"] = json!(2_400_000);
    events.push(long_stop);
    events.push(raw_event("press-1", 300, "MICRO_STOP", None));
    events.push(raw_event("mill-2", 320, "MICRO_STOP", None));

    let result = AnalyticsEngine::new()
        .analyze(window_8h(), &roster(), &events, None)
        .await
        .unwrap();

    let per_asset_stops: u32 = result.asset_metrics.iter().map(|m| m.stop_count).sum();
    assert_eq!(result.shift_metrics.total_stops, per_asset_stops);
    for m in &result.asset_metrics {
        assert_eq!(m.short_stop_count + m.long_stop_count, m.stop_count);
        assert!((0.0..=100.0).contains(&m.availability_pct));
        assert!(m.availability_pct.is_finite());
    }
    assert!((0.0..=100.0).contains(&result.shift_metrics.availability_pct));
    assert!((0.0..=100.0).contains(&result.shift_metrics.oee_pct));
    assert!((0.0..=1.0).contains(&result.confidence_score));
    assert!(result.shift_metrics.mtbf_ms.is_some());
    assert!(result.shift_metrics.mttr_ms.is_some());
}

#[tokio::test]
async fn baseline_deviation_drives_trend_and_forecast() {
    // Historical average 95% with tight spread; this shift runs at 50%.
    let provider = Arc::new(FixedBaseline(HistoricalBaseline {
        avg_availability: 95.0,
        availability_std_dev: 2.0,
    }));
    let engine = AnalyticsEngine::with_baseline_provider(provider);

    let events = vec![
        {
            let mut ev = raw_event("press-1", 0, "STATE_CHANGE", Some("RUNNING"));
            ev["duration_ms"] = json!(4 * 3_600_000);
            ev
        },
        {
            let mut ev = raw_event("press-1", 240, "STATE_CHANGE", Some("STOPPED"));
            ev["duration_ms"] = json!(4 * 3_600_000);
            ev
        },
    ];
    let result = engine
        .analyze(window_8h(), &roster(), &events, None)
        .await
        .unwrap();

    let deviation = result
        .anomalies
        .value()
        .iter()
        .find(|a| a.kind == AnomalyKind::AvailabilityDeviation)
        .expect("45-point deviation must be flagged");
    assert_eq!(deviation.severity, Severity::High);
    assert_eq!(deviation.confidence, 1.0);

    assert_eq!(result.trend, PerformanceTrend::Declining);
    assert!(result
        .predictions
        .value()
        .iter()
        .any(|p| p.kind == PredictionKind::PerformanceForecast && p.confidence == 0.7));
}

#[tokio::test]
async fn broken_provider_degrades_context_not_the_result() {
    let engine = AnalyticsEngine::with_baseline_provider(Arc::new(BrokenProvider));
    let events = vec![raw_event("press-1", 0, "STATE_CHANGE", Some("RUNNING"))];
    let result = engine
        .analyze(window_8h(), &roster(), &events, None)
        .await
        .unwrap();

    assert_eq!(result.trend, PerformanceTrend::Unknown);
    assert!(result
        .warnings
        .iter()
        .any(|w| w.section == "historical_context"));
    assert!(result
        .anomalies
        .value()
        .iter()
        .all(|a| a.kind != AnomalyKind::AvailabilityDeviation));
    // The rest of the result is fully computed, not degraded.
    assert!(!result.anomalies.is_degraded());
    assert!(!result.correlations.is_degraded());
}

#[tokio::test]
async fn malformed_events_are_dropped_and_counted() {
    let events = vec![
        raw_event("press-1", 0, "STATE_CHANGE", Some("RUNNING")),
        json!({ "timestamp": "2025-06-01T07:00:00Z" }), // no asset id
        json!({ "machine_id": "press-1" }),             // no timestamp
    ];
    let result = AnalyticsEngine::new()
        .analyze(window_8h(), &roster(), &events, None)
        .await
        .unwrap();
    assert_eq!(result.dropped_events, 2);
    assert_eq!(result.asset_metrics.len(), 2);
}

#[tokio::test]
async fn unknown_asset_ids_still_aggregate() {
    let events = vec![
        raw_event("ghost-9", 0, "STATE_CHANGE", Some("RUNNING")),
        raw_event("ghost-9", 240, "STOP", None),
    ];
    let result = AnalyticsEngine::new()
        .analyze(window_8h(), &roster(), &events, None)
        .await
        .unwrap();
    let ghost = result
        .asset_metrics
        .iter()
        .find(|m| m.asset_id == "ghost-9")
        .unwrap();
    assert_eq!(ghost.asset_name, None);
    assert_eq!(ghost.stop_count, 1);
}

#[tokio::test]
async fn quiet_healthy_shift_correlates_strong_positive() {
    let events = vec![raw_event("press-1", 0, "STATE_CHANGE", Some("RUNNING"))];
    let result = AnalyticsEngine::new()
        .analyze(window_8h(), &[roster()[0].clone()], &events, None)
        .await
        .unwrap();
    let volume = result
        .correlations
        .value()
        .iter()
        .find(|c| c.subject_pair.0 == "event_volume")
        .unwrap();
    assert_eq!(volume.strength, CorrelationStrength::Strong);
}

#[tokio::test]
async fn result_serializes_to_json() {
    let events = vec![
        raw_event("press-1", 0, "STATE_CHANGE", Some("RUNNING")),
        raw_event("press-1", 60, "STOP", None),
    ];
    let result = AnalyticsEngine::new()
        .analyze(window_8h(), &roster(), &events, None)
        .await
        .unwrap();
    let serialized = serde_json::to_string(&result).unwrap();
    assert!(serialized.contains("\"confidence_score\""));
    assert!(serialized.contains("\"status\":\"full\""));
}
