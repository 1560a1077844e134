//! ShiftPulse -- Shift performance analytics for equipment event streams.
//!
//! This crate reduces a time-ordered stream of equipment state-change events
//! for one operational shift into quantitative metrics (runtime, downtime,
//! availability, OEE) and higher-level insights: temporal patterns, anomaly
//! detection, cross-signal correlation, and forward-looking predictions.
//! It performs no I/O of its own; persistence, transport, scheduling and
//! report rendering belong to the callers that feed it.

pub mod analysis;
pub mod detect;
pub mod event;
pub mod history;
pub mod metrics;
pub mod temporal;

pub use analysis::runner::AnalyticsEngine;
pub use analysis::{AnalysisResult, SectionWarning, Sectioned};
pub use event::{Asset, Event, EventType, InputError, ShiftWindow};
pub use history::{HistoricalBaseline, HistoricalBaselineProvider};
pub use metrics::{AssetMetrics, OeeInputs, PerformanceTrend, ShiftMetrics};
