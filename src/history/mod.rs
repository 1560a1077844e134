//! Historical baseline access. The engine never computes or stores history
//! itself; callers inject a provider so tests can pin deterministic values.

use crate::event::ShiftWindow;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Availability statistics from prior shifts. Read-only input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalBaseline {
    pub avg_availability: f64,
    pub availability_std_dev: f64,
}

#[derive(Debug, Clone, Error)]
pub enum BaselineError {
    #[error("baseline lookup failed: {0}")]
    Lookup(String),
}

/// Supplies the historical baseline for a shift window. `Ok(None)` is a
/// fully supported state meaning no comparable history exists.
#[async_trait::async_trait]
pub trait HistoricalBaselineProvider: Send + Sync {
    async fn shift_baseline(
        &self,
        window: &ShiftWindow,
    ) -> Result<Option<HistoricalBaseline>, BaselineError>;
}

/// A provider that always returns the same baseline. Useful for callers
/// that precompute history and for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedBaseline(pub HistoricalBaseline);

#[async_trait::async_trait]
impl HistoricalBaselineProvider for FixedBaseline {
    async fn shift_baseline(
        &self,
        _window: &ShiftWindow,
    ) -> Result<Option<HistoricalBaseline>, BaselineError> {
        Ok(Some(self.0))
    }
}
