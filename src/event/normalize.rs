//! Boundary adapter from raw event records to the canonical [`Event`] shape.
//!
//! Sources disagree on field names (`asset_id` vs `machine_id`, RFC 3339
//! strings vs epoch millis), so extraction runs through fixed-priority alias
//! tables here, once, and nothing downstream ever re-probes raw records.

use crate::event::{AssetState, Event, EventType};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Accepted aliases for the asset id, highest priority first.
const ASSET_ID_KEYS: &[&str] = &["asset_id", "assetId", "machine_id", "equipment_id", "asset"];
const TIMESTAMP_KEYS: &[&str] = &["timestamp", "ts", "time", "occurred_at"];
const EVENT_TYPE_KEYS: &[&str] = &["event_type", "eventType", "type"];
const PREV_STATE_KEYS: &[&str] = &["previous_state", "previousState", "from_state"];
const NEW_STATE_KEYS: &[&str] = &["new_state", "newState", "to_state", "state"];
const DURATION_KEYS: &[&str] = &["duration_ms", "durationMs", "duration"];
const STOP_REASON_KEYS: &[&str] = &["stop_reason", "stopReason", "reason"];

/// A malformed individual event. Recorded and skipped; never aborts a batch.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("event #{index} has no asset id")]
    MissingAssetId { index: usize },
    #[error("event #{index} has no timestamp")]
    MissingTimestamp { index: usize },
    #[error("event #{index} has an unparseable timestamp: {raw}")]
    UnparseableTimestamp { index: usize, raw: String },
}

/// Outcome of normalizing one raw batch: canonical events in chronological
/// order plus the records that had to be dropped.
#[derive(Debug, Default)]
pub struct NormalizedBatch {
    pub events: Vec<Event>,
    pub dropped: Vec<ValidationError>,
}

/// Validate and coerce a raw event list. Partial tolerance: records missing
/// an asset id or timestamp are dropped with the error recorded, and the
/// rest of the batch goes through.
pub fn normalize(raw: &[Value]) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();

    for (index, record) in raw.iter().enumerate() {
        let Some(asset_id) = first_string(record, ASSET_ID_KEYS) else {
            batch.dropped.push(ValidationError::MissingAssetId { index });
            continue;
        };

        let timestamp = match first_value(record, TIMESTAMP_KEYS) {
            None => {
                batch.dropped.push(ValidationError::MissingTimestamp { index });
                continue;
            }
            Some(v) => match parse_timestamp(v) {
                Some(ts) => ts,
                None => {
                    batch.dropped.push(ValidationError::UnparseableTimestamp {
                        index,
                        raw: v.to_string(),
                    });
                    continue;
                }
            },
        };

        let event_type = first_string(record, EVENT_TYPE_KEYS)
            .map(|s| EventType::parse(&s))
            .unwrap_or(EventType::Other);

        // Non-positive reported durations are meaningless; clear them so the
        // reducer falls back to gap inference.
        let duration_ms = first_value(record, DURATION_KEYS)
            .and_then(as_millis)
            .filter(|&d| d > 0);

        batch.events.push(Event {
            asset_id,
            timestamp,
            event_type,
            previous_state: first_string(record, PREV_STATE_KEYS)
                .map(|s| AssetState::parse(&s)),
            new_state: first_string(record, NEW_STATE_KEYS).map(|s| AssetState::parse(&s)),
            duration_ms,
            stop_reason: first_string(record, STOP_REASON_KEYS),
        });
    }

    // Chronological order is the contract every consumer relies on; asset id
    // breaks ties so the output is stable for identical inputs.
    batch
        .events
        .sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.asset_id.cmp(&b.asset_id)));

    if !batch.dropped.is_empty() {
        warn!(
            dropped = batch.dropped.len(),
            total = raw.len(),
            "Dropped malformed events during normalization"
        );
    }

    batch
}

fn first_value<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|k| record.get(k))
        .filter(|v| !v.is_null())
}

fn first_string(record: &Value, keys: &[&str]) -> Option<String> {
    let v = first_value(record, keys)?;
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Timestamps arrive as RFC 3339 strings or epoch milliseconds.
fn parse_timestamp(v: &Value) -> Option<DateTime<Utc>> {
    match v {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            Utc.timestamp_millis_opt(millis).single()
        }
        _ => None,
    }
}

fn as_millis(v: &Value) -> Option<i64> {
    v.as_i64().or_else(|| v.as_f64().map(|f| f as i64))
}
