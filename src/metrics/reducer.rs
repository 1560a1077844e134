//! Per-asset metrics reduction: one chronological forward pass over a single
//! asset's events, pairing each event with its successor to infer durations.

use crate::event::{Event, EventType, ShiftWindow};
use crate::metrics::{availability_pct, AssetMetrics, SHORT_STOP_THRESHOLD_MS};
use chrono::{DateTime, Utc};

/// Effective duration of an event: the reported duration when present and
/// positive, otherwise the gap to the asset's next event (or to shift end
/// for the last event). Negative gaps from out-of-order clocks clamp to 0.
pub fn effective_duration(
    event: &Event,
    next_ts: Option<DateTime<Utc>>,
    shift_end: DateTime<Utc>,
) -> i64 {
    if let Some(d) = event.duration_ms {
        if d > 0 {
            return d;
        }
    }
    let until = next_ts.unwrap_or(shift_end);
    (until - event.timestamp).num_milliseconds().max(0)
}

/// Reduce one asset's events (sorted ascending by timestamp) to metrics.
pub fn reduce_asset(
    asset_id: &str,
    asset_name: Option<String>,
    events: &[Event],
    window: &ShiftWindow,
) -> AssetMetrics {
    let mut m = AssetMetrics::empty(asset_id, asset_name);

    for (i, event) in events.iter().enumerate() {
        let next_ts = events.get(i + 1).map(|e| e.timestamp);
        let duration = effective_duration(event, next_ts, window.end);

        if event.event_type == EventType::MicroStop {
            // Micro-stops are downtime and always count as short stops,
            // whatever their magnitude.
            m.downtime_ms += duration;
            m.stop_count += 1;
            m.short_stop_count += 1;
            m.micro_stop_count += 1;
            record_stop_duration(&mut m, duration);
        } else if event.is_stop() {
            m.downtime_ms += duration;
            m.stop_count += 1;
            if duration < SHORT_STOP_THRESHOLD_MS {
                m.short_stop_count += 1;
            } else {
                m.long_stop_count += 1;
            }
            record_stop_duration(&mut m, duration);
        } else if event.is_run() {
            m.runtime_ms += duration;
        }
        // Alarms, errors and unclassified events carry no time of their own;
        // they only bound the intervals of their neighbors.
    }

    m.availability_pct = availability_pct(m.runtime_ms, m.downtime_ms);
    m
}

fn record_stop_duration(m: &mut AssetMetrics, duration: i64) {
    m.longest_stop_ms = m.longest_stop_ms.max(duration);
    // Incremental running mean over stop durations.
    m.average_stop_ms += (duration as f64 - m.average_stop_ms) / m.stop_count as f64;
}
