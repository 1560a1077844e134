//! Canonical event model: every other module consumes these types and
//! nothing downstream of the normalizer ever sees a raw record.

pub mod normalize;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classified kind of a state-change record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    StateChange,
    Stop,
    MicroStop,
    Alarm,
    Error,
    Other,
}

impl EventType {
    /// Coerce a raw token (any casing, with or without underscores) to a
    /// canonical type. Unrecognized tokens map to `Other` rather than failing.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_uppercase().replace('-', "_").as_str() {
            "STATE_CHANGE" | "STATECHANGE" => EventType::StateChange,
            "STOP" => EventType::Stop,
            "MICRO_STOP" | "MICROSTOP" => EventType::MicroStop,
            "ALARM" => EventType::Alarm,
            "ERROR" | "FAULT" => EventType::Error,
            _ => EventType::Other,
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::StateChange => write!(f, "state_change"),
            EventType::Stop => write!(f, "stop"),
            EventType::MicroStop => write!(f, "micro_stop"),
            EventType::Alarm => write!(f, "alarm"),
            EventType::Error => write!(f, "error"),
            EventType::Other => write!(f, "other"),
        }
    }
}

/// Operational state of an asset, as reported in state-change events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetState {
    Running,
    Stopped,
    Unknown,
}

impl AssetState {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "RUNNING" | "RUN" | "START" | "STARTED" => AssetState::Running,
            "STOPPED" | "STOP" | "DOWN" => AssetState::Stopped,
            _ => AssetState::Unknown,
        }
    }
}

/// A normalized equipment state-change event. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub asset_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: EventType,
    pub previous_state: Option<AssetState>,
    pub new_state: Option<AssetState>,
    /// Explicit duration when the source reported one. Absent means the
    /// duration is inferred from the gap to the asset's next event.
    pub duration_ms: Option<i64>,
    pub stop_reason: Option<String>,
}

impl Event {
    /// True when this event marks the start of a downtime interval, either
    /// as an explicit stop or as a transition into the stopped state.
    pub fn is_stop(&self) -> bool {
        match self.event_type {
            EventType::Stop => true,
            EventType::StateChange => self.new_state == Some(AssetState::Stopped),
            _ => false,
        }
    }

    /// True when this event marks the start of a runtime interval.
    pub fn is_run(&self) -> bool {
        self.event_type == EventType::StateChange && self.new_state == Some(AssetState::Running)
    }
}

/// Roster entry used to cross-reference asset ids in events. Events that
/// reference an id missing from the roster still aggregate under that id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub name: Option<String>,
}

/// The aggregation boundary for one analysis run. Events are assumed to be
/// already scoped to `[start, end]` by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Structural problem with the analysis input. Fatal: `analyze` aborts.
#[derive(Debug, Clone, Error)]
pub enum InputError {
    #[error("shift window ends before it starts ({start} > {end})")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl ShiftWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, InputError> {
        let window = Self { start, end };
        window.validate()?;
        Ok(window)
    }

    pub fn validate(&self) -> Result<(), InputError> {
        if self.end < self.start {
            return Err(InputError::InvalidWindow {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    pub fn duration_ms(&self) -> i64 {
        (self.end - self.start).num_milliseconds().max(0)
    }

    pub fn duration_hours(&self) -> f64 {
        self.duration_ms() as f64 / 3_600_000.0
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts <= self.end
    }
}
