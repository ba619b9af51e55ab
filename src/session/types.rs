// Session counting types

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which independent sensor produced a rep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepSource {
    /// Camera path: classifier stream through the rep detector
    Camera,

    /// Wearable path: signals pushed by the external device
    External,
}

impl RepSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepSource::Camera => "camera",
            RepSource::External => "external",
        }
    }
}

/// One counted repetition. Emitted by the rep detector or the external
/// listener and consumed exactly once by the session aggregator.
#[derive(Debug, Clone)]
pub struct RepEvent {
    pub id: Uuid,
    pub source: RepSource,
    pub at: Instant,
}

impl RepEvent {
    pub fn new(source: RepSource, at: Instant) -> Self {
        RepEvent {
            id: Uuid::new_v4(),
            source,
            at,
        }
    }
}

/// How target completion combines the two counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionPolicy {
    /// Sum of both counters (the additive total the wearable deployment uses)
    #[default]
    Sum,

    /// Camera counter alone
    Camera,

    /// External counter alone
    External,
}

/// Read-only view of the session counters
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub camera_count: u64,
    pub external_count: u64,

    /// Conservative fused estimate: min of the two counters. Recomputed on
    /// every snapshot, never stored.
    pub weighted: u64,

    /// True once the configured target has been reached this session
    pub completed: bool,

    /// Bumped by every reset; lets detector loops notice stale armed state
    pub epoch: u64,

    pub started_at: DateTime<Utc>,
    pub last_camera_event: Option<DateTime<Utc>>,
    pub last_external_event: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rep_event_carries_source() {
        let e = RepEvent::new(RepSource::Camera, Instant::now());
        assert_eq!(e.source, RepSource::Camera);

        let e2 = RepEvent::new(RepSource::External, Instant::now());
        assert_ne!(e.id, e2.id);
    }

    #[test]
    fn test_completion_policy_serde_names() {
        let p: CompletionPolicy = serde_json::from_str("\"sum\"").unwrap();
        assert_eq!(p, CompletionPolicy::Sum);
        let p: CompletionPolicy = serde_json::from_str("\"camera\"").unwrap();
        assert_eq!(p, CompletionPolicy::Camera);
    }
}
