//! Recorded session model.
//!
//! A recording is a log of timestamped events ordered by timestamp. On disk
//! it is a JSON array:
//!
//! ```json
//! [
//!   { "timestamp": 1700000000000, "type": "meta", "href": "https://example.com", "width": 1280, "height": 720 },
//!   { "timestamp": 1700000000005, "type": "full_snapshot" },
//!   { "timestamp": 1700000000900, "type": "incremental_snapshot", "source": "mouse_move" },
//!   { "timestamp": 1700000001200, "type": "custom", "tag": "checkout", "payload": { "step": 2 } }
//! ]
//! ```

use crate::RecordingError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What changed in an incremental snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncrementalSource {
    Mutation,
    MouseMove,
    MouseInteraction,
    Scroll,
    ViewportResize,
    Input,
    TouchMove,
    MediaInteraction,
    StyleSheetRule,
    CanvasMutation,
    Font,
    Log,
    Drag,
    StyleDeclaration,
    Selection,
    AdoptedStyleSheet,
}

impl IncrementalSource {
    /// Whether the change was caused directly by the user.
    ///
    /// Only pointer, scroll, resize and input changes count; DOM mutations and
    /// the sources after `Input` do not keep a session "active".
    pub fn is_user_interaction(self) -> bool {
        matches!(
            self,
            IncrementalSource::MouseMove
                | IncrementalSource::MouseInteraction
                | IncrementalSource::Scroll
                | IncrementalSource::ViewportResize
                | IncrementalSource::Input
        )
    }
}

/// Kind of a recorded event, with its kind-specific data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    DomContentLoaded,
    Load,
    FullSnapshot,
    IncrementalSnapshot {
        source: IncrementalSource,
    },
    Meta {
        #[serde(default)]
        href: String,
        #[serde(default)]
        width: u32,
        #[serde(default)]
        height: u32,
    },
    /// Application-defined marker
    Custom {
        tag: String,
        #[serde(default)]
        payload: serde_json::Value,
    },
    Plugin {
        plugin: String,
        #[serde(default)]
        payload: serde_json::Value,
    },
}

/// An event with its absolute timestamp (milliseconds).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordedEvent {
    pub timestamp: u64,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl RecordedEvent {
    pub fn new(timestamp: u64, kind: EventKind) -> Self {
        Self { timestamp, kind }
    }

    /// Custom event carrying `tag` and no payload.
    pub fn custom(timestamp: u64, tag: impl Into<String>) -> Self {
        Self::new(
            timestamp,
            EventKind::Custom {
                tag: tag.into(),
                payload: serde_json::Value::Null,
            },
        )
    }

    /// Incremental snapshot from `source`.
    pub fn incremental(timestamp: u64, source: IncrementalSource) -> Self {
        Self::new(timestamp, EventKind::IncrementalSnapshot { source })
    }

    /// Tag of a custom event.
    pub fn custom_tag(&self) -> Option<&str> {
        match &self.kind {
            EventKind::Custom { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self.kind, EventKind::Custom { .. })
    }

    pub fn is_user_interaction(&self) -> bool {
        match self.kind {
            EventKind::IncrementalSnapshot { source } => source.is_user_interaction(),
            _ => false,
        }
    }
}

/// Time span covered by a recording, in milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReplayMetadata {
    pub start_time: u64,
    pub end_time: u64,
    pub total_time: u64,
}

/// An ordered log of recorded events.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recording {
    events: Vec<RecordedEvent>,
}

impl Recording {
    /// Create a recording, ordering events by timestamp.
    ///
    /// The sort is stable so events sharing a timestamp keep their order.
    pub fn new(mut events: Vec<RecordedEvent>) -> Self {
        events.sort_by_key(|e| e.timestamp);
        Self { events }
    }

    pub fn from_json(json: &str) -> Result<Self, RecordingError> {
        let events: Vec<RecordedEvent> = serde_json::from_str(json)?;
        Ok(Self::new(events))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RecordingError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, RecordingError> {
        Ok(serde_json::to_string_pretty(&self.events)?)
    }

    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Insert an event after every event with the same or an earlier
    /// timestamp. Returns the index it landed at.
    pub fn push(&mut self, event: RecordedEvent) -> usize {
        let index = self
            .events
            .partition_point(|e| e.timestamp <= event.timestamp);
        self.events.insert(index, event);
        index
    }

    pub fn metadata(&self) -> ReplayMetadata {
        let start_time = self.events.first().map(|e| e.timestamp).unwrap_or_default();
        let end_time = self.events.last().map(|e| e.timestamp).unwrap_or_default();
        ReplayMetadata {
            start_time,
            end_time,
            total_time: end_time.saturating_sub(start_time),
        }
    }

    /// Custom events in log order.
    pub fn custom_events(&self) -> impl Iterator<Item = &RecordedEvent> {
        self.events.iter().filter(|e| e.is_custom())
    }
}
