//! Change-notification event types
//!
//! Frames delivered over the long-lived notification stream between the
//! backend and staff clients. Every frame is a JSON object
//! `{"event": "...", "data": {...}}`; the `data` payload is advisory only.
//! Receivers treat each frame as a hint to re-fetch, never as authoritative
//! state.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw wire frame as sent by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventFrame {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl EventFrame {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: None,
        }
    }

    pub fn with_data(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data: Some(data),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Decoded channel event
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// Keep-alive, no-op
    Ping,
    /// A new entrant registered into a lane
    EntryCreated,
    /// An entry's status changed (called / attended / cancelled)
    StatusChanged,
    /// Entries within a lane were reordered
    OrderChanged,
    /// An entry moved between lanes
    LaneMoved,
    /// A placeholder empty-seat entry was inserted
    EmptySeatInserted,
    /// A batch attendance operation completed
    BatchAttended,
    /// A lane was marked closed
    LaneClosed { lane_id: Option<String> },
    /// A closed lane was reopened
    LaneReopened { lane_id: Option<String> },
    /// This client was evicted by the server's concurrent-connection limit
    Evicted,
    /// Unrecognized event tag, ignored by receivers
    Unknown(String),
}

impl ChannelEvent {
    /// Whether this event indicates a queue mutation worth a refresh
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            ChannelEvent::EntryCreated
                | ChannelEvent::StatusChanged
                | ChannelEvent::OrderChanged
                | ChannelEvent::LaneMoved
                | ChannelEvent::EmptySeatInserted
                | ChannelEvent::BatchAttended
                | ChannelEvent::LaneClosed { .. }
                | ChannelEvent::LaneReopened { .. }
        )
    }
}

fn lane_id_from(data: &Option<Value>) -> Option<String> {
    data.as_ref()
        .and_then(|d| d.get("lane_id"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

impl From<EventFrame> for ChannelEvent {
    fn from(frame: EventFrame) -> Self {
        match frame.event.as_str() {
            "ping" => ChannelEvent::Ping,
            "entry_created" => ChannelEvent::EntryCreated,
            "status_changed" => ChannelEvent::StatusChanged,
            "order_changed" => ChannelEvent::OrderChanged,
            "lane_moved" => ChannelEvent::LaneMoved,
            "empty_seat_inserted" => ChannelEvent::EmptySeatInserted,
            "batch_attended" => ChannelEvent::BatchAttended,
            "lane_closed" => ChannelEvent::LaneClosed {
                lane_id: lane_id_from(&frame.data),
            },
            "lane_reopened" => ChannelEvent::LaneReopened {
                lane_id: lane_id_from(&frame.data),
            },
            "evicted" => ChannelEvent::Evicted,
            other => ChannelEvent::Unknown(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_frame() {
        let frame = EventFrame::from_json(r#"{"event":"ping"}"#).unwrap();
        let event = ChannelEvent::from(frame);
        assert_eq!(event, ChannelEvent::Ping);
        assert!(!event.is_mutation());
    }

    #[test]
    fn test_lane_closed_carries_lane_id() {
        let frame =
            EventFrame::from_json(r#"{"event":"lane_closed","data":{"lane_id":"l-3"}}"#).unwrap();
        match ChannelEvent::from(frame) {
            ChannelEvent::LaneClosed { lane_id } => assert_eq!(lane_id.as_deref(), Some("l-3")),
            other => panic!("expected LaneClosed, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_event_tag() {
        let frame = EventFrame::from_json(r#"{"event":"printer_jam"}"#).unwrap();
        let event = ChannelEvent::from(frame);
        assert_eq!(event, ChannelEvent::Unknown("printer_jam".to_string()));
        assert!(!event.is_mutation());
    }

    #[test]
    fn test_mutation_events() {
        for tag in [
            "entry_created",
            "status_changed",
            "order_changed",
            "lane_moved",
            "empty_seat_inserted",
            "batch_attended",
        ] {
            let event = ChannelEvent::from(EventFrame::new(tag));
            assert!(event.is_mutation(), "{tag} should be a mutation event");
        }
    }
}
