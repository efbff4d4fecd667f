//! Queue Entry Model

use serde::{Deserialize, Serialize};

/// Lifecycle status of a queue entry
///
/// Transitions are server-confirmed only: waiting -> called -> attended or
/// cancelled. Clients never apply a status change speculatively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Waiting,
    Called,
    Attended,
    Cancelled,
}

impl EntryStatus {
    /// Whether an entry in this status still appears in the active queue view
    pub fn is_active(&self) -> bool {
        matches!(self, EntryStatus::Waiting | EntryStatus::Called)
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryStatus::Waiting => write!(f, "waiting"),
            EntryStatus::Called => write!(f, "called"),
            EntryStatus::Attended => write!(f, "attended"),
            EntryStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// One customer's position in a lane's queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: String,
    /// Customer display name; placeholder entries carry none
    pub name: Option<String>,
    pub phone: String,
    pub lane_id: String,
    /// Order rank within the owning lane
    pub position: u32,
    pub status: EntryStatus,
    /// Registration timestamp (unix millis)
    pub registered_at: i64,
    /// Linked member account, if the customer is registered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revisit_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party_size: Option<u32>,
    /// Placeholder entry reserving a seat with no customer attached
    #[serde(default)]
    pub empty_seat: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_tags() {
        assert_eq!(
            serde_json::to_string(&EntryStatus::Waiting).unwrap(),
            "\"waiting\""
        );
        let parsed: EntryStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, EntryStatus::Cancelled);
    }

    #[test]
    fn test_status_is_active() {
        assert!(EntryStatus::Waiting.is_active());
        assert!(EntryStatus::Called.is_active());
        assert!(!EntryStatus::Attended.is_active());
        assert!(!EntryStatus::Cancelled.is_active());
    }

    #[test]
    fn test_entry_empty_seat_defaults_false() {
        let json = r#"{
            "id": "e1",
            "name": "Kim",
            "phone": "010-1234",
            "lane_id": "l1",
            "position": 0,
            "status": "waiting",
            "registered_at": 1705900000000
        }"#;
        let entry: QueueEntry = serde_json::from_str(json).unwrap();
        assert!(!entry.empty_seat);
        assert!(entry.member_id.is_none());
    }
}
