//! Lane Model
//!
//! A lane ("class" in-domain) is a time-boxed service slot customers
//! queue into. Counts are server-derived snapshots; clients never compute
//! them locally.

use serde::{Deserialize, Serialize};

/// Lane snapshot with live occupancy counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    pub id: String,
    pub name: String,
    /// Display/sort order among the store's lanes
    pub sequence: u32,
    /// Slot start, "HH:MM"
    pub start_time: String,
    /// Slot end, "HH:MM"
    pub end_time: String,
    pub capacity: u32,
    /// Entries currently waiting or called (server-derived, >= 0)
    pub current_count: u32,
    /// Cumulative entries ever registered into this lane
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u32>,
}
