//! Shared types for the Waitline queue system
//!
//! Wire and domain types used by both the backend and the staff-facing
//! clients: lanes, queue entries, sync status, channel event frames and
//! the standard API response envelope.

pub mod events;
pub mod models;
pub mod response;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use events::ChannelEvent;
pub use models::{ClosedLanes, EntryStatus, Lane, QueueEntry, SyncStatus};
pub use response::ApiResponse;
