//! Queue API abstraction
//!
//! The store and poller talk to the backend through this trait so tests can
//! substitute an in-memory implementation for the real HTTP client.

use async_trait::async_trait;
use shared::{ClosedLanes, EntryStatus, Lane, QueueEntry, SyncStatus};

use crate::error::ClientResult;

/// Backend read/mutation surface consumed by the synchronization subsystem
#[async_trait]
pub trait QueueApi: Send + Sync + std::fmt::Debug {
    /// GET closed-lanes
    async fn closed_lanes(&self) -> ClientResult<ClosedLanes>;

    /// GET lanes-with-counts
    async fn lanes_with_counts(&self) -> ClientResult<Vec<Lane>>;

    /// GET queue-entries?status=waiting,called&lane_id=...
    ///
    /// Returns the ordered active entries for one lane.
    async fn queue_entries(&self, lane_id: &str) -> ClientResult<Vec<QueueEntry>>;

    /// PUT reorder-swap/{a}/{b} - mutate relative order of two entries
    async fn swap_order(&self, entry_a: &str, entry_b: &str) -> ClientResult<()>;

    /// POST close-lane
    async fn close_lane(&self, lane_id: &str) -> ClientResult<()>;

    /// Call an entry (status -> called, server-side)
    async fn call_entry(&self, entry_id: &str) -> ClientResult<()>;

    /// Transition an entry to a terminal status (attended / cancelled)
    async fn update_status(&self, entry_id: &str, status: EntryStatus) -> ClientResult<()>;

    /// Move an entry into another lane
    async fn move_entry(&self, entry_id: &str, target_lane_id: &str) -> ClientResult<()>;

    /// Insert a placeholder empty-seat entry into a lane
    async fn insert_empty_seat(&self, lane_id: &str) -> ClientResult<()>;

    /// GET sync-token/{tenant_id}
    async fn sync_status(&self, tenant_id: &str) -> ClientResult<SyncStatus>;
}
