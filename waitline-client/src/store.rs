//! Queue resource store
//!
//! Single source of truth for lanes, per-lane queue entries and connection
//! status. Presentation code reads through the accessors; the notification
//! channel, the poller and staff actions all write through the named
//! actions below, which always fetch-and-replace full server snapshots.
//! Redundant refreshes are therefore wasted work, never correctness bugs.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use shared::{EntryStatus, Lane, QueueEntry};
use tokio::sync::RwLock;

use crate::api::QueueApi;
use crate::error::ClientResult;

/// Connectivity indicator shown by the dashboard
///
/// UI feedback only; data correctness never depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Connected,
    Disconnected,
    /// Evicted by the server's concurrent-connection limit
    Blocked,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Blocked => write!(f, "blocked"),
        }
    }
}

#[derive(Debug, Default)]
struct StoreState {
    lanes: Vec<Lane>,
    closed_lane_ids: HashSet<String>,
    entries: HashMap<String, Vec<QueueEntry>>,
    selected_lane: Option<String>,
    connection: ConnectionState,
    show_closed_lanes: bool,
    /// Monotonic per-lane fetch generation; a response is applied only if
    /// no newer fetch for the same lane was issued while it was in flight.
    entry_fetch_generations: HashMap<String, u64>,
}

/// In-memory store for the staff dashboard's queue state
#[derive(Debug)]
pub struct QueueStore {
    api: Arc<dyn QueueApi>,
    state: RwLock<StoreState>,
}

impl QueueStore {
    pub fn new(api: Arc<dyn QueueApi>) -> Self {
        Self {
            api,
            state: RwLock::new(StoreState::default()),
        }
    }

    // ============ Read accessors ============

    pub async fn lanes(&self) -> Vec<Lane> {
        self.state.read().await.lanes.clone()
    }

    /// Lanes shown in the default view, ordered by sequence
    pub async fn visible_lanes(&self) -> Vec<Lane> {
        let state = self.state.read().await;
        let mut lanes: Vec<Lane> = state
            .lanes
            .iter()
            .filter(|l| state.show_closed_lanes || !state.closed_lane_ids.contains(&l.id))
            .cloned()
            .collect();
        lanes.sort_by_key(|l| l.sequence);
        lanes
    }

    pub async fn entries(&self, lane_id: &str) -> Vec<QueueEntry> {
        self.state
            .read()
            .await
            .entries
            .get(lane_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn selected_lane(&self) -> Option<String> {
        self.state.read().await.selected_lane.clone()
    }

    pub async fn closed_lane_ids(&self) -> HashSet<String> {
        self.state.read().await.closed_lane_ids.clone()
    }

    pub async fn is_lane_closed(&self, lane_id: &str) -> bool {
        self.state.read().await.closed_lane_ids.contains(lane_id)
    }

    pub async fn connection_state(&self) -> ConnectionState {
        self.state.read().await.connection
    }

    pub async fn show_closed_lanes(&self) -> bool {
        self.state.read().await.show_closed_lanes
    }

    pub async fn set_show_closed_lanes(&self, show: bool) {
        self.state.write().await.show_closed_lanes = show;
    }

    pub async fn set_connection_state(&self, next: ConnectionState) {
        let mut state = self.state.write().await;
        if state.connection != next {
            tracing::info!(from = %state.connection, to = %next, "Connection state changed");
            state.connection = next;
        }
    }

    // ============ Refresh actions ============

    /// Fetch the closed-lane set and the lane list, replacing both atomically.
    ///
    /// Read failures are logged and swallowed; the previous snapshot stays
    /// visible. When nothing is selected yet and at least one lane is
    /// visible, the first visible lane is selected and its entries fetched.
    pub async fn fetch_lanes(&self) {
        let closed = match self.api.closed_lanes().await {
            Ok(closed) => closed,
            Err(e) => {
                tracing::warn!("Failed to fetch closed lanes: {e}");
                return;
            }
        };
        let lanes = match self.api.lanes_with_counts().await {
            Ok(lanes) => lanes,
            Err(e) => {
                tracing::warn!("Failed to fetch lane list: {e}");
                return;
            }
        };

        let auto_selected = {
            let mut state = self.state.write().await;
            state.closed_lane_ids = closed.closed_lane_ids.into_iter().collect();
            state.lanes = lanes;

            if state.selected_lane.is_none() {
                let mut candidates: Vec<&Lane> = state
                    .lanes
                    .iter()
                    .filter(|l| {
                        state.show_closed_lanes || !state.closed_lane_ids.contains(&l.id)
                    })
                    .collect();
                candidates.sort_by_key(|l| l.sequence);
                if let Some(first) = candidates.first() {
                    let first_id = first.id.clone();
                    state.selected_lane = Some(first_id.clone());
                    Some(first_id)
                } else {
                    None
                }
            } else {
                None
            }
        };

        if let Some(lane_id) = auto_selected {
            tracing::debug!(lane_id = %lane_id, "Auto-selected first visible lane");
            self.fetch_queue_entries(&lane_id).await;
        }
    }

    /// Fetch the active entries for one lane, replacing its cached list.
    ///
    /// Responses from superseded in-flight fetches are discarded so a slow
    /// earlier request can never overwrite a fresher snapshot.
    pub async fn fetch_queue_entries(&self, lane_id: &str) {
        let generation = {
            let mut state = self.state.write().await;
            let generation = state
                .entry_fetch_generations
                .entry(lane_id.to_string())
                .or_insert(0);
            *generation += 1;
            *generation
        };

        match self.api.queue_entries(lane_id).await {
            Ok(entries) => {
                let mut state = self.state.write().await;
                let latest = state
                    .entry_fetch_generations
                    .get(lane_id)
                    .copied()
                    .unwrap_or(0);
                if latest == generation {
                    state.entries.insert(lane_id.to_string(), entries);
                } else {
                    tracing::debug!(lane_id = %lane_id, "Discarding stale entry fetch response");
                }
            }
            Err(e) => {
                tracing::warn!(lane_id = %lane_id, "Failed to fetch queue entries: {e}");
            }
        }
    }

    /// Select the active lane and fetch its entries
    pub async fn select_lane(&self, lane_id: &str) {
        self.state.write().await.selected_lane = Some(lane_id.to_string());
        self.fetch_queue_entries(lane_id).await;
    }

    /// Full refresh: lanes, then the selected lane's entries.
    ///
    /// Sole integration seam for every trigger source (push notification,
    /// poll token mismatch, manual), so all of them converge on identical
    /// behavior.
    pub async fn refresh_all(&self) {
        self.fetch_lanes().await;
        if let Some(lane_id) = self.selected_lane().await {
            self.fetch_queue_entries(&lane_id).await;
        }
    }

    // ============ Optimistic reordering ============

    /// Move one cached entry within a lane, immediately.
    ///
    /// Bounds-checked; no-op on invalid indices.
    pub async fn reorder_locally(&self, lane_id: &str, from: usize, to: usize) {
        let mut state = self.state.write().await;
        if let Some(list) = state.entries.get_mut(lane_id) {
            if from < list.len() && to < list.len() && from != to {
                let moved = list.remove(from);
                list.insert(to, moved);
            }
        }
    }

    /// Optimistic reorder: apply the move locally, then confirm server-side.
    ///
    /// On failure the error propagates to the caller and the lane is
    /// refetched, discarding the speculative order. Only ordering is ever
    /// optimistic; status and membership always wait for server truth.
    pub async fn reorder(&self, lane_id: &str, from: usize, to: usize) -> ClientResult<()> {
        let Some((entry_a, entry_b)) = ({
            let mut state = self.state.write().await;
            match state.entries.get_mut(lane_id) {
                Some(list) if from < list.len() && to < list.len() && from != to => {
                    let entry_a = list[from].id.clone();
                    let entry_b = list[to].id.clone();
                    let moved = list.remove(from);
                    list.insert(to, moved);
                    Some((entry_a, entry_b))
                }
                _ => None,
            }
        }) else {
            return Ok(());
        };

        if let Err(e) = self.api.swap_order(&entry_a, &entry_b).await {
            tracing::warn!(lane_id = %lane_id, "Reorder rejected, rolling back: {e}");
            self.fetch_queue_entries(lane_id).await;
            return Err(e);
        }
        Ok(())
    }

    // ============ Staff mutations ============

    /// Close a lane and reconcile.
    ///
    /// When the closed lane was selected and closed lanes are hidden, the
    /// selection auto-advances to the next open lane in sequence order
    /// (wrapping), or clears when no open lane remains.
    pub async fn close_lane(&self, lane_id: &str) -> ClientResult<()> {
        if let Err(e) = self.api.close_lane(lane_id).await {
            tracing::warn!(lane_id = %lane_id, "Close lane failed: {e}");
            self.refresh_all().await;
            return Err(e);
        }

        self.fetch_lanes().await;
        self.fetch_queue_entries(lane_id).await;

        let advance_to = {
            let mut state = self.state.write().await;
            // The server-side close may propagate lazily; keep the lane
            // closed locally regardless of what the refetch returned.
            state.closed_lane_ids.insert(lane_id.to_string());

            if state.selected_lane.as_deref() == Some(lane_id) && !state.show_closed_lanes {
                let next = next_open_lane(&state.lanes, &state.closed_lane_ids, lane_id);
                state.selected_lane = next.clone();
                next.map(Advance::To).or(Some(Advance::Cleared))
            } else {
                None
            }
        };

        match advance_to {
            Some(Advance::To(next)) => {
                tracing::debug!(lane_id = %next, "Selection advanced past closed lane");
                self.fetch_queue_entries(&next).await;
            }
            Some(Advance::Cleared) => {
                tracing::debug!("No open lane left, selection cleared");
            }
            None => {}
        }
        Ok(())
    }

    /// Call an entry (status -> called server-side)
    pub async fn call_entry(&self, entry_id: &str) -> ClientResult<()> {
        let lane_id = self.lane_of_entry(entry_id).await;
        if let Err(e) = self.api.call_entry(entry_id).await {
            tracing::warn!(entry_id = %entry_id, "Call entry failed: {e}");
            self.refresh_all().await;
            return Err(e);
        }
        match lane_id {
            Some(lane_id) => self.fetch_queue_entries(&lane_id).await,
            // Entry not in any cached list; reconcile everything.
            None => self.refresh_all().await,
        }
        Ok(())
    }

    /// Transition an entry to a terminal status (attended / cancelled)
    pub async fn update_entry_status(
        &self,
        entry_id: &str,
        status: EntryStatus,
    ) -> ClientResult<()> {
        let lane_id = self.lane_of_entry(entry_id).await;
        if let Err(e) = self.api.update_status(entry_id, status).await {
            tracing::warn!(entry_id = %entry_id, %status, "Status update failed: {e}");
            self.refresh_all().await;
            return Err(e);
        }
        // Terminal transitions change lane counts as well.
        match lane_id {
            Some(lane_id) => {
                self.fetch_lanes().await;
                self.fetch_queue_entries(&lane_id).await;
            }
            None => self.refresh_all().await,
        }
        Ok(())
    }

    /// Move an entry into another lane
    pub async fn move_entry(&self, entry_id: &str, target_lane_id: &str) -> ClientResult<()> {
        let source_lane = self.lane_of_entry(entry_id).await;
        if let Err(e) = self.api.move_entry(entry_id, target_lane_id).await {
            tracing::warn!(entry_id = %entry_id, "Move entry failed: {e}");
            self.refresh_all().await;
            return Err(e);
        }
        self.fetch_lanes().await;
        if let Some(source) = source_lane {
            self.fetch_queue_entries(&source).await;
        }
        self.fetch_queue_entries(target_lane_id).await;
        Ok(())
    }

    /// Insert a placeholder empty-seat entry into a lane
    pub async fn insert_empty_seat(&self, lane_id: &str) -> ClientResult<()> {
        if let Err(e) = self.api.insert_empty_seat(lane_id).await {
            tracing::warn!(lane_id = %lane_id, "Insert empty seat failed: {e}");
            self.refresh_all().await;
            return Err(e);
        }
        self.fetch_lanes().await;
        self.fetch_queue_entries(lane_id).await;
        Ok(())
    }

    // ============ Push-event handlers ============

    /// Mark a lane closed immediately, then reconcile the active lane.
    ///
    /// The follow-up fetch covers push delivery not being instant/complete.
    pub async fn handle_lane_closed(&self, lane_id: &str) {
        let affects_selection = {
            let mut state = self.state.write().await;
            state.closed_lane_ids.insert(lane_id.to_string());
            state.selected_lane.as_deref() == Some(lane_id)
        };
        if affects_selection {
            self.fetch_queue_entries(lane_id).await;
        }
    }

    /// Mark a lane reopened immediately, then reconcile the active lane
    pub async fn handle_lane_reopened(&self, lane_id: &str) {
        let affects_selection = {
            let mut state = self.state.write().await;
            state.closed_lane_ids.remove(lane_id);
            state.selected_lane.as_deref() == Some(lane_id)
        };
        if affects_selection {
            self.fetch_queue_entries(lane_id).await;
        }
    }

    async fn lane_of_entry(&self, entry_id: &str) -> Option<String> {
        let state = self.state.read().await;
        state
            .entries
            .iter()
            .find(|(_, list)| list.iter().any(|e| e.id == entry_id))
            .map(|(lane_id, _)| lane_id.clone())
    }
}

enum Advance {
    To(String),
    Cleared,
}

/// Next open lane after `after` in sequence order, wrapping to the front
fn next_open_lane(
    lanes: &[Lane],
    closed: &HashSet<String>,
    after: &str,
) -> Option<String> {
    let mut ordered: Vec<&Lane> = lanes.iter().collect();
    ordered.sort_by_key(|l| l.sequence);

    let start = ordered.iter().position(|l| l.id == after)?;
    let n = ordered.len();
    for offset in 1..=n {
        let lane = ordered[(start + offset) % n];
        if !closed.contains(&lane.id) {
            return Some(lane.id.clone());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lane(id: &str, sequence: u32) -> Lane {
        Lane {
            id: id.to_string(),
            name: format!("Lane {id}"),
            sequence,
            start_time: "10:00".to_string(),
            end_time: "11:00".to_string(),
            capacity: 10,
            current_count: 0,
            total_count: None,
        }
    }

    #[test]
    fn test_next_open_lane_skips_closed_and_wraps() {
        let lanes = vec![lane("l1", 1), lane("l2", 2), lane("l3", 3)];
        let mut closed = HashSet::new();
        closed.insert("l2".to_string());

        // l1 just closed too
        closed.insert("l1".to_string());
        assert_eq!(
            next_open_lane(&lanes, &closed, "l1").as_deref(),
            Some("l3")
        );

        // wrapping: closing l3 with l1 reopened
        let mut closed = HashSet::new();
        closed.insert("l2".to_string());
        closed.insert("l3".to_string());
        assert_eq!(
            next_open_lane(&lanes, &closed, "l3").as_deref(),
            Some("l1")
        );
    }

    #[test]
    fn test_next_open_lane_none_left() {
        let lanes = vec![lane("l1", 1), lane("l2", 2)];
        let closed: HashSet<String> = ["l1", "l2"].iter().map(|s| s.to_string()).collect();
        assert!(next_open_lane(&lanes, &closed, "l1").is_none());
    }
}
