//! In-memory backend used by the integration tests
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use shared::{ClosedLanes, EntryStatus, Lane, QueueEntry, SyncStatus};
use waitline_client::{ClientError, ClientResult, QueueApi};

pub fn lane(id: &str, sequence: u32) -> Lane {
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

pub fn entry(id: &str, lane_id: &str, position: u32) -> QueueEntry {
    QueueEntry {
        id: id.to_string(),
        name: Some(format!("Customer {id}")),
        phone: "010-0000-0000".to_string(),
        lane_id: lane_id.to_string(),
        position,
        status: EntryStatus::Waiting,
        registered_at: 1705900000000,
        member_id: None,
        revisit_count: None,
        party_size: None,
        empty_seat: false,
    }
}

/// Scriptable in-memory backend
#[derive(Debug, Default)]
pub struct MockApi {
    pub lanes: Mutex<Vec<Lane>>,
    pub closed: Mutex<Vec<String>>,
    pub entries: Mutex<HashMap<String, Vec<QueueEntry>>>,
    pub token: Mutex<String>,
    pub fail_swap: AtomicBool,
    pub fail_close: AtomicBool,
    pub fail_entries: AtomicBool,
    pub fail_sync: AtomicBool,
    pub lane_fetches: AtomicUsize,
    pub entry_fetches: AtomicUsize,
    /// Per-call artificial latency applied to the next entry fetches
    pub entry_delays: Mutex<VecDeque<Duration>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_lanes(&self, lanes: Vec<Lane>) {
        *self.lanes.lock().unwrap() = lanes;
    }

    pub fn set_closed(&self, closed: &[&str]) {
        *self.closed.lock().unwrap() = closed.iter().map(|s| s.to_string()).collect();
    }

    pub fn set_entries(&self, lane_id: &str, entries: Vec<QueueEntry>) {
        self.entries
            .lock()
            .unwrap()
            .insert(lane_id.to_string(), entries);
    }

    pub fn set_token(&self, token: &str) {
        *self.token.lock().unwrap() = token.to_string();
    }

    pub fn lane_fetches(&self) -> usize {
        self.lane_fetches.load(Ordering::SeqCst)
    }

    pub fn entry_fetches(&self) -> usize {
        self.entry_fetches.load(Ordering::SeqCst)
    }

    pub fn entry_ids(&self, lane_id: &str) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .get(lane_id)
            .map(|list| list.iter().map(|e| e.id.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl QueueApi for MockApi {
    async fn closed_lanes(&self) -> ClientResult<ClosedLanes> {
        Ok(ClosedLanes {
            closed_lane_ids: self.closed.lock().unwrap().clone(),
        })
    }

    async fn lanes_with_counts(&self) -> ClientResult<Vec<Lane>> {
        self.lane_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.lanes.lock().unwrap().clone())
    }

    async fn queue_entries(&self, lane_id: &str) -> ClientResult<Vec<QueueEntry>> {
        self.entry_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_entries.load(Ordering::SeqCst) {
            return Err(ClientError::Internal("entries unavailable".to_string()));
        }
        let delay = self.entry_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(lane_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn swap_order(&self, entry_a: &str, entry_b: &str) -> ClientResult<()> {
        if self.fail_swap.load(Ordering::SeqCst) {
            return Err(ClientError::Internal("reorder rejected".to_string()));
        }
        let mut entries = self.entries.lock().unwrap();
        for list in entries.values_mut() {
            let from = list.iter().position(|e| e.id == entry_a);
            let to = list.iter().position(|e| e.id == entry_b);
            if let (Some(from), Some(to)) = (from, to) {
                let moved = list.remove(from);
                list.insert(to, moved);
                return Ok(());
            }
        }
        Err(ClientError::NotFound("entry pair".to_string()))
    }

    async fn close_lane(&self, lane_id: &str) -> ClientResult<()> {
        if self.fail_close.load(Ordering::SeqCst) {
            return Err(ClientError::Internal("close rejected".to_string()));
        }
        let mut closed = self.closed.lock().unwrap();
        if !closed.iter().any(|id| id == lane_id) {
            closed.push(lane_id.to_string());
        }
        Ok(())
    }

    async fn call_entry(&self, entry_id: &str) -> ClientResult<()> {
        let mut entries = self.entries.lock().unwrap();
        for list in entries.values_mut() {
            if let Some(e) = list.iter_mut().find(|e| e.id == entry_id) {
                e.status = EntryStatus::Called;
                return Ok(());
            }
        }
        Err(ClientError::NotFound(entry_id.to_string()))
    }

    async fn update_status(&self, entry_id: &str, status: EntryStatus) -> ClientResult<()> {
        let mut entries = self.entries.lock().unwrap();
        for list in entries.values_mut() {
            if let Some(pos) = list.iter().position(|e| e.id == entry_id) {
                if status.is_active() {
                    list[pos].status = status;
                } else {
                    // Terminal entries leave the active view.
                    list.remove(pos);
                }
                return Ok(());
            }
        }
        Err(ClientError::NotFound(entry_id.to_string()))
    }

    async fn move_entry(&self, entry_id: &str, target_lane_id: &str) -> ClientResult<()> {
        let mut entries = self.entries.lock().unwrap();
        let mut moved = None;
        for list in entries.values_mut() {
            if let Some(pos) = list.iter().position(|e| e.id == entry_id) {
                moved = Some(list.remove(pos));
                break;
            }
        }
        let Some(mut moved) = moved else {
            return Err(ClientError::NotFound(entry_id.to_string()));
        };
        moved.lane_id = target_lane_id.to_string();
        entries
            .entry(target_lane_id.to_string())
            .or_default()
            .push(moved);
        Ok(())
    }

    async fn insert_empty_seat(&self, lane_id: &str) -> ClientResult<()> {
        let mut entries = self.entries.lock().unwrap();
        let list = entries.entry(lane_id.to_string()).or_default();
        let mut seat = entry(&format!("seat-{}", list.len()), lane_id, list.len() as u32);
        seat.name = None;
        seat.empty_seat = true;
        list.push(seat);
        Ok(())
    }

    async fn sync_status(&self, _tenant_id: &str) -> ClientResult<SyncStatus> {
        if self.fail_sync.load(Ordering::SeqCst) {
            return Err(ClientError::Internal("sync status unavailable".to_string()));
        }
        Ok(SyncStatus {
            sync_token: self.token.lock().unwrap().clone(),
        })
    }
}
