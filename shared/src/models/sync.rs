// shared/src/models/sync.rs
use serde::{Deserialize, Serialize};

/// Sync status response
///
/// The token is opaque and monotonically changing; clients only ever
/// compare it for inequality against the last observed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub sync_token: String,
}

/// Server-computed set of lanes currently marked closed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClosedLanes {
    pub closed_lane_ids: Vec<String>,
}
