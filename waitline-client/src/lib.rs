//! Waitline Client - synchronization subsystem for the staff dashboard
//!
//! Keeps a staff-facing queue view consistent with server-side queue state
//! under concurrent mutation and unreliable transports. Server push events
//! and a polling fallback both funnel into the same idempotent store
//! refresh actions; drag-and-drop reordering is applied optimistically and
//! rolled back by refetch on failure.

pub mod api;
pub mod channel;
pub mod config;
pub mod error;
pub mod http;
pub mod poller;
pub mod store;
pub mod tenant;

pub use api::QueueApi;
pub use channel::{NotificationChannel, transport::EventTransport};
pub use config::{ClientConfig, ClientRole};
pub use error::{ClientError, ClientResult};
pub use http::HttpQueueApi;
pub use poller::SyncPoller;
pub use store::{ConnectionState, QueueStore};
pub use tenant::TenantResolver;

// Re-export shared types for convenience
pub use shared::{ChannelEvent, ClosedLanes, EntryStatus, Lane, QueueEntry, SyncStatus};
