//! Data models
//!
//! Shared between the backend and the staff-facing clients (via API).
//! All IDs are backend-owned opaque strings.

pub mod entry;
pub mod lane;
pub mod sync;

// Re-exports
pub use entry::*;
pub use lane::*;
pub use sync::*;
