//! HTTP request handlers for the participation API.
//!
//! This module is organized by domain:
//! - `channels` - Join, list and remove channels
//! - `common` - Response encoding and error helpers
//! - `snapshots` - Snapshot bootstrap and its status

pub mod channels;
pub mod common;
pub mod snapshots;

// Re-export all public handler functions for convenience
pub use channels::*;
pub use common::{method_not_allowed, not_found};
pub use snapshots::*;
