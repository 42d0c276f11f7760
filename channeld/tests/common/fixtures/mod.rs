//! This module provides reusable test utilities:
//! - Config block builders and snapshot directories
//! - In-memory ledger manager and membership with failure injection
//! - A scriptable `ChannelManagement` for gateway tests
//! - Common test data

// Allow unused code in test fixtures - not every test binary uses every helper
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_channels;
pub mod mock_ledger;
pub mod mock_membership;
pub mod test_data;

// Re-export commonly used items
pub use mock_channels::MockChannelManagement;
pub use mock_ledger::{MockLedger, MockLedgerManager};
pub use mock_membership::RecordingMembership;
pub use test_data::*;
