//! Ledger collaborator interfaces
//!
//! The lifecycle manager only ever creates, opens, measures, closes and
//! removes ledgers; how blocks are stored is the ledger manager's business.
//! [`FileLedgerManager`] is the directory-per-channel implementation the
//! node binary runs with.

pub mod fs;

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::protos::Block;

pub use fs::{FileLedgerManager, SnapshotMetadata};

/// An open channel ledger
pub trait Ledger: Send + Sync {
    fn channel_id(&self) -> &str;

    /// Number of blocks committed, including those covered by a snapshot
    fn height(&self) -> u64;

    /// Latest config block known to the ledger
    fn config_block(&self) -> &Block;

    fn close(&self);
}

#[async_trait]
pub trait LedgerManager: Send + Sync {
    /// Materialize a new ledger whose first block is `genesis_block`
    async fn create_from_genesis_block(
        &self,
        channel_id: &str,
        genesis_block: &Block,
    ) -> Result<Arc<dyn Ledger>>;

    /// Materialize a new ledger from a snapshot, returning it with its channel id
    async fn create_from_snapshot(&self, snapshot_dir: &Path) -> Result<(Arc<dyn Ledger>, String)>;

    async fn open(&self, channel_id: &str) -> Result<Arc<dyn Ledger>>;

    async fn ledger_ids(&self) -> Result<Vec<String>>;

    async fn remove_ledger(&self, channel_id: &str) -> Result<()>;
}
