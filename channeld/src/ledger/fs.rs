//! Directory-per-channel ledger manager
//!
//! Layout under the root directory:
//!
//! ```text
//! <root>/<channel_id>/ledger.json        metadata (snapshot base height)
//! <root>/<channel_id>/config.block       latest config block
//! <root>/<channel_id>/blocks/NNNNNNNNNN.block
//! ```
//!
//! A ledger is assembled in its own `<root>/_creating_<channel_id>.<n>`
//! directory and renamed into place once complete, so a crash never leaves a
//! half-written ledger that `ledger_ids` would pick up. The rename fails if
//! another create installed the same channel first.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use prost::Message;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

use super::{Ledger, LedgerManager};
use crate::configblock;
use crate::constants::ledger_files;
use crate::protos::Block;

const CREATING_PREFIX: &str = "_creating_";

/// Metadata a snapshot generator writes next to the snapshot files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub channel_name: String,
    pub last_block_number: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LedgerMetadata {
    channel_id: String,
    /// Height covered by the snapshot the ledger was bootstrapped from
    #[serde(default)]
    snapshot_height: Option<u64>,
}

pub struct FileLedger {
    channel_id: String,
    height: u64,
    config_block: Block,
    closed: AtomicBool,
}

impl Ledger for FileLedger {
    fn channel_id(&self) -> &str {
        &self.channel_id
    }

    fn height(&self) -> u64 {
        self.height
    }

    fn config_block(&self) -> &Block {
        &self.config_block
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            debug!("Closed ledger {}", self.channel_id);
        }
    }
}

pub struct FileLedgerManager {
    root_dir: PathBuf,
    staging_seq: AtomicU64,
}

impl FileLedgerManager {
    pub async fn new(root_dir: impl Into<PathBuf>) -> Result<Self> {
        let root_dir = root_dir.into();
        fs::create_dir_all(&root_dir)
            .await
            .with_context(|| format!("creating ledger root {}", root_dir.display()))?;
        remove_stale_staging(&root_dir).await?;
        Ok(Self {
            root_dir,
            staging_seq: AtomicU64::new(0),
        })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn ledger_dir(&self, channel_id: &str) -> PathBuf {
        self.root_dir.join(channel_id)
    }

    fn staging_dir(&self, channel_id: &str) -> PathBuf {
        let seq = self.staging_seq.fetch_add(1, Ordering::SeqCst);
        self.root_dir
            .join(format!("{}{}.{}", CREATING_PREFIX, channel_id, seq))
    }

    async fn ensure_absent(&self, channel_id: &str) -> Result<()> {
        if fs::try_exists(self.ledger_dir(channel_id)).await? {
            bail!("ledger [{}] already exists", channel_id);
        }
        Ok(())
    }

    /// Write a complete ledger into a staging directory then move it into place
    async fn install(
        &self,
        metadata: &LedgerMetadata,
        config_block: &Block,
        genesis_block: Option<&Block>,
    ) -> Result<()> {
        let staging = self.staging_dir(&metadata.channel_id);
        let result = self
            .stage_and_rename(&staging, metadata, config_block, genesis_block)
            .await;
        if result.is_err() && fs::try_exists(&staging).await.unwrap_or(false) {
            if let Err(e) = fs::remove_dir_all(&staging).await {
                warn!("Failed to remove staging directory {}: {}", staging.display(), e);
            }
        }
        result
    }

    async fn stage_and_rename(
        &self,
        staging: &Path,
        metadata: &LedgerMetadata,
        config_block: &Block,
        genesis_block: Option<&Block>,
    ) -> Result<()> {
        let channel_id = &metadata.channel_id;
        let blocks_dir = staging.join(ledger_files::BLOCKS_DIR);
        fs::create_dir_all(&blocks_dir).await?;

        if let Some(block) = genesis_block {
            fs::write(
                blocks_dir.join(ledger_files::block_file(0)),
                block.encode_to_vec(),
            )
            .await?;
        }
        fs::write(
            staging.join(ledger_files::CONFIG_BLOCK),
            config_block.encode_to_vec(),
        )
        .await?;
        fs::write(
            staging.join(ledger_files::LEDGER_METADATA),
            serde_json::to_vec_pretty(metadata)?,
        )
        .await?;

        // A concurrent create of the same channel may have won the race
        self.ensure_absent(channel_id).await?;
        fs::rename(staging, self.ledger_dir(channel_id))
            .await
            .with_context(|| format!("installing ledger [{}]", channel_id))?;
        Ok(())
    }

    async fn load(&self, channel_id: &str) -> Result<FileLedger> {
        let dir = self.ledger_dir(channel_id);
        if !fs::try_exists(&dir).await? {
            bail!("ledger [{}] does not exist", channel_id);
        }

        let metadata: LedgerMetadata = serde_json::from_slice(
            &fs::read(dir.join(ledger_files::LEDGER_METADATA))
                .await
                .with_context(|| format!("reading metadata of ledger [{}]", channel_id))?,
        )?;

        let config_bytes = fs::read(dir.join(ledger_files::CONFIG_BLOCK))
            .await
            .with_context(|| format!("reading config block of ledger [{}]", channel_id))?;
        let config_block = configblock::unmarshal_block(&config_bytes)
            .map_err(|e| anyhow!("ledger [{}] config block: {}", channel_id, e))?;

        let block_count = count_blocks(&dir.join(ledger_files::BLOCKS_DIR)).await?;
        let height = metadata.snapshot_height.unwrap_or(0) + block_count;

        Ok(FileLedger {
            channel_id: metadata.channel_id,
            height,
            config_block,
            closed: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl LedgerManager for FileLedgerManager {
    async fn create_from_genesis_block(
        &self,
        channel_id: &str,
        genesis_block: &Block,
    ) -> Result<Arc<dyn Ledger>> {
        self.ensure_absent(channel_id).await?;

        let metadata = LedgerMetadata {
            channel_id: channel_id.to_string(),
            snapshot_height: None,
        };
        self.install(&metadata, genesis_block, Some(genesis_block))
            .await?;

        info!("Created ledger [{}] from genesis block", channel_id);
        Ok(Arc::new(self.load(channel_id).await?))
    }

    async fn create_from_snapshot(&self, snapshot_dir: &Path) -> Result<(Arc<dyn Ledger>, String)> {
        let metadata_path = snapshot_dir.join(ledger_files::SNAPSHOT_METADATA);
        let snapshot: SnapshotMetadata = serde_json::from_slice(
            &fs::read(&metadata_path)
                .await
                .with_context(|| format!("reading {}", metadata_path.display()))?,
        )
        .with_context(|| format!("parsing {}", metadata_path.display()))?;

        let config_bytes = fs::read(snapshot_dir.join(ledger_files::CONFIG_BLOCK))
            .await
            .with_context(|| format!("reading config block from {}", snapshot_dir.display()))?;
        let validated =
            configblock::validate_config_block(&config_bytes, Some(&snapshot.channel_name))
                .map_err(|e| anyhow!("snapshot config block: {}", e))?;

        let channel_id = validated.channel_id;
        self.ensure_absent(&channel_id).await?;

        let metadata = LedgerMetadata {
            channel_id: channel_id.clone(),
            snapshot_height: Some(snapshot.last_block_number + 1),
        };
        self.install(&metadata, &validated.block, None).await?;

        info!(
            "Created ledger [{}] from snapshot {} at height {}",
            channel_id,
            snapshot_dir.display(),
            snapshot.last_block_number + 1
        );
        let ledger: Arc<dyn Ledger> = Arc::new(self.load(&channel_id).await?);
        Ok((ledger, channel_id))
    }

    async fn open(&self, channel_id: &str) -> Result<Arc<dyn Ledger>> {
        Ok(Arc::new(self.load(channel_id).await?))
    }

    async fn ledger_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let mut entries = fs::read_dir(&self.root_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if configblock::validate_channel_id(&name).is_err() {
                continue;
            }
            if fs::try_exists(entry.path().join(ledger_files::LEDGER_METADATA)).await? {
                ids.push(name);
            }
        }
        ids.sort();
        Ok(ids)
    }

    async fn remove_ledger(&self, channel_id: &str) -> Result<()> {
        let dir = self.ledger_dir(channel_id);
        if !fs::try_exists(&dir).await? {
            bail!("ledger [{}] does not exist", channel_id);
        }
        fs::remove_dir_all(&dir)
            .await
            .with_context(|| format!("removing ledger [{}]", channel_id))?;
        info!("Removed ledger [{}]", channel_id);
        Ok(())
    }
}

/// Staging directories left behind by a crash
async fn remove_stale_staging(root_dir: &Path) -> Result<()> {
    let mut entries = fs::read_dir(root_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_name().to_string_lossy().starts_with(CREATING_PREFIX) {
            warn!("Removing stale staging directory {}", entry.path().display());
            fs::remove_dir_all(entry.path()).await?;
        }
    }
    Ok(())
}

async fn count_blocks(blocks_dir: &Path) -> Result<u64> {
    let mut count = 0;
    let mut entries = fs::read_dir(blocks_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_name().to_string_lossy().ends_with(".block") {
            count += 1;
        }
    }
    Ok(count)
}
