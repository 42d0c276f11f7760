//! In-memory ledger manager with failure injection

use anyhow::{bail, Result};
use async_trait::async_trait;
use channeld::ledger::{Ledger, LedgerManager};
use channeld::protos::Block;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

pub struct MockLedger {
    channel_id: String,
    height: u64,
    config_block: Block,
    closed: AtomicBool,
}

impl MockLedger {
    pub fn new(channel_id: &str, height: u64, config_block: Block) -> Self {
        Self {
            channel_id: channel_id.to_string(),
            height,
            config_block,
            closed: AtomicBool::new(false),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Ledger for MockLedger {
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
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct MockLedgerManager {
    ledgers: Mutex<HashMap<String, Arc<MockLedger>>>,
    snapshots: Mutex<HashMap<PathBuf, (String, u64, Block)>>,
    create_error: Mutex<Option<String>>,
    remove_error: Mutex<Option<String>>,
    open_error: Mutex<Option<String>>,
    genesis_gate: Mutex<Option<Arc<Semaphore>>>,
    genesis_waiting: AtomicUsize,
}

impl MockLedgerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a ledger as if it had been created before start-up
    pub fn with_ledger(self, channel_id: &str, height: u64, config_block: Block) -> Self {
        self.ledgers.lock().unwrap().insert(
            channel_id.to_string(),
            Arc::new(MockLedger::new(channel_id, height, config_block)),
        );
        self
    }

    /// Register what `create_from_snapshot` produces for `dir`
    pub fn with_snapshot(self, dir: &Path, channel_id: &str, height: u64, config_block: Block) -> Self {
        self.snapshots.lock().unwrap().insert(
            dir.to_path_buf(),
            (channel_id.to_string(), height, config_block),
        );
        self
    }

    pub fn fail_create(&self, message: &str) {
        *self.create_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_remove(&self, message: &str) {
        *self.remove_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_open(&self, message: &str) {
        *self.open_error.lock().unwrap() = Some(message.to_string());
    }

    /// Park genesis creates until permits are added to the returned gate
    pub fn hold_genesis_creates(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.genesis_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Number of genesis creates that reached the gate
    pub fn genesis_creates_waiting(&self) -> usize {
        self.genesis_waiting.load(Ordering::SeqCst)
    }

    pub fn contains(&self, channel_id: &str) -> bool {
        self.ledgers.lock().unwrap().contains_key(channel_id)
    }

    pub fn ledger(&self, channel_id: &str) -> Option<Arc<MockLedger>> {
        self.ledgers.lock().unwrap().get(channel_id).cloned()
    }

    fn insert(&self, channel_id: &str, height: u64, config_block: Block) -> Result<Arc<dyn Ledger>> {
        if let Some(message) = self.create_error.lock().unwrap().clone() {
            bail!(message);
        }
        let mut ledgers = self.ledgers.lock().unwrap();
        if ledgers.contains_key(channel_id) {
            bail!("ledger [{}] already exists", channel_id);
        }
        let ledger = Arc::new(MockLedger::new(channel_id, height, config_block));
        ledgers.insert(channel_id.to_string(), ledger.clone());
        Ok(ledger)
    }
}

#[async_trait]
impl LedgerManager for MockLedgerManager {
    async fn create_from_genesis_block(
        &self,
        channel_id: &str,
        genesis_block: &Block,
    ) -> Result<Arc<dyn Ledger>> {
        let gate = self.genesis_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            self.genesis_waiting.fetch_add(1, Ordering::SeqCst);
            let _permit = gate.acquire().await?;
        }
        self.insert(channel_id, 1, genesis_block.clone())
    }

    async fn create_from_snapshot(&self, snapshot_dir: &Path) -> Result<(Arc<dyn Ledger>, String)> {
        let snapshot = self.snapshots.lock().unwrap().get(snapshot_dir).cloned();
        let Some((channel_id, height, config_block)) = snapshot else {
            bail!("no snapshot in {}", snapshot_dir.display());
        };
        let ledger = self.insert(&channel_id, height, config_block)?;
        Ok((ledger, channel_id))
    }

    async fn open(&self, channel_id: &str) -> Result<Arc<dyn Ledger>> {
        if let Some(message) = self.open_error.lock().unwrap().clone() {
            bail!(message);
        }
        match self.ledgers.lock().unwrap().get(channel_id) {
            Some(ledger) => Ok(ledger.clone()),
            None => bail!("ledger [{}] does not exist", channel_id),
        }
    }

    async fn ledger_ids(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.ledgers.lock().unwrap().keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn remove_ledger(&self, channel_id: &str) -> Result<()> {
        if let Some(message) = self.remove_error.lock().unwrap().clone() {
            bail!(message);
        }
        match self.ledgers.lock().unwrap().remove(channel_id) {
            Some(_) => Ok(()),
            None => bail!("ledger [{}] does not exist", channel_id),
        }
    }
}
