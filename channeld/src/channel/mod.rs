//! Channel lifecycle management
//!
//! The [`ChannelManager`] owns the set of channels this node hosts. Channels
//! are created from a genesis config block or bootstrapped from a snapshot,
//! and can be removed again. At most one snapshot bootstrap runs at a time;
//! its progress is visible through [`ChannelManager::bootstrap_status`].
//!
//! All bookkeeping lives behind a single lock, which is never held across
//! ledger or membership calls. A channel is visible before its creation
//! callback runs; for a snapshot bootstrap the status only clears after the
//! callback has returned.

pub mod runtime;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

use crate::configblock::{self, ConfigBlock};
use crate::errors::{ChannelError, ParticipationError};
use crate::ledger::{Ledger, LedgerManager};
use crate::membership::MembershipSupport;
use crate::policy::PolicyManager;
use crate::protos::Block;
use crate::types::{BootstrapStatus, ChannelInfo, ChannelInfoShort, ChannelList};

pub use runtime::{ChannelRuntime, ChannelSource};

/// Invoked once per channel after it is materialized
pub type ChannelCreatedCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Operations the participation gateway needs from the node
#[async_trait]
pub trait ChannelManagement: Send + Sync {
    async fn channel_list(&self) -> ChannelList;

    async fn channel_info(&self, channel_id: &str) -> Result<ChannelInfo, ParticipationError>;

    async fn join_channel(&self, config_block: ConfigBlock)
        -> Result<ChannelInfo, ParticipationError>;

    async fn remove_channel(&self, channel_id: &str) -> Result<(), ParticipationError>;

    async fn join_by_snapshot(&self, snapshot_dir: &Path)
        -> Result<BootstrapStatus, ParticipationError>;

    async fn join_by_snapshot_status(&self) -> BootstrapStatus;
}

#[derive(Default)]
struct ManagerState {
    channels: HashMap<String, Arc<ChannelRuntime>>,
    /// Channels whose ledger is being created; value is the system-channel flag
    creating: HashMap<String, bool>,
    bootstrap: BootstrapStatus,
    bootstrap_started_at: Option<DateTime<Utc>>,
}

impl ManagerState {
    fn reserve(&mut self, channel_id: &str, is_system_channel: bool) -> Result<(), ChannelError> {
        if self.channels.contains_key(channel_id) || self.creating.contains_key(channel_id) {
            return Err(ChannelError::AlreadyExists);
        }

        let system_channel_present = self.channels.values().any(|c| c.is_system_channel())
            || self.creating.values().any(|is_system| *is_system);
        if system_channel_present {
            return Err(ChannelError::SystemChannelExists);
        }
        if is_system_channel && (!self.channels.is_empty() || !self.creating.is_empty()) {
            return Err(ChannelError::AppChannelsExist);
        }

        self.creating.insert(channel_id.to_string(), is_system_channel);
        Ok(())
    }
}

#[derive(Clone)]
pub struct ChannelManager {
    ledger_manager: Arc<dyn LedgerManager>,
    membership: Arc<dyn MembershipSupport>,
    on_channel_created: ChannelCreatedCallback,
    state: Arc<RwLock<ManagerState>>,
}

impl ChannelManager {
    pub fn new(
        ledger_manager: Arc<dyn LedgerManager>,
        membership: Arc<dyn MembershipSupport>,
        on_channel_created: ChannelCreatedCallback,
    ) -> Self {
        Self {
            ledger_manager,
            membership,
            on_channel_created,
            state: Arc::new(RwLock::new(ManagerState::default())),
        }
    }

    /// Host every ledger that already exists on disk. Returns how many were recovered.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<usize, ParticipationError> {
        let ledger_ids = self
            .ledger_manager
            .ledger_ids()
            .await
            .map_err(ledger_error)?;

        let mut recovered = 0;
        for channel_id in ledger_ids {
            match self.recover_channel(&channel_id).await {
                Ok(()) => recovered += 1,
                Err(e) => error!("Failed to recover channel {}: {}", channel_id, e),
            }
        }

        info!("Recovered {} existing channel(s)", recovered);
        Ok(recovered)
    }

    async fn recover_channel(&self, channel_id: &str) -> Result<(), ParticipationError> {
        let ledger = self
            .ledger_manager
            .open(channel_id)
            .await
            .map_err(ledger_error)?;
        let config = configblock::config_from_block(ledger.config_block())?;
        let is_system_channel = configblock::is_system_channel_config(&config);

        self.state
            .write()
            .await
            .reserve(channel_id, is_system_channel)?;

        let runtime = match self
            .materialize(
                channel_id,
                ledger.clone(),
                PolicyManager::from_config(&config),
                is_system_channel,
                ChannelSource::Recovered,
            )
            .await
        {
            Ok(runtime) => runtime,
            Err(e) => {
                ledger.close();
                self.release(channel_id).await;
                return Err(e);
            }
        };

        self.commit(runtime).await;
        self.notify_created(channel_id).await;
        Ok(())
    }

    /// Create a channel whose ledger starts at `block`
    #[instrument(skip(self, block), fields(channel = %channel_id))]
    pub async fn create_from_genesis_block(
        &self,
        channel_id: &str,
        block: Block,
    ) -> Result<Arc<ChannelRuntime>, ParticipationError> {
        let config_block = configblock::validate_block(block, Some(channel_id))?;
        self.create_from_config_block(config_block).await
    }

    async fn create_from_config_block(
        &self,
        config_block: ConfigBlock,
    ) -> Result<Arc<ChannelRuntime>, ParticipationError> {
        let channel_id = config_block.channel_id.clone();
        self.state
            .write()
            .await
            .reserve(&channel_id, config_block.is_system_channel)?;

        let ledger = match self
            .ledger_manager
            .create_from_genesis_block(&channel_id, &config_block.block)
            .await
        {
            Ok(ledger) => ledger,
            Err(e) => {
                self.release(&channel_id).await;
                return Err(ledger_error(e));
            }
        };

        let runtime = match self
            .materialize(
                &channel_id,
                ledger.clone(),
                PolicyManager::from_config(&config_block.config),
                config_block.is_system_channel,
                ChannelSource::GenesisBlock,
            )
            .await
        {
            Ok(runtime) => runtime,
            Err(e) => {
                self.abandon(&channel_id, &ledger).await;
                return Err(e);
            }
        };

        self.commit(runtime.clone()).await;
        info!(
            "Joined channel {} at height {} (system channel: {})",
            channel_id,
            runtime.height(),
            runtime.is_system_channel()
        );
        self.notify_created(&channel_id).await;
        Ok(runtime)
    }

    /// Start bootstrapping a channel from `snapshot_dir` in the background
    #[instrument(skip(self), fields(snapshot = %snapshot_dir.display()))]
    pub async fn create_from_snapshot(
        &self,
        snapshot_dir: &Path,
    ) -> Result<BootstrapStatus, ParticipationError> {
        let snapshot_display = snapshot_dir.display().to_string();
        if let Some(running) = self.running_bootstrap().await {
            return Err(ChannelError::BootstrapInProgress {
                snapshot_dir: running,
            }
            .into());
        }

        match fs::metadata(snapshot_dir).await {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => {
                return Err(ChannelError::InvalidSnapshot {
                    snapshot_dir: snapshot_display,
                    reason: "not a directory".to_string(),
                }
                .into())
            }
            Err(e) => {
                return Err(ChannelError::InvalidSnapshot {
                    snapshot_dir: snapshot_display,
                    reason: e.to_string(),
                }
                .into())
            }
        }

        // Another call may have started while the directory was inspected
        let status = {
            let mut state = self.state.write().await;
            if state.bootstrap.in_progress {
                return Err(ChannelError::BootstrapInProgress {
                    snapshot_dir: state.bootstrap.bootstrapping_snapshot_dir.clone(),
                }
                .into());
            }
            state.bootstrap = BootstrapStatus {
                in_progress: true,
                bootstrapping_snapshot_dir: snapshot_display.clone(),
            };
            state.bootstrap_started_at = Some(Utc::now());
            state.bootstrap.clone()
        };

        info!("Starting snapshot bootstrap from {}", snapshot_display);
        let manager = self.clone();
        let snapshot_dir = snapshot_dir.to_path_buf();
        tokio::spawn(async move {
            manager.run_snapshot_bootstrap(snapshot_dir).await;
        });

        Ok(status)
    }

    async fn run_snapshot_bootstrap(&self, snapshot_dir: PathBuf) {
        let result = self.bootstrap_from_snapshot(&snapshot_dir).await;

        let mut state = self.state.write().await;
        let elapsed = state
            .bootstrap_started_at
            .take()
            .map(|started| Utc::now().signed_duration_since(started).num_seconds())
            .unwrap_or(0);
        state.bootstrap = BootstrapStatus::default();
        drop(state);

        match result {
            Ok(runtime) => info!(
                "Bootstrapped channel {} from {} at height {} in {}s",
                runtime.channel_id(),
                snapshot_dir.display(),
                runtime.height(),
                elapsed
            ),
            Err(e) => error!(
                "Snapshot bootstrap from {} failed after {}s: {}",
                snapshot_dir.display(),
                elapsed,
                e
            ),
        }
    }

    /// Materialize the snapshot ledger, host the channel and run the creation
    /// callback. The bootstrap status stays in progress throughout.
    async fn bootstrap_from_snapshot(
        &self,
        snapshot_dir: &Path,
    ) -> Result<Arc<ChannelRuntime>, ParticipationError> {
        let (ledger, channel_id) = self
            .ledger_manager
            .create_from_snapshot(snapshot_dir)
            .await
            .map_err(ledger_error)?;

        // The ledger manager never creates over an existing ledger, so this
        // one belongs to this call.
        let config = match configblock::config_from_block(ledger.config_block()) {
            Ok(config) => config,
            Err(e) => {
                self.discard_ledger(&channel_id, &ledger).await;
                return Err(e.into());
            }
        };
        let is_system_channel = configblock::is_system_channel_config(&config);

        let reserved = self
            .state
            .write()
            .await
            .reserve(&channel_id, is_system_channel);
        if let Err(e) = reserved {
            self.discard_ledger(&channel_id, &ledger).await;
            return Err(e.into());
        }

        let runtime = match self
            .materialize(
                &channel_id,
                ledger.clone(),
                PolicyManager::from_config(&config),
                is_system_channel,
                ChannelSource::Snapshot {
                    snapshot_dir: snapshot_dir.display().to_string(),
                },
            )
            .await
        {
            Ok(runtime) => runtime,
            Err(e) => {
                self.abandon(&channel_id, &ledger).await;
                return Err(e);
            }
        };

        self.commit(runtime.clone()).await;
        self.notify_created(&channel_id).await;
        Ok(runtime)
    }

    /// Stop hosting `channel_id` and delete its ledger
    #[instrument(skip(self), fields(channel = %channel_id))]
    pub async fn remove(&self, channel_id: &str) -> Result<(), ParticipationError> {
        let runtime = self
            .state
            .write()
            .await
            .channels
            .remove(channel_id)
            .ok_or(ChannelError::NotExist)?;

        runtime.ledger().close();
        if let Err(e) = self.membership.deregister_channel(channel_id).await {
            warn!("Failed to deregister channel {}: {}", channel_id, e);
        }

        self.ledger_manager
            .remove_ledger(channel_id)
            .await
            .map_err(ledger_error)?;

        info!(
            "Removed channel {} (hosted since {}, source: {})",
            channel_id,
            runtime.created_at().format("%Y-%m-%d %H:%M:%S UTC"),
            runtime.source()
        );
        Ok(())
    }

    pub async fn get(&self, channel_id: &str) -> Option<Arc<ChannelRuntime>> {
        self.state.read().await.channels.get(channel_id).cloned()
    }

    /// Descriptors of all hosted channels, sorted by name
    pub async fn channels_info(&self) -> Vec<ChannelInfo> {
        let state = self.state.read().await;
        let mut infos: Vec<ChannelInfo> = state.channels.values().map(|c| c.info()).collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    pub async fn bootstrap_status(&self) -> BootstrapStatus {
        self.state.read().await.bootstrap.clone()
    }

    async fn running_bootstrap(&self) -> Option<String> {
        let state = self.state.read().await;
        state
            .bootstrap
            .in_progress
            .then(|| state.bootstrap.bootstrapping_snapshot_dir.clone())
    }

    pub async fn system_channel(&self) -> Option<Arc<ChannelRuntime>> {
        self.state
            .read()
            .await
            .channels
            .values()
            .find(|c| c.is_system_channel())
            .cloned()
    }

    async fn materialize(
        &self,
        channel_id: &str,
        ledger: Arc<dyn Ledger>,
        policy_manager: PolicyManager,
        is_system_channel: bool,
        source: ChannelSource,
    ) -> Result<Arc<ChannelRuntime>, ParticipationError> {
        self.membership
            .register_channel(channel_id, ledger.clone())
            .await
            .map_err(|e| ChannelError::Membership {
                channel_id: channel_id.to_string(),
                reason: format!("{:#}", e),
            })?;

        debug!(
            "Channel {} has {} policies",
            channel_id,
            policy_manager.len()
        );
        Ok(Arc::new(ChannelRuntime::new(
            channel_id,
            ledger,
            policy_manager,
            self.membership.clone(),
            is_system_channel,
            source,
        )))
    }

    async fn commit(&self, runtime: Arc<ChannelRuntime>) {
        let mut state = self.state.write().await;
        state.creating.remove(runtime.channel_id());
        state
            .channels
            .insert(runtime.channel_id().to_string(), runtime);
    }

    async fn release(&self, channel_id: &str) {
        self.state.write().await.creating.remove(channel_id);
    }

    /// Undo a creation whose ledger already exists
    async fn abandon(&self, channel_id: &str, ledger: &Arc<dyn Ledger>) {
        self.discard_ledger(channel_id, ledger).await;
        self.release(channel_id).await;
    }

    async fn discard_ledger(&self, channel_id: &str, ledger: &Arc<dyn Ledger>) {
        ledger.close();
        if let Err(e) = self.ledger_manager.remove_ledger(channel_id).await {
            warn!(
                "Failed to clean up ledger of channel {}: {:#}",
                channel_id, e
            );
        }
    }

    async fn notify_created(&self, channel_id: &str) {
        let callback = self.on_channel_created.clone();
        let id = channel_id.to_string();
        if let Err(e) = tokio::task::spawn_blocking(move || callback(&id)).await {
            error!("Channel created callback for {} failed: {}", channel_id, e);
        }
    }
}

fn ledger_error(e: anyhow::Error) -> ParticipationError {
    ChannelError::Ledger {
        reason: format!("{:#}", e),
    }
    .into()
}

#[async_trait]
impl ChannelManagement for ChannelManager {
    async fn channel_list(&self) -> ChannelList {
        let state = self.state.read().await;
        let mut list = ChannelList::default();
        for runtime in state.channels.values() {
            if runtime.is_system_channel() {
                list.system_channel = Some(ChannelInfoShort::new(runtime.channel_id()));
            } else {
                list.channels.push(ChannelInfoShort::new(runtime.channel_id()));
            }
        }
        list.channels.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }

    async fn channel_info(&self, channel_id: &str) -> Result<ChannelInfo, ParticipationError> {
        self.get(channel_id)
            .await
            .map(|runtime| runtime.info())
            .ok_or_else(|| ChannelError::NotExist.into())
    }

    async fn join_channel(
        &self,
        config_block: ConfigBlock,
    ) -> Result<ChannelInfo, ParticipationError> {
        let runtime = self.create_from_config_block(config_block).await?;
        Ok(runtime.info())
    }

    async fn remove_channel(&self, channel_id: &str) -> Result<(), ParticipationError> {
        self.remove(channel_id).await
    }

    async fn join_by_snapshot(
        &self,
        snapshot_dir: &Path,
    ) -> Result<BootstrapStatus, ParticipationError> {
        self.create_from_snapshot(snapshot_dir).await
    }

    async fn join_by_snapshot_status(&self) -> BootstrapStatus {
        self.bootstrap_status().await
    }
}
