//! Scriptable `ChannelManagement` for gateway tests

use async_trait::async_trait;
use channeld::channel::ChannelManagement;
use channeld::configblock::ConfigBlock;
use channeld::errors::{ChannelError, ParticipationError};
use channeld::types::{BootstrapStatus, ChannelInfo, ChannelInfoShort, ChannelList};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Default)]
pub struct MockChannelManagement {
    channels: Mutex<BTreeMap<String, ChannelInfo>>,
    system_channel: Mutex<Option<String>>,
    join_error: Mutex<Option<ChannelError>>,
    remove_error: Mutex<Option<ChannelError>>,
    snapshot_error: Mutex<Option<ChannelError>>,
    bootstrap: Mutex<BootstrapStatus>,
    joined: Mutex<Vec<String>>,
    snapshot_requests: Mutex<Vec<PathBuf>>,
}

impl MockChannelManagement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(self, name: &str, height: u64) -> Self {
        self.channels.lock().unwrap().insert(
            name.to_string(),
            ChannelInfo::new(name, "member", "active", height),
        );
        self
    }

    pub fn with_system_channel(self, name: &str) -> Self {
        *self.system_channel.lock().unwrap() = Some(name.to_string());
        self
    }

    pub fn fail_join(&self, error: ChannelError) {
        *self.join_error.lock().unwrap() = Some(error);
    }

    pub fn fail_remove(&self, error: ChannelError) {
        *self.remove_error.lock().unwrap() = Some(error);
    }

    pub fn fail_snapshot(&self, error: ChannelError) {
        *self.snapshot_error.lock().unwrap() = Some(error);
    }

    pub fn set_bootstrap(&self, status: BootstrapStatus) {
        *self.bootstrap.lock().unwrap() = status;
    }

    pub fn joined(&self) -> Vec<String> {
        self.joined.lock().unwrap().clone()
    }

    pub fn snapshot_requests(&self) -> Vec<PathBuf> {
        self.snapshot_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChannelManagement for MockChannelManagement {
    async fn channel_list(&self) -> ChannelList {
        ChannelList {
            channels: self
                .channels
                .lock()
                .unwrap()
                .keys()
                .map(|name| ChannelInfoShort::new(name))
                .collect(),
            system_channel: self
                .system_channel
                .lock()
                .unwrap()
                .as_deref()
                .map(ChannelInfoShort::new),
        }
    }

    async fn channel_info(&self, channel_id: &str) -> Result<ChannelInfo, ParticipationError> {
        self.channels
            .lock()
            .unwrap()
            .get(channel_id)
            .cloned()
            .ok_or_else(|| ChannelError::NotExist.into())
    }

    async fn join_channel(
        &self,
        config_block: ConfigBlock,
    ) -> Result<ChannelInfo, ParticipationError> {
        if let Some(error) = self.join_error.lock().unwrap().clone() {
            return Err(error.into());
        }
        self.joined
            .lock()
            .unwrap()
            .push(config_block.channel_id.clone());
        let info = ChannelInfo::new(&config_block.channel_id, "member", "active", 1);
        self.channels
            .lock()
            .unwrap()
            .insert(config_block.channel_id, info.clone());
        Ok(info)
    }

    async fn remove_channel(&self, channel_id: &str) -> Result<(), ParticipationError> {
        if let Some(error) = self.remove_error.lock().unwrap().clone() {
            return Err(error.into());
        }
        match self.channels.lock().unwrap().remove(channel_id) {
            Some(_) => Ok(()),
            None => Err(ChannelError::NotExist.into()),
        }
    }

    async fn join_by_snapshot(
        &self,
        snapshot_dir: &Path,
    ) -> Result<BootstrapStatus, ParticipationError> {
        if let Some(error) = self.snapshot_error.lock().unwrap().clone() {
            return Err(error.into());
        }
        self.snapshot_requests
            .lock()
            .unwrap()
            .push(snapshot_dir.to_path_buf());
        let status = BootstrapStatus {
            in_progress: true,
            bootstrapping_snapshot_dir: snapshot_dir.display().to_string(),
        };
        *self.bootstrap.lock().unwrap() = status.clone();
        Ok(status)
    }

    async fn join_by_snapshot_status(&self) -> BootstrapStatus {
        self.bootstrap.lock().unwrap().clone()
    }
}
