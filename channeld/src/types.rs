use serde::{Deserialize, Serialize};

use crate::constants::urls;

// === RESPONSE STRUCTURES ===

/// Short channel descriptor used in listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfoShort {
    pub name: String,
    pub url: String,
}

impl ChannelInfoShort {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            url: urls::channel_url(name),
        }
    }
}

/// Full channel descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelInfo {
    pub name: String,
    pub url: String,
    pub cluster_relation: String,
    pub status: String,
    pub height: u64,
}

impl ChannelInfo {
    pub fn new(name: &str, cluster_relation: &str, status: &str, height: u64) -> Self {
        Self {
            name: name.to_string(),
            url: urls::channel_url(name),
            cluster_relation: cluster_relation.to_string(),
            status: status.to_string(),
            height,
        }
    }

    /// Recompute the URL from the name
    pub fn with_url(mut self) -> Self {
        self.url = urls::channel_url(&self.name);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelList {
    pub channels: Vec<ChannelInfoShort>,
    pub system_channel: Option<ChannelInfoShort>,
}

/// Node-wide snapshot bootstrap status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapStatus {
    pub in_progress: bool,
    pub bootstrapping_snapshot_dir: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

// === REQUEST STRUCTURES ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinBySnapshotRequest {
    pub snapshot_path: String,
}
