//! Central repository for wire paths, limits, and default configuration values
//!
//! Constants are grouped by concern so that the gateway, the CLI and the
//! bundled ledger manager agree on a single source of truth.

/// Participation API paths
pub mod urls {
    /// Channel collection
    pub const CHANNELS: &str = "/participation/v1/channels";

    /// Single channel, axum path syntax
    pub const CHANNEL: &str = "/participation/v1/channels/{channel_id}";

    /// Start a snapshot bootstrap
    pub const SNAPSHOT_JOIN: &str = "/participation/v1/snapshots/join";

    /// Snapshot bootstrap status
    pub const SNAPSHOT_STATUS: &str = "/participation/v1/snapshots/status";

    /// URL of a channel resource as reported in descriptors
    pub fn channel_url(channel_id: &str) -> String {
        format!("{}/{}", CHANNELS, channel_id)
    }
}

/// Values reported in channel descriptors
pub mod descriptor {
    /// This node participates in every channel it hosts
    pub const CLUSTER_RELATION_MEMBER: &str = "member";

    /// A channel present in the map is serving
    pub const STATUS_ACTIVE: &str = "active";
}

/// Channel id rules
pub mod channel_id {
    /// Maximum channel id length
    pub const MAX_LENGTH: usize = 249;
}

/// Well-known keys inside a channel configuration
pub mod config_keys {
    /// Present only in application channel configs
    pub const APPLICATION_GROUP: &str = "Application";

    /// Root of every policy path
    pub const CHANNEL_GROUP: &str = "Channel";
}

/// On-disk layout of the bundled file ledger manager
pub mod ledger_files {
    /// Subdirectory holding serialized blocks
    pub const BLOCKS_DIR: &str = "blocks";

    /// Latest config block of a ledger or snapshot
    pub const CONFIG_BLOCK: &str = "config.block";

    /// Per-ledger metadata
    pub const LEDGER_METADATA: &str = "ledger.json";

    /// Snapshot metadata written by the snapshot generator
    pub const SNAPSHOT_METADATA: &str = "_snapshot_signable_metadata.json";

    /// File name of block `number` inside the blocks directory
    pub fn block_file(number: u64) -> String {
        format!("{:010}.block", number)
    }
}

/// Default configuration values
pub mod defaults {
    /// Admin listen address
    pub const LISTEN_ADDRESS: &str = "0.0.0.0:9443";

    /// Maximum accepted request body (1 MiB)
    pub const MAX_REQUEST_BODY_SIZE: usize = 1024 * 1024;

    /// Config directory when `CHANNELD_CONFIG_DIR` is unset
    pub const CONFIG_DIR: &str = "config";

    /// Ledger root when none is configured
    pub const LEDGER_ROOT_DIR: &str = "data/ledgers";
}
