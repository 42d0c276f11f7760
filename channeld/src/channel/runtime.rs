use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

use crate::constants::descriptor;
use crate::ledger::Ledger;
use crate::membership::MembershipSupport;
use crate::policy::PolicyManager;
use crate::types::ChannelInfo;

/// How a channel came to be hosted by this node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelSource {
    GenesisBlock,
    Snapshot { snapshot_dir: String },
    /// Ledger already existed when the node started
    Recovered,
}

impl fmt::Display for ChannelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelSource::GenesisBlock => write!(f, "genesis block"),
            ChannelSource::Snapshot { snapshot_dir } => write!(f, "snapshot {}", snapshot_dir),
            ChannelSource::Recovered => write!(f, "existing ledger"),
        }
    }
}

/// Runtime state of a hosted channel
pub struct ChannelRuntime {
    channel_id: String,
    ledger: Arc<dyn Ledger>,
    policy_manager: PolicyManager,
    membership: Arc<dyn MembershipSupport>,
    is_system_channel: bool,
    source: ChannelSource,
    created_at: DateTime<Utc>,
}

impl ChannelRuntime {
    pub fn new(
        channel_id: &str,
        ledger: Arc<dyn Ledger>,
        policy_manager: PolicyManager,
        membership: Arc<dyn MembershipSupport>,
        is_system_channel: bool,
        source: ChannelSource,
    ) -> Self {
        Self {
            channel_id: channel_id.to_string(),
            ledger,
            policy_manager,
            membership,
            is_system_channel,
            source,
            created_at: Utc::now(),
        }
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.ledger
    }

    pub fn policy_manager(&self) -> &PolicyManager {
        &self.policy_manager
    }

    pub fn membership(&self) -> &Arc<dyn MembershipSupport> {
        &self.membership
    }

    pub fn is_system_channel(&self) -> bool {
        self.is_system_channel
    }

    pub fn source(&self) -> &ChannelSource {
        &self.source
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn height(&self) -> u64 {
        self.ledger.height()
    }

    /// Descriptor as reported by the participation API
    pub fn info(&self) -> ChannelInfo {
        ChannelInfo::new(
            &self.channel_id,
            descriptor::CLUSTER_RELATION_MEMBER,
            descriptor::STATUS_ACTIVE,
            self.height(),
        )
    }
}

impl fmt::Debug for ChannelRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelRuntime")
            .field("channel_id", &self.channel_id)
            .field("height", &self.ledger.height())
            .field("policies", &self.policy_manager.len())
            .field("is_system_channel", &self.is_system_channel)
            .field("source", &self.source)
            .field("created_at", &self.created_at)
            .finish()
    }
}
