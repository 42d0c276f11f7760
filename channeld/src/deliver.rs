//! Chain resolution for the block delivery service

use std::sync::Arc;

use crate::channel::{ChannelManager, ChannelRuntime};
use crate::ledger::Ledger;
use crate::policy::PolicyManager;

/// Handle onto a hosted channel as seen by the delivery service
#[derive(Debug, Clone)]
pub struct ChainSupport {
    runtime: Arc<ChannelRuntime>,
}

impl ChainSupport {
    pub fn channel_id(&self) -> &str {
        self.runtime.channel_id()
    }

    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        self.runtime.ledger()
    }

    pub fn policy_manager(&self) -> &PolicyManager {
        self.runtime.policy_manager()
    }

    pub fn height(&self) -> u64 {
        self.runtime.height()
    }

    pub fn is_system_channel(&self) -> bool {
        self.runtime.is_system_channel()
    }
}

#[derive(Clone)]
pub struct DeliverChainManager {
    channels: ChannelManager,
}

impl DeliverChainManager {
    pub fn new(channels: ChannelManager) -> Self {
        Self { channels }
    }

    /// Resolve a channel id to its chain, `None` if the node does not host it
    pub async fn get_chain(&self, channel_id: &str) -> Option<ChainSupport> {
        self.channels
            .get(channel_id)
            .await
            .map(|runtime| ChainSupport { runtime })
    }
}
