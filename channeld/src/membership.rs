//! Membership (gossip) support for hosted channels
//!
//! Once a channel's ledger exists the channel is registered for peer-to-peer
//! dissemination; removal deregisters it. The node binary uses
//! [`LocalMembership`], an in-process registry that records which ledgers are
//! being disseminated.

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::ledger::Ledger;

#[async_trait]
pub trait MembershipSupport: Send + Sync {
    async fn register_channel(&self, channel_id: &str, ledger: Arc<dyn Ledger>) -> Result<()>;

    async fn deregister_channel(&self, channel_id: &str) -> Result<()>;
}

struct Registration {
    ledger: Arc<dyn Ledger>,
    registered_at: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct LocalMembership {
    registrations: Arc<RwLock<HashMap<String, Registration>>>,
}

impl LocalMembership {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_registered(&self, channel_id: &str) -> bool {
        self.registrations.read().await.contains_key(channel_id)
    }
}

#[async_trait]
impl MembershipSupport for LocalMembership {
    async fn register_channel(&self, channel_id: &str, ledger: Arc<dyn Ledger>) -> Result<()> {
        let mut registrations = self.registrations.write().await;
        if registrations.contains_key(channel_id) {
            bail!("channel {} is already registered for dissemination", channel_id);
        }
        registrations.insert(
            channel_id.to_string(),
            Registration {
                ledger,
                registered_at: Utc::now(),
            },
        );
        info!("Registered channel {} for dissemination", channel_id);
        Ok(())
    }

    async fn deregister_channel(&self, channel_id: &str) -> Result<()> {
        let mut registrations = self.registrations.write().await;
        match registrations.remove(channel_id) {
            Some(registration) => {
                let duration = Utc::now().signed_duration_since(registration.registered_at);
                info!(
                    "Deregistered channel {} at height {} (registered for {}m)",
                    channel_id,
                    registration.ledger.height(),
                    duration.num_minutes()
                );
                Ok(())
            }
            None => bail!("channel {} is not registered for dissemination", channel_id),
        }
    }
}
