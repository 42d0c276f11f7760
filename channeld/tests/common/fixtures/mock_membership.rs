//! Membership support that records every call

use anyhow::{bail, Result};
use async_trait::async_trait;
use channeld::ledger::Ledger;
use channeld::membership::MembershipSupport;
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct RecordingMembership {
    registered: Mutex<Vec<String>>,
    deregistered: Mutex<Vec<String>>,
    register_error: Mutex<Option<String>>,
}

impl RecordingMembership {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_register(&self, message: &str) {
        *self.register_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn registered(&self) -> Vec<String> {
        self.registered.lock().unwrap().clone()
    }

    pub fn deregistered(&self) -> Vec<String> {
        self.deregistered.lock().unwrap().clone()
    }
}

#[async_trait]
impl MembershipSupport for RecordingMembership {
    async fn register_channel(&self, channel_id: &str, _ledger: Arc<dyn Ledger>) -> Result<()> {
        if let Some(message) = self.register_error.lock().unwrap().clone() {
            bail!(message);
        }
        self.registered.lock().unwrap().push(channel_id.to_string());
        Ok(())
    }

    async fn deregister_channel(&self, channel_id: &str) -> Result<()> {
        self.deregistered.lock().unwrap().push(channel_id.to_string());
        Ok(())
    }
}
