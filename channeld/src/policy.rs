//! Per-channel policy resolution
//!
//! Policies live at every level of a channel configuration tree. The manager
//! flattens them into absolute paths such as `/Channel/Application/Writers`
//! so that callers can resolve either absolute paths or names relative to
//! the channel root (`Application/Writers`, `Readers`).

use std::collections::BTreeMap;

use crate::constants::config_keys;
use crate::protos::{Config, ConfigGroup, PolicyType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelPolicy {
    pub path: String,
    pub policy_type: PolicyType,
    pub value: Vec<u8>,
    pub mod_policy: String,
}

#[derive(Debug, Clone, Default)]
pub struct PolicyManager {
    policies: BTreeMap<String, ChannelPolicy>,
}

impl PolicyManager {
    pub fn from_config(config: &Config) -> Self {
        let mut policies = BTreeMap::new();
        if let Some(root) = &config.channel_group {
            let root_path = format!("/{}", config_keys::CHANNEL_GROUP);
            collect_policies(&root_path, root, &mut policies);
        }
        Self { policies }
    }

    /// Resolve a policy by absolute path or by a path relative to `/Channel`
    pub fn get_policy(&self, name: &str) -> Option<&ChannelPolicy> {
        if name.starts_with('/') {
            return self.policies.get(name);
        }
        let absolute = format!("/{}/{}", config_keys::CHANNEL_GROUP, name);
        self.policies.get(&absolute)
    }

    pub fn policy_paths(&self) -> impl Iterator<Item = &str> {
        self.policies.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

fn collect_policies(path: &str, group: &ConfigGroup, out: &mut BTreeMap<String, ChannelPolicy>) {
    for (name, config_policy) in &group.policies {
        let full_path = format!("{}/{}", path, name);
        let (policy_type, value) = config_policy
            .policy
            .as_ref()
            .map(|p| {
                (
                    PolicyType::try_from(p.r#type).unwrap_or(PolicyType::Unknown),
                    p.value.clone(),
                )
            })
            .unwrap_or((PolicyType::Unknown, Vec::new()));

        out.insert(
            full_path.clone(),
            ChannelPolicy {
                path: full_path,
                policy_type,
                value,
                mod_policy: config_policy.mod_policy.clone(),
            },
        );
    }

    for (name, child) in &group.groups {
        collect_policies(&format!("{}/{}", path, name), child, out);
    }
}
