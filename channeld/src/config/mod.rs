// File: channeld/src/config/mod.rs
pub mod manager;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
pub use manager::ConfigManager;

use crate::constants::defaults;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub admin: AdminConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    #[serde(default = "default_max_request_body_size")]
    pub max_request_body_size: usize,
    pub tls: TlsConfig,
}

/// PEM files for the mutually authenticated admin endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    /// Server certificate, optionally followed by its intermediates
    pub certificate: PathBuf,
    pub private_key: PathBuf,
    /// CAs that client certificates must chain to
    pub client_root_cas: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_ledger_root_dir")]
    pub root_dir: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            root_dir: default_ledger_root_dir(),
        }
    }
}

fn default_listen_address() -> String {
    defaults::LISTEN_ADDRESS.to_string()
}

fn default_max_request_body_size() -> usize {
    defaults::MAX_REQUEST_BODY_SIZE
}

fn default_ledger_root_dir() -> PathBuf {
    PathBuf::from(defaults::LEDGER_ROOT_DIR)
}
