// File: channeld/src/config/manager.rs
use super::Config;
use crate::errors::ConfigError;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

pub struct ConfigManager {
    config_dir: PathBuf,
    current_config: Arc<Config>,
}

impl ConfigManager {
    pub async fn new(config_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let config_dir = config_dir.into();
        let config = Self::load_configuration(&config_dir).await?;
        Ok(Self {
            config_dir,
            current_config: Arc::new(config),
        })
    }

    pub fn get_current_config(&self) -> Arc<Config> {
        self.current_config.clone()
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    async fn load_configuration(config_dir: &Path) -> Result<Config, ConfigError> {
        let main_config_path = config_dir.join("main.toml");
        let main_config_content =
            fs::read_to_string(&main_config_path)
                .await
                .map_err(|e| ConfigError::LoadFailed {
                    path: main_config_path.display().to_string(),
                    reason: e.to_string(),
                })?;

        let mut config: Config =
            toml::from_str(&main_config_content).map_err(|e| ConfigError::ParseError {
                reason: e.to_string(),
            })?;

        // TLS material is looked up next to main.toml unless given absolutely
        let tls = &mut config.admin.tls;
        tls.certificate = resolve(config_dir, &tls.certificate);
        tls.private_key = resolve(config_dir, &tls.private_key);
        tls.client_root_cas = tls
            .client_root_cas
            .iter()
            .map(|p| resolve(config_dir, p))
            .collect();

        Self::validate(&config)?;

        debug!("TLS certificate: {}", config.admin.tls.certificate.display());
        info!(
            "Loaded configuration from {}: admin endpoint {}, {} client root CA(s), ledgers in {}",
            main_config_path.display(),
            config.admin.listen_address,
            config.admin.tls.client_root_cas.len(),
            config.ledger.root_dir.display()
        );

        Ok(config)
    }

    fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.admin.listen_address.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::InvalidValue {
                field: "admin.listen_address".to_string(),
                reason: format!("'{}' is not a socket address", config.admin.listen_address),
            });
        }
        if config.admin.max_request_body_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "admin.max_request_body_size".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if config.admin.tls.client_root_cas.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "admin.tls.client_root_cas".to_string(),
                reason: "at least one client root CA is required".to_string(),
            });
        }
        Ok(())
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
