// File: channeld/src/main.rs
use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use channeld::channel::ChannelCreatedCallback;
use channeld::constants::defaults;
use channeld::web::{AdminServer, AppState};
use channeld::{ChannelManager, ConfigManager, FileLedgerManager, LocalMembership};

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::from_default_env()
        .add_directive("channeld=info".parse()?)
        .add_directive("tower_http=warn".parse()?)
        .add_directive("hyper=warn".parse()?);

    fmt().with_env_filter(env_filter).init();

    info!("Starting channel participation node");

    // Load configuration
    let config_dir =
        std::env::var("CHANNELD_CONFIG_DIR").unwrap_or_else(|_| defaults::CONFIG_DIR.to_string());
    let config_manager = ConfigManager::new(config_dir).await?;
    let config = config_manager.get_current_config();

    let ledger_manager = Arc::new(FileLedgerManager::new(config.ledger.root_dir.clone()).await?);
    info!(
        "Ledger manager initialized at {}",
        ledger_manager.root_dir().display()
    );

    let membership = Arc::new(LocalMembership::new());

    let on_channel_created: ChannelCreatedCallback = Arc::new(|channel_id: &str| {
        info!("Channel {} is ready to serve", channel_id);
    });

    let channel_manager = ChannelManager::new(ledger_manager, membership, on_channel_created);
    match channel_manager.initialize().await {
        Ok(count) => info!("Hosting {} channel(s) after start-up", count),
        Err(e) => {
            error!("Failed to recover existing channels: {}", e);
            return Err(e.into());
        }
    }

    let state = AppState::new(
        Arc::new(channel_manager),
        config.admin.max_request_body_size,
    );
    let server = AdminServer::bind(&config.admin, state).await?;

    server
        .serve_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    info!("Channel participation node stopped");
    Ok(())
}
