//! Command line administration of channel participation
//!
//! Every action validates its inputs locally before contacting the node.
//! Local failures surface as `Err` (exit code 1, nothing printed to stdout).
//! Once a request was attempted, the result is an [`Outcome`]: the HTTP
//! status and body on any response, or `Error: <reason>` with exit code 1
//! when no response was received.

pub mod cli;
pub mod client;
pub mod output;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use reqwest::{Identity, Response};
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use std::ffi::OsString;
use std::path::Path;
use tokio::fs;
use tracing::debug;

use channeld::configblock;

pub use cli::{ChannelCommand, Cli, Command};
pub use client::AdminClient;

/// What to print and how to exit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub output: String,
    pub exit_code: i32,
}

/// Parse `args` (without the program name) and run the selected action
pub async fn execute_for_args<I, T>(args: I) -> Result<Outcome>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args = std::iter::once(OsString::from("chanadmin")).chain(args.into_iter().map(Into::into));
    let cli = Cli::try_parse_from(args)?;
    execute(cli).await
}

pub async fn execute(cli: Cli) -> Result<Outcome> {
    let connection = cli.connection()?;

    let ca_pem = fs::read(&connection.ca_file)
        .await
        .context("reading CA certificate")?;
    let ca_certs = parse_ca_certificates(&ca_pem).context("adding ca-file PEM to cert pool")?;

    let identity = load_identity(&connection.client_cert, &connection.client_key)
        .await
        .context("loading client cert/key pair")?;

    let Command::Channel(action) = cli.command;

    // Read and sanity check the block before anything goes over the wire
    let config_block = match &action {
        ChannelCommand::Join {
            channel_id,
            config_block,
        } => Some(read_config_block(config_block, channel_id).await?),
        _ => None,
    };

    let client = AdminClient::new(&connection.node_address, &ca_certs, identity)?;

    let response = match action {
        ChannelCommand::Join { .. } => client.join(config_block.unwrap_or_default()).await,
        ChannelCommand::List {
            channel_id: Some(channel_id),
        } => client.list_single_channel(&channel_id).await,
        ChannelCommand::List { channel_id: None } => client.list_all_channels().await,
        ChannelCommand::Remove { channel_id } => client.remove(&channel_id).await,
        ChannelCommand::JoinBySnapshot { snapshot_path } => {
            client.join_by_snapshot(&snapshot_path).await
        }
        ChannelCommand::JoinBySnapshotStatus => client.join_by_snapshot_status().await,
    };

    Ok(render(response).await)
}

async fn render(response: reqwest::Result<Response>) -> Outcome {
    let response = match response {
        Ok(response) => response,
        Err(e) => return failure(&e),
    };

    let status = response.status().as_u16();
    debug!("Node answered with status {}", status);
    match response.bytes().await {
        Ok(body) => Outcome {
            output: output::response_output(status, &body),
            exit_code: 0,
        },
        Err(e) => failure(&e),
    }
}

fn failure(err: &reqwest::Error) -> Outcome {
    Outcome {
        output: output::error_output(err),
        exit_code: 1,
    }
}

fn parse_ca_certificates(pem: &[u8]) -> Result<Vec<CertificateDer<'static>>> {
    let certs = CertificateDer::pem_slice_iter(pem)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| anyhow!("{}", e))?;
    if certs.is_empty() {
        bail!("no certificates found");
    }
    Ok(certs)
}

async fn load_identity(cert_path: &Path, key_path: &Path) -> Result<Identity> {
    let cert_pem = fs::read(cert_path)
        .await
        .with_context(|| format!("reading {}", cert_path.display()))?;
    let key_pem = fs::read(key_path)
        .await
        .with_context(|| format!("reading {}", key_path.display()))?;

    if CertificateDer::pem_slice_iter(&cert_pem).next().is_none() {
        bail!("no certificate found in {}", cert_path.display());
    }
    PrivateKeyDer::from_pem_slice(&key_pem)
        .map_err(|e| anyhow!("{}: {}", key_path.display(), e))?;

    let mut identity_pem = cert_pem;
    identity_pem.push(b'\n');
    identity_pem.extend_from_slice(&key_pem);
    Ok(Identity::from_pem(&identity_pem)?)
}

/// Read a config block and make sure it is for `channel_id`
async fn read_config_block(path: &Path, channel_id: &str) -> Result<Vec<u8>> {
    let bytes = fs::read(path).await.context("reading config block")?;
    let block = configblock::unmarshal_block(&bytes).context("unmarshaling block")?;
    let block_channel_id = configblock::channel_id_from_block(&block)?;

    if block_channel_id != channel_id {
        bail!(
            "specified --channel-id {} does not match channel ID {} in config block",
            channel_id,
            block_channel_id
        );
    }
    Ok(bytes)
}
