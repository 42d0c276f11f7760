//! Command line definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "chanadmin",
    version,
    about = "Channel participation administration for channeld nodes"
)]
pub struct Cli {
    /// Admin endpoint of the node (host:port)
    #[arg(short = 'o', long = "node-address", global = true)]
    pub node_address: Option<String>,

    /// PEM file with the certificate(s) trusted to sign the node's TLS certificate
    #[arg(long = "ca-file", global = true)]
    pub ca_file: Option<PathBuf>,

    /// PEM file with the client certificate used for mutual TLS
    #[arg(long = "client-cert", global = true)]
    pub client_cert: Option<PathBuf>,

    /// PEM file with the private key of the client certificate
    #[arg(long = "client-key", global = true)]
    pub client_key: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Channel actions
    #[command(subcommand)]
    Channel(ChannelCommand),
}

#[derive(Subcommand, Debug)]
pub enum ChannelCommand {
    /// Join the node to a channel, creating it from its config block
    Join {
        #[arg(short = 'c', long = "channel-id")]
        channel_id: String,

        /// File containing the serialized config block
        #[arg(short = 'b', long = "config-block")]
        config_block: PathBuf,
    },

    /// List the node's channels, or describe one with --channel-id
    List {
        #[arg(short = 'c', long = "channel-id")]
        channel_id: Option<String>,
    },

    /// Remove the node from a channel
    Remove {
        #[arg(short = 'c', long = "channel-id")]
        channel_id: String,
    },

    /// Join a channel from a snapshot directory on the node
    #[command(name = "joinbysnapshot")]
    JoinBySnapshot {
        #[arg(long = "snapshot-path")]
        snapshot_path: String,
    },

    /// Show whether a snapshot bootstrap is running
    #[command(name = "joinbysnapshotstatus")]
    JoinBySnapshotStatus,
}

/// Flags every channel action needs
#[derive(Debug)]
pub struct Connection {
    pub node_address: String,
    pub ca_file: PathBuf,
    pub client_cert: PathBuf,
    pub client_key: PathBuf,
}

impl Cli {
    /// Global flags cannot be marked required, so check them here
    pub fn connection(&self) -> anyhow::Result<Connection> {
        fn required<T: Clone>(value: &Option<T>, flag: &str) -> anyhow::Result<T> {
            value
                .clone()
                .ok_or_else(|| anyhow::anyhow!("required flag {} not provided", flag))
        }

        Ok(Connection {
            node_address: required(&self.node_address, "--node-address")?,
            ca_file: required(&self.ca_file, "--ca-file")?,
            client_cert: required(&self.client_cert, "--client-cert")?,
            client_key: required(&self.client_key, "--client-key")?,
        })
    }
}
