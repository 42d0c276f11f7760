//! Custom error types for the channel participation node
//!
//! Provides structured error handling for block validation, channel lifecycle
//! operations and node start-up. The gateway maps these onto HTTP statuses;
//! see `web::handlers`.

use std::fmt;

/// Main error type for the participation node
#[derive(Debug)]
pub enum ParticipationError {
    /// Config block decoding and validation errors
    Block(BlockError),

    /// Channel lifecycle errors
    Channel(ChannelError),

    /// Configuration-related errors
    Config(ConfigError),

    /// TLS material errors
    Tls(TlsError),

    /// Other errors with context
    Other(String),
}

/// Config block validation error variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockError {
    /// Block carries no envelopes at all
    Empty,

    /// Payload has no header
    MissingHeader,

    /// A nested message failed to decode
    Decode { what: &'static str, reason: String },

    /// Channel header type is not CONFIG
    NotConfigBlock,

    /// Payload carries no channel configuration
    MissingConfig,

    /// Channel id embedded in the block differs from the one supplied
    ChannelIdMismatch { specified: String, embedded: String },

    /// Channel id does not follow naming rules
    InvalidChannelId { channel_id: String, reason: String },
}

/// Channel lifecycle error variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// Channel is already present (or being created)
    AlreadyExists,

    /// Channel is not present
    NotExist,

    /// A system channel exists, application channels cannot be joined
    SystemChannelExists,

    /// Application channels exist, a system channel cannot be joined
    AppChannelsExist,

    /// A snapshot bootstrap is already running on this node
    BootstrapInProgress { snapshot_dir: String },

    /// Snapshot directory is unusable
    InvalidSnapshot { snapshot_dir: String, reason: String },

    /// Ledger manager failure, message passed through unchanged
    Ledger { reason: String },

    /// Membership registration failure
    Membership { channel_id: String, reason: String },
}

/// Configuration error variants
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to load configuration file
    LoadFailed { path: String, reason: String },

    /// Invalid configuration value
    InvalidValue { field: String, reason: String },

    /// Configuration parsing error
    ParseError { reason: String },
}

/// TLS material error variants
#[derive(Debug)]
pub enum TlsError {
    /// Failed to read a PEM file
    ReadFailed { path: String, reason: String },

    /// PEM contents could not be used
    Certificate { reason: String },

    /// Private key could not be parsed
    PrivateKey { reason: String },

    /// rustls refused the assembled configuration
    Config { reason: String },
}

impl ChannelError {
    /// Conflicts map to 405 on the join path
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            ChannelError::AlreadyExists
                | ChannelError::SystemChannelExists
                | ChannelError::AppChannelsExist
                | ChannelError::BootstrapInProgress { .. }
        )
    }
}

impl fmt::Display for ParticipationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticipationError::Block(e) => write!(f, "{}", e),
            ParticipationError::Channel(e) => write!(f, "{}", e),
            ParticipationError::Config(e) => write!(f, "Configuration error: {}", e),
            ParticipationError::Tls(e) => write!(f, "TLS error: {}", e),
            ParticipationError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for BlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockError::Empty => write!(f, "failed to retrieve channel id - block is empty"),
            BlockError::MissingHeader => {
                write!(f, "failed to retrieve channel id - payload header is empty")
            }
            BlockError::Decode { what, reason } => {
                write!(f, "error reconstructing {}: {}", what, reason)
            }
            BlockError::NotConfigBlock => write!(f, "block is not a config block"),
            BlockError::MissingConfig => write!(f, "config envelope carries no config"),
            BlockError::ChannelIdMismatch {
                specified,
                embedded,
            } => write!(
                f,
                "specified channel ID {} does not match channel ID {} in config block",
                specified, embedded
            ),
            BlockError::InvalidChannelId { channel_id, reason } => {
                write!(f, "invalid channel ID '{}': {}", channel_id, reason)
            }
        }
    }
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelError::AlreadyExists => write!(f, "channel already exists"),
            ChannelError::NotExist => write!(f, "channel does not exist"),
            ChannelError::SystemChannelExists => write!(f, "system channel exists"),
            ChannelError::AppChannelsExist => write!(f, "application channels already exist"),
            ChannelError::BootstrapInProgress { snapshot_dir } => write!(
                f,
                "snapshot bootstrap already in progress for {}",
                snapshot_dir
            ),
            ChannelError::InvalidSnapshot {
                snapshot_dir,
                reason,
            } => write!(f, "invalid snapshot directory {}: {}", snapshot_dir, reason),
            ChannelError::Ledger { reason } => write!(f, "{}", reason),
            ChannelError::Membership { channel_id, reason } => write!(
                f,
                "membership registration failed for {}: {}",
                channel_id, reason
            ),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path, reason)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
            ConfigError::ParseError { reason } => {
                write!(f, "Failed to parse config: {}", reason)
            }
        }
    }
}

impl fmt::Display for TlsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TlsError::ReadFailed { path, reason } => {
                write!(f, "Failed to read '{}': {}", path, reason)
            }
            TlsError::Certificate { reason } => write!(f, "Certificate error: {}", reason),
            TlsError::PrivateKey { reason } => write!(f, "Private key error: {}", reason),
            TlsError::Config { reason } => write!(f, "TLS config error: {}", reason),
        }
    }
}

impl std::error::Error for ParticipationError {}
impl std::error::Error for BlockError {}
impl std::error::Error for ChannelError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for TlsError {}

impl From<anyhow::Error> for ParticipationError {
    fn from(err: anyhow::Error) -> Self {
        ParticipationError::Other(err.to_string())
    }
}

impl From<BlockError> for ParticipationError {
    fn from(err: BlockError) -> Self {
        ParticipationError::Block(err)
    }
}

impl From<ChannelError> for ParticipationError {
    fn from(err: ChannelError) -> Self {
        ParticipationError::Channel(err)
    }
}

impl From<ConfigError> for ParticipationError {
    fn from(err: ConfigError) -> Self {
        ParticipationError::Config(err)
    }
}

impl From<TlsError> for ParticipationError {
    fn from(err: TlsError) -> Self {
        ParticipationError::Tls(err)
    }
}
