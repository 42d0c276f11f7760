pub mod channel;
pub mod config;
pub mod configblock;
pub mod constants;
pub mod deliver;
pub mod errors;
pub mod ledger;
pub mod membership;
pub mod policy;
pub mod protos;
pub mod types;
pub mod web;

// Re-export commonly used types
pub use channel::{ChannelManagement, ChannelManager, ChannelRuntime};
pub use config::{Config, ConfigManager};
pub use configblock::ConfigBlock;
pub use deliver::{ChainSupport, DeliverChainManager};
pub use errors::{BlockError, ChannelError, ParticipationError};
pub use ledger::{FileLedgerManager, Ledger, LedgerManager};
pub use membership::{LocalMembership, MembershipSupport};
pub use web::{AdminServer, AppState};
