//! Shared fixtures for chanadmin integration tests

pub mod pki;
pub mod test_node;

pub use pki::*;
pub use test_data::*;
pub use test_node::*;
