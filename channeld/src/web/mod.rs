// File: channeld/src/web/mod.rs
pub mod handlers;
pub mod server;
pub mod tls;

pub use server::{create_router, AdminServer};

use std::sync::Arc;

use crate::channel::ChannelManagement;

// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub channels: Arc<dyn ChannelManagement>,
    pub max_request_body_size: usize,
}

impl AppState {
    pub fn new(channels: Arc<dyn ChannelManagement>, max_request_body_size: usize) -> Self {
        Self {
            channels,
            max_request_body_size,
        }
    }
}
