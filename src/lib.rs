pub mod capture;
pub mod cli;
pub mod config;
pub mod logging;
pub mod server;

use std::sync::Arc;
use std::time::Instant;

use crate::capture::CaptureStore;
use crate::config::{Config, ServerConfig};
use crate::server::error::ServerError;
use crate::server::templates::Templates;

// ========================================
// ENGINE
// ========================================

/// Everything a request handler needs. Built once at startup and handed to the
/// router as state; cheap to clone (all fields are Arcs).
#[derive(Clone)]
pub struct PreviewEngine {
    pub store: Arc<CaptureStore>,
    pub templates: Arc<Templates>,
    pub server: Arc<ServerConfig>,
    pub start_time: Instant,
}

impl PreviewEngine {
    pub fn new(config: &Config) -> Result<Self, ServerError> {
        Ok(Self {
            store: Arc::new(CaptureStore::new(config.store.clone())),
            templates: Arc::new(Templates::load()?),
            server: Arc::new(config.server.clone()),
            start_time: Instant::now(),
        })
    }
}
