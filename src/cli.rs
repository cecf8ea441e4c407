use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(name = "webhook-preview", about = "webhook previewing service", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start webhook-preview service
    Serve(ServeArgs),
}

/// Flags override the environment; unset flags leave it alone.
#[derive(Debug, Default, Args)]
pub struct ServeArgs {
    /// Address on which the server should listen for requests
    #[arg(long, alias = "listenAddress")]
    pub listen_address: Option<String>,

    /// Base HTTP URL of the server. This should point to the LB or public DNS
    /// name by which the server can be reached
    #[arg(long, alias = "httpBaseURL")]
    pub http_base_url: Option<String>,

    /// Requests kept per endpoint
    #[arg(long)]
    pub ring_capacity: Option<usize>,

    /// Endpoints kept at once; the least recently used one is dropped first
    #[arg(long)]
    pub max_tenants: Option<usize>,

    /// Idle seconds before an endpoint's history is dropped
    #[arg(long)]
    pub ttl_secs: Option<u64>,

    /// Bodies are truncated past this many bytes
    #[arg(long)]
    pub max_body_bytes: Option<usize>,

    #[arg(long)]
    pub sweep_interval_secs: Option<u64>,

    /// Viewing an endpoint no longer keeps it alive
    #[arg(long)]
    pub no_touch_on_read: bool,

    #[arg(long)]
    pub log_level: Option<String>,
}

impl ServeArgs {
    pub fn apply(self, config: &mut Config) {
        if let Some(v) = self.listen_address {
            config.server.listen_address = v;
        }
        if let Some(v) = self.http_base_url {
            config.server.http_base_url = v;
        }
        if let Some(v) = self.max_body_bytes {
            config.server.max_body_bytes = v;
        }
        if let Some(v) = self.log_level {
            config.server.log_level = v;
        }
        if let Some(v) = self.ring_capacity {
            config.store.ring_capacity = v;
        }
        if let Some(v) = self.max_tenants {
            config.store.max_tenants = v;
        }
        if let Some(v) = self.ttl_secs {
            config.store.ttl = Duration::from_secs(v);
        }
        if let Some(v) = self.sweep_interval_secs {
            config.store.sweep_interval = Duration::from_secs(v);
        }
        if self.no_touch_on_read {
            config.store.touch_on_read = false;
        }
    }
}
