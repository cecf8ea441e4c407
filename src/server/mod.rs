//! HTTP layer: the collaborators that call into the capture store.

pub mod endpoint;
pub mod error;
pub mod ingest;
pub mod router;
pub mod templates;
pub mod view;

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::capture::spawn_sweeper;
use crate::config::Config;
use crate::server::error::ServerError;
use crate::PreviewEngine;

pub use router::build_router;

/// Bind, serve until Ctrl-C, then drain in-flight requests.
pub async fn run(config: Config) -> Result<(), ServerError> {
    let engine = PreviewEngine::new(&config)?;
    let _sweeper = spawn_sweeper(&engine.store, config.store.sweep_interval);

    let addr = config.server.listen_address.clone();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind { addr: addr.clone(), source })?;

    tracing::info!(
        "🚀 webhook-preview listening on {} (public URL {})",
        addr,
        config.server.http_base_url
    );
    tracing::info!(
        ring_capacity = config.store.ring_capacity,
        max_tenants = config.store.max_tenants,
        ttl_secs = config.store.ttl.as_secs(),
        touch_on_read = config.store.touch_on_read,
        "📦 Capture store initialized"
    );

    let app = build_router(engine);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("[Server] Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("[Server] Ctrl-C received, shutting down"),
        Err(e) => {
            // Without a signal handler the server just runs until killed
            tracing::error!("[Server] Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
