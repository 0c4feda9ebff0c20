//! HTTP server startup.

use crate::api;
use crate::config::ServerConfig;
use crate::gateway::SessionGateway;
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Builds the gateway from `config` and serves the API until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the store cannot be opened, the address cannot be
/// bound, or the server fails.
#[instrument(skip(config), fields(bind = %config.bind_address()))]
pub async fn serve(config: &ServerConfig) -> Result<()> {
    let gateway = Arc::new(SessionGateway::from_config(config)?);
    let app = api::router(gateway);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!(
        address = %listener.local_addr()?,
        database_url = %config.database_url(),
        "Server ready"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
