// Address Book - Web Server
// REST API over the address store with Axum

use address_book::api::{self, AppState};
use address_book::config::ServerConfig;
use address_book::{count_addresses, logging, Store};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();
    let _log_guard = logging::init_logging(&config)?;

    info!(version = address_book::VERSION, "address book server starting");

    // Open database (creates the table on first start)
    let store = Store::open(&config.database)
        .with_context(|| format!("failed to open database at {}", config.database.display()))?;

    let existing = count_addresses(&store.session()?)?;
    info!(path = %config.database.display(), addresses = existing, "database opened");

    let app = api::router(AppState::new(store));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind))?;

    info!(addr = %config.bind, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
