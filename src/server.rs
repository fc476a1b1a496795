use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::database::{DatabaseManager, PgStore};
use crate::routes::app;
use crate::state::AppState;

/// `RUST_LOG` wins; otherwise `info`. Logs go to stderr so `--json` output stays clean.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the HTTP server until Ctrl-C.
///
/// The pool connects lazily, so the server still starts (and `/health`
/// reports 503) when the database is down or not configured.
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    info!("Starting GHL-Clio bridge in {:?} mode", config.environment);

    if config.database.run_migrations {
        if let Err(e) = DatabaseManager::migrate().await {
            warn!("Skipping migrations: {}", e);
        }
    }

    let bind_addr = format!("{}:{}", config.server.bind_host, config.server.port);
    let state = AppState::new(config, Arc::new(PgStore::new())).context("failed to build HTTP client")?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("GHL-Clio bridge listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    DatabaseManager::close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
