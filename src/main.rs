use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use gatehouse::{
    app::{self, AppState},
    auth::HttpAuthService,
    config,
    database::{DatabaseManager, PgUserDirectory},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up AUTH_SERVICE_URL, DATABASE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gatehouse=info,tower_http=info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config().clone();
    tracing::info!("Starting gatehouse in {:?} mode", config.environment);

    let auth = HttpAuthService::from_config(&config).context("auth service client")?;
    let database = DatabaseManager::from_config(&config.database).context("database pool")?;
    if !database.is_configured() {
        tracing::warn!("DATABASE_URL not set, dashboard directory disabled");
    }

    let bind_addr = config.bind_addr();
    let state = AppState::new(config, Arc::new(auth), Arc::new(PgUserDirectory::new(database.clone())))?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!("gatehouse listening on http://{}", bind_addr);

    axum::serve(listener, app::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server")?;

    database.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", err);
    }
    tracing::info!("shutting down");
}
