//! vault-api - HTTP API server for the vault product catalog

use std::net::SocketAddr;

use tracing::{info, warn};

use vault_api::{app, logging, AppState, ServerConfig};
use vault_db::{CatalogConfig, Database, PoolConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env()?;
    let _log_guard = logging::init_tracing(&config);
    info!(
        log_format = ?config.log_format,
        log_file = config.log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let db = Database::connect_with_config(
        &config.database_url,
        PoolConfig::new()
            .max_connections(config.db_max_connections)
            .statement_timeout(Some(config.query_timeout))
            .application_name("vault-api"),
    )
    .await?;
    db.migrate().await?;
    info!(
        subsystem = "database",
        op = "migrate",
        "Database migrations applied"
    );

    let catalog = db.catalog_with_config(CatalogConfig {
        query_timeout: config.query_timeout,
    });
    let app = app(AppState::new(catalog));

    // Start server
    let addr: SocketAddr = config.bind_address().parse()?;
    info!(
        query_timeout_ms = config.query_timeout.as_millis() as u64,
        "Starting server on {}", addr
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
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
