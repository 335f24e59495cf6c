//! # KPR API
//!
//! HTTP server binary.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        KPR API Server                                   │
//! │                                                                         │
//! │  Storefront / Admin ───► HTTP (3001) ───► Routes ───► SQLite | Postgres│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kpr_api::{build_router, ApiConfig, AppState};
use kpr_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing (RUST_LOG overrides the default level)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting KPR API server...");

    // Load configuration
    let config = ApiConfig::load()?;
    info!(
        addr = %config.bind_addr(),
        db_url = %config.database_url.chars().take(30).collect::<String>(),
        "Configuration loaded"
    );

    if config.uses_default_secret() {
        warn!("JWT_SECRET not set, signing tokens with the default secret");
    }

    // Connect, migrate, seed the default admin
    let db = Database::new(
        DbConfig::new(&config.database_url).max_connections(config.db_max_connections),
    )
    .await?;
    info!(backend = %db.backend(), "Database ready");

    let addr = config.bind_addr();
    let state = Arc::new(AppState::new(db.clone(), config));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
