//! TokenScan API Server
//!
//! REST front end over the same scan pipeline as the chat bot
//!
//! Usage:
//!   cargo run --bin tokenscan_api
//!
//! Environment:
//!   PORT / TOKENSCAN_PORT - Server port (default: 8080)
//!   TOKENSCAN_HOST        - Server host (default: 0.0.0.0)
//!   RUST_LOG              - Log filter (default: tokenscan=info)

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tokenscan::api::{create_router, handlers::AppState};
use tokenscan::models::ServerConfig;
use tokenscan::utils::constants::{APP_NAME, APP_VERSION};
use tokenscan::{build_handler, ScanConfig};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tokenscan=info,tower_http=info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = ScanConfig::from_env()?;
    let server = ServerConfig::from_env()?;

    let handler = Arc::new(build_handler(config)?);
    let state = Arc::new(AppState::new(handler.clone()));
    let app = create_router(state);

    let addr: SocketAddr = server.bind_address().parse()?;

    info!("🚀 {} API v{} starting on http://{}", APP_NAME, APP_VERSION, addr);
    info!("Endpoints:");
    info!("  POST /v1/scan     - Scan a token address");
    info!("  GET  /v1/top      - Most scanned tokens");
    info!("  GET  /v1/stats    - Scan statistics");
    info!("  GET  /v1/health   - Health check");
    info!("Press Ctrl+C for graceful shutdown");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("🛑 Shutdown signal received");
    info!("📊 Session: {}", handler.telemetry().snapshot().summary());
    info!("👋 {} API shutdown complete", APP_NAME);

    Ok(())
}
