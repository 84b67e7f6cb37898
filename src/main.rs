//! TokenScan - console chat front end
//!
//! Every stdin line is one inbound chat message: paste a token address to get
//! a report, or use /start, /help, /top [n]. Replies go to stdout, logs to
//! stderr.
//!
//! Environment: see `ScanConfig::from_env` (TOKENSCAN_*, DEXSCREENER_BASE_URL,
//! RUGCHECK_BASE_URL) and RUST_LOG.

use eyre::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tokenscan::utils::constants::{APP_NAME, APP_VERSION};
use tokenscan::{build_handler, ChatHandle, ConsoleTransport, ScanConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tokenscan=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    info!("🚀 {} v{} (console)", APP_NAME, APP_VERSION);

    let config = ScanConfig::from_env()?;
    let handler = Arc::new(build_handler(config)?);
    let transport = Arc::new(ConsoleTransport::new(std::io::stdout()));
    let chat = ChatHandle("console".to_string());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut inflight = JoinSet::new();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(text) = line? else { break };
                if text.trim().is_empty() {
                    continue;
                }

                let handler = handler.clone();
                let transport = transport.clone();
                let chat = chat.clone();
                inflight.spawn(async move {
                    if let Err(e) = handler.handle_message(transport.as_ref(), &chat, &text).await {
                        warn!(code = e.code_str(), "Message handling failed: {}", e.message);
                    }
                });
            }
            Some(_) = inflight.join_next(), if !inflight.is_empty() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("🛑 Shutdown signal received, dropping {} in-flight scans", inflight.len());
                inflight.abort_all();
                break;
            }
        }
    }

    // stdin closed: let pending scans deliver their reports
    while inflight.join_next().await.is_some() {}

    info!("📊 Session: {}", handler.telemetry().snapshot().summary());
    Ok(())
}
