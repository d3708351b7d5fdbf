//! CrossPay frame service.
//!
//! Serves what the frame host reads before and after launching the app:
//!
//! ```text
//!   GET  /                              landing page with fc:frame metadata
//!   GET  /.well-known/farcaster.json    manifest (CORS *)
//!   GET  /api/og?type=icon|splash|preview
//!   GET  /icon.png /splash.png /preview.png /image.png
//!   GET  /api/webhook                   status
//!   POST /api/webhook                   event acknowledgement
//!   GET  /api/qr?address=..&amount=..   payment QR (SVG)
//!   GET  /health
//! ```
//!
//! Config is read from `$CROSSPAY_CONFIG` when set, otherwise defaults.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;

use crosspay::blockchain::BlockchainClient;
use crosspay::config::{load_or_default, CONFIG_PATH_ENV_VAR};
use crosspay::lifecycle::{signals, Shutdown};
use crosspay::observability::{logging, metrics};
use crosspay::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var(CONFIG_PATH_ENV_VAR).ok().map(PathBuf::from);
    let config = load_or_default(config_path.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?config_path,
        "crosspay starting"
    );

    tracing::info!(
        bind_address = %config.server.bind_address,
        chain_id = config.chain.chain_id,
        app_url = %config.frame.app_url,
        request_timeout_secs = config.server.request_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let client = Arc::new(BlockchainClient::new(config.chain.clone()).await?);

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(&shutdown);

    let server = HttpServer::new(Arc::new(config), Some(client));
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("crosspay stopped");
    Ok(())
}
