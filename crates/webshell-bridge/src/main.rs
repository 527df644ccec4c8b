//! webshell development host
//!
//! - Serves the configured page on `/` with the bridge shim injected
//! - Bridge traffic on `/v1/bridge` (WebSocket)
//! - Usage: `webshell-host [config.yaml]` (defaults to `webshell.yaml` if present)

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

use webshell_bridge::{app_state, config, demo, router};
use webshell_core::error::{BridgeError, Result};

const DEFAULT_CONFIG: &str = "webshell.yaml";

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "webshell-host failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cfg = match std::env::args().nth(1) {
        Some(path) => config::load_from_file(&path)?,
        None if Path::new(DEFAULT_CONFIG).exists() => config::load_from_file(DEFAULT_CONFIG)?,
        None => config::load_from_str("version: 1")?,
    };
    let listen: SocketAddr = cfg
        .host
        .listen
        .parse()
        .map_err(|e| BridgeError::Config(format!("host.listen must be a valid SocketAddr: {e}")))?;

    let state = app_state::AppState::new(cfg)?;
    demo::spawn_notifier(state.bridge(), Duration::from_secs(10));
    let app = router::build_router(state);

    tracing::info!(%listen, "webshell-host starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| BridgeError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| BridgeError::Internal(format!("server failed: {e}")))
}
