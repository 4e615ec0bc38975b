//! Cell Arena - HTTP game server.

mod rpc;

use server::{Lobby, MemoryStore, SystemClock};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,server=debug")),
        )
        .init();

    info!("Cell Arena Server v{}", env!("CARGO_PKG_VERSION"));

    // Load server configuration
    let config = server::Config::load()?;
    info!("Loaded configuration");
    info!("  Port: {}", config.server.port);
    info!("  Border: {}x{}", config.border.width, config.border.height);
    info!("  Storage timeout: {}ms", config.storage.timeout_ms);

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let lobby = Arc::new(Lobby::new(config, Arc::new(MemoryStore::new()), Arc::new(SystemClock)));
    let app = rpc::router(lobby);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
