//! Tempo Server Binary
//!
//! REST API server for the Tempo time series platform.
//!
//! @version 0.1.0
//! @author Tempo Development Team

use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tempo_series::{MemoryBackend, SeriesStore, StorageBackend};
use tempo_server::{create_router, AppState, ServerConfig};
use tokio::signal;

#[derive(Parser)]
#[command(name = "tempo-server")]
#[command(about = "Tempo Time Series API Server")]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Disable CORS headers
    #[arg(long)]
    no_cors: bool,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let config = ServerConfig::new(&args.host, args.port).with_cors(!args.no_cors);
    let addr: SocketAddr = config.socket_addr();

    // The storage handle is lifecycle-scoped: connected here, disconnected
    // on shutdown. No process-wide singleton.
    let backend: Arc<MemoryBackend> = Arc::new(MemoryBackend::new());
    if let Err(e) = backend.connect() {
        tracing::error!("failed to connect storage backend: {}", e);
        std::process::exit(1);
    }
    tracing::info!("Storage backend connected (in-memory)");

    let store = Arc::new(SeriesStore::new(backend.clone()));
    let state = AppState::new(config, store);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Tempo Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    if let Err(e) = backend.disconnect() {
        tracing::error!("failed to disconnect storage backend: {}", e);
    }
    tracing::info!("Tempo Server stopped");
}

async fn shutdown_signal() {
    if signal::ctrl_c().await.is_err() {
        tracing::error!("failed to install shutdown signal handler");
    }
    tracing::info!("Shutdown signal received");
}
