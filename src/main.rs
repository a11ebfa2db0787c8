//! Stats Cache server binary
//!
//! Hosts a shared statistics cache behind the HTTP inspection API.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stats_cache::{create_router, spawn_sweep_task, AppState, Config, SharedCache, SweepHandle};

/// Main entry point for the stats cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache store, rehydrating it when persistence is on
/// 4. Start the background sweep task
/// 5. Serve the HTTP API until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stats_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting stats cache server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: max_size={}, ttl={}s, max_memory={}B, persistence={}, port={}",
        config.cache.max_size,
        config.cache.ttl.as_secs(),
        config.cache.max_memory_size,
        config.cache.enable_persistence,
        config.server_port
    );

    let state = AppState::from_config(&config);
    info!("Cache store initialized with {} entries", state.cache.read().await.len());

    let sweep = spawn_sweep_task(state.cache.clone(), config.cache.auto_cleanup_interval);
    let cache = state.cache.clone();

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep, cache))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM, then stops the sweep and tears down the
/// cache. The persisted record is left in place for the next start.
async fn shutdown_signal(sweep: Option<SweepHandle>, cache: SharedCache) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(mut sweep) = sweep {
        sweep.stop();
    }
    cache.write().await.destroy();
}
