//! lexcache daemon entrypoint.
//!
//! Wires the engine with the bundled in-process L2 backend and banked archive, logs
//! periodic stats and shuts down gracefully on Ctrl+C / SIGTERM.

use std::sync::Arc;

use mimalloc::MiMalloc;
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;

use lexcache::cache::{BankedArchive, CacheEvent, InMemoryBackend, TieredCache};
use lexcache::clock::SystemClock;
use lexcache::config::Config;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!(
        categories = ?config.l1.categories,
        key_prefix = %config.l2.key_prefix,
        snapshot = ?config.snapshot_path,
        "lexcache starting"
    );

    let backend = Arc::new(InMemoryBackend::new());
    let archive = Arc::new(BankedArchive::new(&config.archive));
    let cache = TieredCache::new(config, backend, archive, Arc::new(SystemClock))?;

    let mut events = cache.subscribe_events();
    let reporter = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(CacheEvent::Stats(stats)) => tracing::info!(
                    l1_documents = stats.l1.documents,
                    l2_connected = stats.l2_connected,
                    l3_documents = stats.l3.documents,
                    hit_ratio = stats.hit_ratio,
                    avg_response_time_ms = stats.avg_response_time_ms,
                    sync_conflicts = stats.sync_conflicts,
                    "Stats"
                ),
                Ok(CacheEvent::Initialized) => tracing::info!("Engine initialized"),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Event reporter lagged")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    cache.start().await?;

    shutdown_signal().await;

    reporter.abort();
    cache.destroy().await?;
    tracing::info!("lexcache shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
