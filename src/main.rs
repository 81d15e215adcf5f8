//! evicache - cache and event bus demonstration
//!
//! Runs a scripted sequence against a TTL cache and logs every hit, miss and
//! eviction published on its event bus.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::sync::RwLock;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use evicache::cache::{Cache, CacheEvent};
use evicache::config::CacheConfig;
use evicache::events::EventBus;
use evicache::tasks::{demo_config, register_log_listeners, spawn_demo_task, DemoTimings};

/// Main entry point for the demonstration.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load cache configuration from environment variables
/// 3. Create the event bus and subscribe the logging listeners
/// 4. Create the cache bound to the bus
/// 5. Run the demonstration task until it finishes or a shutdown signal arrives
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "evicache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cache + event bus demonstration");

    let config = CacheConfig::from_env_or(demo_config()).context("invalid cache configuration")?;
    info!(
        "Configuration loaded: capacity={}, ttl={}ms, strategy={}",
        config.capacity, config.ttl, config.strategy
    );

    let bus: Arc<EventBus<CacheEvent<i64>>> = Arc::new(EventBus::new());
    let _subscriptions = register_log_listeners(&bus)?;

    let cache = Arc::new(RwLock::new(Cache::new(config, Arc::clone(&bus))?));
    let mut demo = spawn_demo_task(cache, DemoTimings::default());

    tokio::select! {
        result = &mut demo => {
            let reports = result.context("demonstration task failed")?;
            info!(reports = reports.len(), "Demonstration complete");
        }
        _ = shutdown_signal() => {
            demo.abort();
            warn!("Demonstration aborted");
        }
    }

    let faults = bus.take_faults();
    if !faults.is_empty() {
        warn!(
            count = faults.len(),
            dropped = bus.dropped_faults(),
            "event listeners reported faults"
        );
    }

    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
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
}
