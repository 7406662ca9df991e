//! Lanzaca Engine - Entry Point
//!
//! Wiring sequence:
//! 1. Load config.toml (path from LANZACA_CONFIG) + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Create metrics registry and health state
//! 4. Create ProviderClient + ApiFootballProvider (OddsProvider port)
//! 5. Create FileTipStore (TipStore port)
//! 6. Build the TipPipeline
//! 7. Spawn API server (valuations, run-job, /live, /ready)
//! 8. Spawn Prometheus metrics server
//! 9. Spawn config watcher and scheduler
//! 10. Wait for SIGINT → graceful shutdown

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use lanzaca_engine::adapters::http;
use lanzaca_engine::adapters::metrics::{HealthState, MetricsRegistry};
use lanzaca_engine::adapters::persistence::FileTipStore;
use lanzaca_engine::adapters::provider::{ApiFootballProvider, ProviderClient, ProviderClientConfig};
use lanzaca_engine::config::hot_reload::ConfigWatcher;
use lanzaca_engine::config::loader::{config_path, load_config};
use lanzaca_engine::usecases::{PipelineSettings, Scheduler, TipPipeline};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let path = config_path();
    let config = load_config(&path).context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.service.log_level)),
        )
        .json()
        .init();

    info!(
        name = %config.service.name,
        version = env!("CARGO_PKG_VERSION"),
        config = %path,
        dry_run = config.service.dry_run,
        leagues = config.provider.leagues.len(),
        "Starting Lanzaca engine"
    );

    if config.service.dry_run {
        warn!("Dry-run mode - tips valued but nothing persisted");
    }

    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);

    // ── 3. Metrics + health ─────────────────────────────────
    let metrics = Arc::new(MetricsRegistry::new().context("Failed to create metrics registry")?);
    let health = Arc::new(HealthState::new());

    // ── 4. Odds provider ────────────────────────────────────
    let client_config = ProviderClientConfig::from_config(&config.provider)
        .context("Failed to configure provider client")?;
    let client = ProviderClient::new(client_config)
        .context("Failed to create provider client")?
        .with_metrics(Arc::clone(&metrics));
    let provider = Arc::new(
        ApiFootballProvider::new(client, &config.provider.leagues, &config.provider.markets)
            .with_metrics(Arc::clone(&metrics)),
    );

    // ── 5. Tip store ────────────────────────────────────────
    let store = Arc::new(
        FileTipStore::from_data_dir(&config.persistence.data_dir)
            .await
            .context("Failed to open tip store")?,
    );

    // ── 6. Pipeline ─────────────────────────────────────────
    let pipeline = Arc::new(TipPipeline::new(
        provider,
        store,
        Arc::clone(&metrics),
        PipelineSettings::from_config(&config),
    ));

    // ── 7. API server ───────────────────────────────────────
    let app = http::router(Arc::clone(&pipeline), Arc::clone(&health));
    let api_handle = spawn_task(
        "API server",
        http::serve(app, config.api.bind_address.clone(), shutdown_tx.subscribe()),
    );

    // ── 8. Metrics server ───────────────────────────────────
    let metrics_handle = config.metrics.enabled.then(|| {
        spawn_task(
            "Metrics server",
            Arc::clone(&metrics).serve(config.metrics.bind_address.clone(), shutdown_tx.subscribe()),
        )
    });

    // ── 9. Config watcher + scheduler ───────────────────────
    let (mut watcher, config_rx) = ConfigWatcher::new(&path, config.clone());
    let watcher_shutdown = shutdown_tx.subscribe();
    let watcher_handle = spawn_task("Config watcher", async move {
        watcher.run(watcher_shutdown).await
    });

    let scheduler = Scheduler::new(Arc::clone(&pipeline), Arc::clone(&health), config_rx);
    let scheduler_handle = spawn_task("Scheduler", scheduler.run(shutdown_tx.subscribe()));

    info!("All tasks spawned - engine is running");

    // ── 10. Wait for SIGINT ─────────────────────────────────
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for SIGINT");
    }
    info!("SIGINT received, initiating graceful shutdown");

    // Readiness probe → 503 before anything stops.
    health.begin_shutdown();
    let _ = shutdown_tx.send(());

    // An in-flight run holds the pipeline lock until it finishes.
    join_with_timeout("Scheduler", scheduler_handle, Duration::from_secs(60)).await;
    join_with_timeout("Config watcher", watcher_handle, Duration::from_secs(5)).await;
    join_with_timeout("API server", api_handle, Duration::from_secs(10)).await;
    if let Some(handle) = metrics_handle {
        join_with_timeout("Metrics server", handle, Duration::from_secs(5)).await;
    }

    info!("Shutdown complete");
    Ok(())
}

/// Spawn a task, logging its error on exit.
fn spawn_task<F>(name: &'static str, task: F) -> JoinHandle<()>
where
    F: std::future::Future<Output = Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = task.await {
            error!(task = name, error = %e, "Task failed");
        }
    })
}

async fn join_with_timeout(name: &'static str, handle: JoinHandle<()>, limit: Duration) {
    match tokio::time::timeout(limit, handle).await {
        Ok(Ok(())) => info!(task = name, "Task stopped"),
        Ok(Err(e)) => error!(task = name, error = %e, "Task panicked"),
        Err(_) => warn!(task = name, "Task did not stop in time"),
    }
}
