//! Scheduler - Periodic Pipeline Runs
//!
//! Runs the tip pipeline for the current UTC date on a fixed interval
//! (and once at startup when configured), refreshes readiness from the
//! provider and store health checks before every run, and swaps in new
//! valuation settings whenever the config watcher publishes a reload.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::{broadcast, watch};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, instrument, warn};

use super::tip_pipeline::{PipelineSettings, RunReport, TipPipeline};
use crate::adapters::metrics::HealthState;
use crate::config::AppConfig;
use crate::ports::odds_provider::OddsProvider;
use crate::ports::tip_store::TipStore;

pub struct Scheduler<P: OddsProvider, S: TipStore> {
  pipeline: Arc<TipPipeline<P, S>>,
  health: Arc<HealthState>,
  config_rx: watch::Receiver<AppConfig>,
  interval: Duration,
  run_on_start: bool,
}

impl<P: OddsProvider, S: TipStore> Scheduler<P, S> {
  pub fn new(
    pipeline: Arc<TipPipeline<P, S>>,
    health: Arc<HealthState>,
    config_rx: watch::Receiver<AppConfig>,
  ) -> Self {
    let (interval, run_on_start) = {
      let config = config_rx.borrow();
      (
        Duration::from_secs(config.schedule.interval_seconds),
        config.schedule.run_on_start,
      )
    };

    Self {
      pipeline,
      health,
      config_rx,
      interval,
      run_on_start,
    }
  }

  /// Run until shutdown.
  #[instrument(skip(self, shutdown_rx), name = "scheduler")]
  pub async fn run(mut self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
    info!(
      interval_secs = self.interval.as_secs(),
      run_on_start = self.run_on_start,
      "Scheduler started"
    );

    let mut ticker = tokio::time::interval(self.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick fires immediately.
    if !self.run_on_start {
      ticker.tick().await;
    }

    let mut config_open = true;

    loop {
      tokio::select! {
        biased;
        _ = shutdown_rx.recv() => {
          info!("Scheduler shutting down");
          return Ok(());
        }
        changed = self.config_rx.changed(), if config_open => {
          if changed.is_err() {
            warn!("Config channel closed, keeping current settings");
            config_open = false;
            continue;
          }
          let settings = PipelineSettings::from_config(&self.config_rx.borrow_and_update());
          self.pipeline.update_settings(settings).await;
        }
        _ = ticker.tick() => {
          self.run_once().await;
        }
      }
    }
  }

  /// Refresh health, then run the pipeline for today.
  pub async fn run_once(&self) -> Option<RunReport> {
    let (provider_ok, store_ok) = tokio::join!(
      self.pipeline.provider().is_healthy(),
      self.pipeline.store().is_healthy(),
    );
    self.health.set_provider_healthy(provider_ok);
    self.health.set_store_healthy(store_ok);

    if !provider_ok {
      warn!("Provider unhealthy, attempting run anyway");
    }

    let today = Utc::now().date_naive();
    match self.pipeline.run(today).await {
      Ok(report) => Some(report),
      Err(e) => {
        error!(error = %e, %today, "Pipeline run failed");
        None
      }
    }
  }
}
