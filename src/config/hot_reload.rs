//! Config Hot-Reload - Poll config.toml and Publish Changes
//!
//! Re-reads the config file on a fixed period and, when its contents
//! changed and still validate, publishes the new `AppConfig` through a
//! `tokio::sync::watch` channel. The scheduler reads the latest value
//! before every pipeline run, so tier thresholds and stake sizing can be
//! retuned without a restart. Bind addresses and the data directory are
//! only read at startup.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, instrument, warn};

use super::AppConfig;

/// Default polling period.
pub const RELOAD_INTERVAL: Duration = Duration::from_secs(60);

/// What a single poll found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    Unchanged,
    Reloaded,
    /// File changed but failed to load; the current config stays.
    Rejected,
}

/// Polls the config file and broadcasts validated updates.
///
/// Polling (not a filesystem watcher) behaves the same on bind mounts
/// and network volumes.
pub struct ConfigWatcher {
    config_path: String,
    interval: Duration,
    config_tx: watch::Sender<AppConfig>,
    /// Hash of the last file contents seen.
    last_hash: Option<u64>,
}

impl ConfigWatcher {
    /// Create a watcher polling every [`RELOAD_INTERVAL`].
    ///
    /// Returns the watcher and the receiver consumers read from.
    pub fn new(config_path: &str, initial_config: AppConfig) -> (Self, watch::Receiver<AppConfig>) {
        Self::with_interval(config_path, initial_config, RELOAD_INTERVAL)
    }

    pub fn with_interval(
        config_path: &str,
        initial_config: AppConfig,
        interval: Duration,
    ) -> (Self, watch::Receiver<AppConfig>) {
        let (config_tx, config_rx) = watch::channel(initial_config);
        let last_hash = hash_file(config_path);

        let watcher = Self {
            config_path: config_path.to_string(),
            interval,
            config_tx,
            last_hash,
        };

        (watcher, config_rx)
    }

    /// Poll until shutdown.
    #[instrument(skip(self, shutdown_rx), fields(path = %self.config_path))]
    pub async fn run(&mut self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        info!(
            interval_secs = self.interval.as_secs(),
            "Config watcher started"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    info!("Config watcher shutting down");
                    return Ok(());
                }
                () = tokio::time::sleep(self.interval) => {
                    self.check_now();
                }
            }
        }
    }

    /// Poll once.
    pub fn check_now(&mut self) -> ReloadOutcome {
        let new_hash = hash_file(&self.config_path);

        if new_hash == self.last_hash {
            debug!("Config unchanged");
            return ReloadOutcome::Unchanged;
        }

        match super::loader::load_config(&self.config_path) {
            Ok(new_config) => {
                self.last_hash = new_hash;
                self.config_tx.send_replace(new_config);
                info!("Config reloaded");
                ReloadOutcome::Reloaded
            }
            Err(e) => {
                // Remember the broken contents so the same error is not
                // logged on every poll.
                self.last_hash = new_hash;
                warn!(error = %e, "Config change rejected, keeping current config");
                ReloadOutcome::Rejected
            }
        }
    }
}

fn hash_file(path: &str) -> Option<u64> {
    let content = std::fs::read_to_string(path).ok()?;
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    Some(hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::parse_config;

    const BASE: &str = "[service]\nname = \"lanzaca\"\n";

    #[test]
    fn test_reload_publishes_valid_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, BASE).unwrap();
        let path = path.to_string_lossy().to_string();

        let (mut watcher, rx) = ConfigWatcher::new(&path, parse_config(BASE).unwrap());
        assert_eq!(watcher.check_now(), ReloadOutcome::Unchanged);

        std::fs::write(&path, format!("{BASE}[valuation]\nkelly_fraction = 0.5\n")).unwrap();
        assert_eq!(watcher.check_now(), ReloadOutcome::Reloaded);
        assert_eq!(rx.borrow().valuation.kelly_fraction, 0.5);
    }

    #[test]
    fn test_invalid_change_keeps_current() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, BASE).unwrap();
        let path = path.to_string_lossy().to_string();

        let (mut watcher, rx) = ConfigWatcher::new(&path, parse_config(BASE).unwrap());
        std::fs::write(&path, format!("{BASE}[valuation]\nkelly_fraction = 7.0\n")).unwrap();
        assert_eq!(watcher.check_now(), ReloadOutcome::Rejected);
        assert_eq!(watcher.check_now(), ReloadOutcome::Unchanged);
        assert_eq!(rx.borrow().valuation.kelly_fraction, 0.25);
    }
}
