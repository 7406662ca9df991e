//! Snapshot Files - Atomic JSON Documents
//!
//! Current tips per event (`tips/<event_id>.json`) and the daily extras
//! (`accumulators.json`, `surebets.json`) are replaced wholesale on every
//! refresh. Writes go to a temp file that is then renamed over the
//! target, so readers always see either the old or the new document.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tracing::{debug, instrument};

/// Directory of atomically replaced JSON documents.
pub struct SnapshotStore {
    root: PathBuf,
    tips_dir: PathBuf,
}

impl SnapshotStore {
    /// Create the store under `data_dir`, creating directories as needed.
    pub async fn new(data_dir: &Path) -> Result<Self> {
        let tips_dir = data_dir.join("tips");
        fs::create_dir_all(&tips_dir)
            .await
            .context("Failed to create tips directory")?;

        Ok(Self {
            root: data_dir.to_path_buf(),
            tips_dir,
        })
    }

    /// Path of an event's tip document.
    ///
    /// Event ids are provider fixture ids; anything outside
    /// `[A-Za-z0-9_-]` is replaced so an id can never escape the directory.
    pub fn event_path(&self, event_id: &str) -> PathBuf {
        let safe: String = event_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.tips_dir.join(format!("{safe}.json"))
    }

    pub fn root_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Serialize `value` and atomically replace `path` (tmp → rename).
    #[instrument(skip(self, value), fields(path = %path.display()))]
    pub async fn write<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value).context("Failed to serialize snapshot")?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, &json)
            .await
            .context("Failed to write tmp snapshot file")?;
        fs::rename(&tmp_path, path)
            .await
            .context("Failed to rename snapshot file")?;

        debug!(bytes = json.len(), "Snapshot written");
        Ok(())
    }

    /// Read a document, or `None` if it does not exist yet.
    pub async fn read<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        let json = match fs::read_to_string(path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        let value = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(value))
    }

    /// Check if the tips directory is writable.
    pub async fn is_healthy(&self) -> bool {
        let probe = self.tips_dir.join(".health_check");
        let result = fs::write(&probe, b"ok").await;
        let _ = fs::remove_file(&probe).await;
        result.is_ok()
    }
}
