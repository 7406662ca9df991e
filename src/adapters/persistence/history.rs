//! Tip History - Append-only JSONL Records
//!
//! Every published tip is appended to `history/YYYY-MM-DD.jsonl` (by
//! publication date). Each line is a complete JSON object, so the log
//! can be streamed, grepped and survives partial writes: a torn last
//! line is skipped on load.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument, warn};

use crate::ports::tip_store::TipRecord;

/// Append-only JSONL tip log with daily file rotation.
pub struct HistoryLog {
    history_dir: PathBuf,
}

impl HistoryLog {
    /// Create the log under `data_dir`.
    pub async fn new(data_dir: &Path) -> Result<Self> {
        let history_dir = data_dir.join("history");
        fs::create_dir_all(&history_dir)
            .await
            .context("Failed to create history directory")?;
        Ok(Self { history_dir })
    }

    fn day_path(&self, date: NaiveDate) -> PathBuf {
        self.history_dir
            .join(format!("{}.jsonl", date.format("%Y-%m-%d")))
    }

    /// Append records to the file of their publication date.
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub async fn append(&self, records: &[TipRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        // Records of one refresh normally share a date; group anyway.
        let mut by_day: Vec<(NaiveDate, String)> = Vec::new();
        for record in records {
            let date = record.created_at.date_naive();
            let mut line =
                serde_json::to_string(record).context("Failed to serialize tip record")?;
            line.push('\n');
            match by_day.iter_mut().find(|(d, _)| *d == date) {
                Some((_, buf)) => buf.push_str(&line),
                None => by_day.push((date, line)),
            }
        }

        for (date, buf) in by_day {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.day_path(date))
                .await
                .context("Failed to open history file")?;
            file.write_all(buf.as_bytes())
                .await
                .context("Failed to write tip records")?;
            file.flush().await.context("Failed to flush history file")?;
        }

        Ok(())
    }

    /// Load every record published on `date`.
    #[instrument(skip(self))]
    pub async fn load_day(&self, date: NaiveDate) -> Result<Vec<TipRecord>> {
        let path = self.day_path(date);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).context("Failed to read history file"),
        };

        let mut records = Vec::new();
        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<TipRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(
                        file = %path.display(),
                        error = %e,
                        "Skipping malformed tip record"
                    );
                }
            }
        }

        info!(count = records.len(), %date, "Loaded tip history");
        Ok(records)
    }

    /// Check if the history directory is writable.
    pub async fn is_healthy(&self) -> bool {
        let probe = self.history_dir.join(".health_check");
        let result = fs::write(&probe, b"ok").await;
        let _ = fs::remove_file(&probe).await;
        result.is_ok()
    }
}
