//! File Tip Store - Concrete Adapter for the TipStore Port
//!
//! Combines `SnapshotStore` (atomic per-event and daily documents) with
//! `HistoryLog` (append-only JSONL) behind the `TipStore` trait. The use
//! cases only see the trait, never paths or JSON.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::info;

use super::history::HistoryLog;
use super::snapshots::SnapshotStore;
use crate::domain::accumulator::Accumulator;
use crate::domain::surebet::Surebet;
use crate::ports::tip_store::{TipRecord, TipStore};

const ACCUMULATORS_FILE: &str = "accumulators.json";
const SUREBETS_FILE: &str = "surebets.json";

/// File-backed tip store.
///
/// Layout under the data directory:
/// - `tips/<event_id>.json`: current tips of one event
/// - `history/YYYY-MM-DD.jsonl`: every tip ever published
/// - `accumulators.json`, `surebets.json`: latest daily extras
pub struct FileTipStore {
    snapshots: SnapshotStore,
    history: HistoryLog,
}

impl FileTipStore {
    pub fn new(snapshots: SnapshotStore, history: HistoryLog) -> Self {
        Self { snapshots, history }
    }

    /// Create a store in `data_dir`, creating subdirectories as needed.
    pub async fn from_data_dir(data_dir: impl AsRef<Path>) -> Result<Self> {
        let dir = data_dir.as_ref();
        let snapshots = SnapshotStore::new(dir).await?;
        let history = HistoryLog::new(dir).await?;
        info!(path = %dir.display(), "Tip store ready");
        Ok(Self::new(snapshots, history))
    }
}

#[async_trait]
impl TipStore for FileTipStore {
    async fn replace_event_tips(&self, event_id: &str, tips: &[TipRecord]) -> Result<()> {
        let path = self.snapshots.event_path(event_id);
        self.snapshots.write(&path, tips).await?;
        self.history.append(tips).await
    }

    async fn load_event_tips(&self, event_id: &str) -> Result<Vec<TipRecord>> {
        let path = self.snapshots.event_path(event_id);
        Ok(self.snapshots.read(&path).await?.unwrap_or_default())
    }

    async fn load_history(&self, date: NaiveDate) -> Result<Vec<TipRecord>> {
        self.history.load_day(date).await
    }

    async fn save_accumulators(&self, accumulators: &[Accumulator]) -> Result<()> {
        let path = self.snapshots.root_path(ACCUMULATORS_FILE);
        self.snapshots.write(&path, accumulators).await
    }

    async fn load_accumulators(&self) -> Result<Vec<Accumulator>> {
        let path = self.snapshots.root_path(ACCUMULATORS_FILE);
        Ok(self.snapshots.read(&path).await?.unwrap_or_default())
    }

    async fn save_surebets(&self, surebets: &[Surebet]) -> Result<()> {
        let path = self.snapshots.root_path(SUREBETS_FILE);
        self.snapshots.write(&path, surebets).await
    }

    async fn load_surebets(&self) -> Result<Vec<Surebet>> {
        let path = self.snapshots.root_path(SUREBETS_FILE);
        Ok(self.snapshots.read(&path).await?.unwrap_or_default())
    }

    async fn is_healthy(&self) -> bool {
        self.snapshots.is_healthy().await && self.history.is_healthy().await
    }
}
