//! Persistence Adapters - File-based Tip Storage
//!
//! Implements the TipStore port with atomic JSON documents for the
//! current tips and append-only JSONL files for history.
//! No database dependency.

pub mod file_store;
pub mod history;
pub mod snapshots;

pub use file_store::FileTipStore;
pub use history::HistoryLog;
pub use snapshots::SnapshotStore;
