//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP clients, file I/O) and exposes the
//! service over HTTP.
//!
//! Adapter categories:
//! - `http`: axum API (valuations, manual runs, probes)
//! - `metrics`: Prometheus metrics export and health state
//! - `persistence`: JSON snapshots and JSONL tip history
//! - `provider`: API-Football fixtures, odds and team statistics

pub mod http;
pub mod metrics;
pub mod persistence;
pub mod provider;
