//! Health Checks - Liveness and Readiness Probes
//!
//! `/live` answers as long as the process serves requests. `/ready`
//! reflects the last provider and store checks and flips to not-ready
//! as soon as shutdown starts.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;

/// Shared health state polled by readiness probes.
#[derive(Debug)]
pub struct HealthState {
    /// Last provider check succeeded.
    pub provider_healthy: AtomicBool,
    /// Last store check succeeded.
    pub store_healthy: AtomicBool,
    /// Cleared once shutdown begins.
    pub accepting: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthState {
    /// Create a new health state (all healthy by default).
    pub fn new() -> Self {
        Self {
            provider_healthy: AtomicBool::new(true),
            store_healthy: AtomicBool::new(true),
            accepting: AtomicBool::new(true),
        }
    }

    pub fn set_provider_healthy(&self, healthy: bool) {
        self.provider_healthy.store(healthy, Ordering::Relaxed);
    }

    pub fn set_store_healthy(&self, healthy: bool) {
        self.store_healthy.store(healthy, Ordering::Relaxed);
    }

    /// Mark the service as draining.
    pub fn begin_shutdown(&self) {
        self.accepting.store(false, Ordering::Relaxed);
    }

    /// Check if the service is ready to serve traffic.
    pub fn is_ready(&self) -> bool {
        self.accepting.load(Ordering::Relaxed)
            && self.provider_healthy.load(Ordering::Relaxed)
            && self.store_healthy.load(Ordering::Relaxed)
    }
}

/// Router exposing `/live` and `/ready`.
pub fn routes(state: Arc<HealthState>) -> Router {
    Router::new()
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .with_state(state)
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Readiness probe: 200 only if provider and store are healthy.
async fn readiness(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    if state.is_ready() {
        (StatusCode::OK, "READY")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
    }
}
