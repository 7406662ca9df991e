//! Prometheus Metrics Registry - Valuation Observability
//!
//! Registers and exposes Prometheus metrics for the tips pipeline:
//! markets valued and rejected, tips published per confidence tier,
//! surebets, run duration and provider latency.

use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts,
    Registry, TextEncoder,
};
use tokio::sync::broadcast;
use tracing::{error, info, instrument};

/// Centralized Prometheus metrics for the tips engine.
///
/// All metrics follow the naming convention `lanzaca_*`.
pub struct MetricsRegistry {
    registry: Registry,
    /// Markets successfully valued.
    pub markets_valued: IntCounter,
    /// Markets rejected, by reason.
    pub markets_rejected: IntCounterVec,
    /// Tips published, by confidence tier.
    pub tips_published: IntCounterVec,
    /// Surebets found.
    pub surebets_found: IntCounter,
    /// Accumulators built.
    pub accumulators_built: IntCounter,
    /// Pipeline runs, by result (ok/error).
    pub pipeline_runs: IntCounterVec,
    /// Pipeline run duration (seconds).
    pub run_duration_seconds: Histogram,
    /// Provider request latency (seconds), by endpoint.
    pub provider_latency_seconds: HistogramVec,
    /// Provider requests that failed after retries, by endpoint.
    pub provider_errors: IntCounterVec,
    /// Provider reachability (1 = healthy).
    pub provider_healthy: Gauge,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let markets_valued = IntCounter::new(
            "lanzaca_markets_valued_total",
            "Markets normalized and classified",
        )?;

        let markets_rejected = IntCounterVec::new(
            Opts::new(
                "lanzaca_markets_rejected_total",
                "Markets skipped because their odds or model input were invalid",
            ),
            &["reason"],
        )?;

        let tips_published = IntCounterVec::new(
            Opts::new("lanzaca_tips_published_total", "Tips published"),
            &["confidence"],
        )?;

        let surebets_found = IntCounter::new(
            "lanzaca_surebets_found_total",
            "Cross-bookmaker arbitrages detected",
        )?;

        let accumulators_built = IntCounter::new(
            "lanzaca_accumulators_built_total",
            "Daily accumulators built",
        )?;

        let pipeline_runs = IntCounterVec::new(
            Opts::new("lanzaca_pipeline_runs_total", "Pipeline runs"),
            &["result"],
        )?;

        let run_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "lanzaca_pipeline_run_duration_seconds",
                "Wall time of one pipeline run",
            )
            .buckets(vec![0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0]),
        )?;

        let provider_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "lanzaca_provider_latency_seconds",
                "Provider request latency including retries",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["endpoint"],
        )?;

        let provider_errors = IntCounterVec::new(
            Opts::new(
                "lanzaca_provider_errors_total",
                "Provider requests failed after retries",
            ),
            &["endpoint"],
        )?;

        let provider_healthy = Gauge::new(
            "lanzaca_provider_healthy",
            "Provider reachability (1=healthy, 0=unreachable)",
        )?;

        registry.register(Box::new(markets_valued.clone()))?;
        registry.register(Box::new(markets_rejected.clone()))?;
        registry.register(Box::new(tips_published.clone()))?;
        registry.register(Box::new(surebets_found.clone()))?;
        registry.register(Box::new(accumulators_built.clone()))?;
        registry.register(Box::new(pipeline_runs.clone()))?;
        registry.register(Box::new(run_duration_seconds.clone()))?;
        registry.register(Box::new(provider_latency_seconds.clone()))?;
        registry.register(Box::new(provider_errors.clone()))?;
        registry.register(Box::new(provider_healthy.clone()))?;

        Ok(Self {
            registry,
            markets_valued,
            markets_rejected,
            tips_published,
            surebets_found,
            accumulators_built,
            pipeline_runs,
            run_duration_seconds,
            provider_latency_seconds,
            provider_errors,
            provider_healthy,
        })
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Router exposing `/metrics`.
    pub fn router(self: Arc<Self>) -> Router {
        Router::new().route(
            "/metrics",
            get(move || {
                let metrics = Arc::clone(&self);
                async move {
                    match metrics.render() {
                        Ok(body) => (StatusCode::OK, body),
                        Err(e) => {
                            error!(error = %e, "Failed to encode metrics");
                            (StatusCode::INTERNAL_SERVER_ERROR, String::new())
                        }
                    }
                }
            }),
        )
    }

    /// Serve Prometheus metrics on the configured bind address.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn serve(
        self: Arc<Self>,
        bind_address: String,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(&bind_address).await?;
        info!(address = %bind_address, "Prometheus metrics server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}
