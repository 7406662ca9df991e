//! HTTP API - valuation, manual runs, stored tips and health
//!
//! Routes:
//! - `POST /v1/valuations`: value one outcome set with the live policy
//! - `GET /v1/tips/:event_id`: tips currently published for an event
//! - `GET /v1/accumulators`, `GET /v1/surebets`: latest daily extras
//! - `POST /run-job`: trigger a pipeline run in the background (202)
//! - `GET /live`, `GET /ready`: probes

pub mod valuation;

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::broadcast;
use tracing::{error, info, instrument};

use crate::adapters::metrics::HealthState;
use crate::adapters::metrics::health;
use crate::ports::odds_provider::OddsProvider;
use crate::ports::tip_store::TipStore;
use crate::usecases::tip_pipeline::TipPipeline;

pub use valuation::{ValuationError, ValuationRequest, ValuationResponse, value_request};

/// Shared state for API handlers.
pub struct ApiState<P: OddsProvider, S: TipStore> {
  pub pipeline: Arc<TipPipeline<P, S>>,
}

impl<P: OddsProvider, S: TipStore> Clone for ApiState<P, S> {
  fn clone(&self) -> Self {
    Self {
      pipeline: Arc::clone(&self.pipeline),
    }
  }
}

#[derive(Debug, Default, Deserialize)]
pub struct RunJobParams {
  /// Fixture date, defaults to today (UTC).
  pub date: Option<NaiveDate>,
}

/// Full API router, probes included.
pub fn router<P: OddsProvider, S: TipStore>(
  pipeline: Arc<TipPipeline<P, S>>,
  health_state: Arc<HealthState>,
) -> Router {
  let api = Router::new()
    .route("/v1/valuations", post(create_valuation::<P, S>))
    .route("/v1/tips/:event_id", get(event_tips::<P, S>))
    .route("/v1/accumulators", get(accumulators::<P, S>))
    .route("/v1/surebets", get(surebets::<P, S>))
    .route("/run-job", post(run_job::<P, S>))
    .with_state(ApiState { pipeline });

  api.merge(health::routes(health_state))
}

/// Serve the API until shutdown.
#[instrument(skip(app, shutdown_rx))]
pub async fn serve(
  app: Router,
  bind_address: String,
  mut shutdown_rx: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
  let listener = tokio::net::TcpListener::bind(&bind_address).await?;
  info!(address = %bind_address, "API server started");

  axum::serve(listener, app)
    .with_graceful_shutdown(async move {
      let _ = shutdown_rx.recv().await;
    })
    .await?;

  Ok(())
}

async fn create_valuation<P: OddsProvider, S: TipStore>(
  State(state): State<ApiState<P, S>>,
  Json(request): Json<ValuationRequest>,
) -> Result<Json<ValuationResponse>, ValuationError> {
  let settings = state.pipeline.settings().await;
  value_request(&settings.engine, request).map(Json)
}

async fn event_tips<P: OddsProvider, S: TipStore>(
  State(state): State<ApiState<P, S>>,
  Path(event_id): Path<String>,
) -> impl IntoResponse {
  match state.pipeline.store().load_event_tips(&event_id).await {
    Ok(tips) => (StatusCode::OK, Json(json!({ "event_id": event_id, "tips": tips }))),
    Err(e) => {
      error!(%event_id, error = %e, "Failed to load tips");
      store_unavailable()
    }
  }
}

async fn accumulators<P: OddsProvider, S: TipStore>(
  State(state): State<ApiState<P, S>>,
) -> impl IntoResponse {
  match state.pipeline.store().load_accumulators().await {
    Ok(accumulators) => (StatusCode::OK, Json(json!({ "accumulators": accumulators }))),
    Err(e) => {
      error!(error = %e, "Failed to load accumulators");
      store_unavailable()
    }
  }
}

async fn surebets<P: OddsProvider, S: TipStore>(
  State(state): State<ApiState<P, S>>,
) -> impl IntoResponse {
  match state.pipeline.store().load_surebets().await {
    Ok(surebets) => (StatusCode::OK, Json(json!({ "surebets": surebets }))),
    Err(e) => {
      error!(error = %e, "Failed to load surebets");
      store_unavailable()
    }
  }
}

fn store_unavailable() -> (StatusCode, Json<serde_json::Value>) {
  (
    StatusCode::INTERNAL_SERVER_ERROR,
    Json(json!({ "error": "store_unavailable" })),
  )
}

async fn run_job<P: OddsProvider, S: TipStore>(
  State(state): State<ApiState<P, S>>,
  Query(params): Query<RunJobParams>,
) -> impl IntoResponse {
  let date = params.date.unwrap_or_else(|| Utc::now().date_naive());
  let pipeline = Arc::clone(&state.pipeline);

  tokio::spawn(async move {
    match pipeline.run(date).await {
      Ok(report) => info!(?report, "Manual run finished"),
      Err(e) => error!(%date, error = %e, "Manual run failed"),
    }
  });

  (
    StatusCode::ACCEPTED,
    Json(json!({ "status": "accepted", "date": date })),
  )
}
