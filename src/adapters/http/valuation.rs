//! Valuation endpoint - on-demand de-vig and classification.

use std::collections::HashMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::domain::engine::{OddsValuationEngine, ValuedOutcome};
use crate::domain::error::{AdjustmentError, InvalidOddsError};
use crate::domain::odds::{MarketQuotes, OutcomeQuote};

/// Body of `POST /v1/valuations`.
#[derive(Debug, Clone, Deserialize)]
pub struct ValuationRequest {
  pub event: String,
  pub market: String,
  pub outcomes: Vec<OutcomeQuote>,
  /// Optional model probabilities keyed by outcome label.
  #[serde(default)]
  pub model: Option<HashMap<String, f64>>,
}

/// Enriched, classified outcome set.
#[derive(Debug, Clone, Serialize)]
pub struct ValuationResponse {
  pub event_id: String,
  pub market: String,
  pub overround: f64,
  pub margin: f64,
  pub adjusted: bool,
  pub outcomes: Vec<ValuedOutcome>,
}

/// Errors surfaced to API callers as 422.
#[derive(Error, Debug)]
pub enum ValuationError {
  #[error(transparent)]
  InvalidOdds(#[from] InvalidOddsError),
  #[error(transparent)]
  Adjustment(#[from] AdjustmentError),
}

impl ValuationError {
  fn kind(&self) -> &'static str {
    match self {
      Self::InvalidOdds(_) => "invalid_odds",
      Self::Adjustment(_) => "invalid_adjustment",
    }
  }
}

impl IntoResponse for ValuationError {
  fn into_response(self) -> Response {
    let body = json!({ "error": self.kind(), "message": self.to_string() });
    (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
  }
}

/// Normalize, optionally adjust, then classify one request.
pub fn value_request(
  engine: &OddsValuationEngine,
  request: ValuationRequest,
) -> Result<ValuationResponse, ValuationError> {
  let quotes = MarketQuotes::new(request.event, request.market, request.outcomes);
  let mut set = engine.normalize(&quotes)?;

  if let Some(model) = request.model.as_ref().filter(|m| !m.is_empty()) {
    set = engine.apply_model_adjustment(&set, model)?;
  }

  Ok(ValuationResponse {
    event_id: set.event_id().to_string(),
    market: set.market().to_string(),
    overround: set.overround(),
    margin: set.margin(),
    adjusted: set.is_adjusted(),
    outcomes: engine.evaluate(&set),
  })
}
